//! # Image Module
//!
//! Handles to the photographs the intake works on.
//!
//! An [`ImageRef`] is either a path on disk (decoded lazily, every time it is
//! loaded) or an already decoded raster, e.g. an upload held in memory. Two
//! references carry no identity beyond their pixel content.

mod decode;

pub use decode::FastDecoder;

use crate::error::ImageError;
use image::DynamicImage;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An opaque handle to one raster image
#[derive(Clone)]
pub enum ImageRef {
    /// An image file, decoded on demand
    Path(PathBuf),
    /// An image already in memory
    Decoded {
        label: String,
        image: Arc<DynamicImage>,
    },
}

impl ImageRef {
    /// Reference an image file
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ImageRef::Path(path.into())
    }

    /// Wrap an in-memory image under a display label
    pub fn decoded(label: impl Into<String>, image: DynamicImage) -> Self {
        ImageRef::Decoded {
            label: label.into(),
            image: Arc::new(image),
        }
    }

    /// Short display name: the file name for paths, the label otherwise
    pub fn label(&self) -> String {
        match self {
            ImageRef::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            ImageRef::Decoded { label, .. } => label.clone(),
        }
    }

    /// The backing file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ImageRef::Path(path) => Some(path),
            ImageRef::Decoded { .. } => None,
        }
    }

    /// Decode (or borrow) the raster behind this reference
    pub fn load(&self) -> Result<Cow<'_, DynamicImage>, ImageError> {
        match self {
            ImageRef::Path(path) => FastDecoder::decode(path).map(Cow::Owned),
            ImageRef::Decoded { label, image } => {
                if image.width() == 0 || image.height() == 0 {
                    return Err(ImageError::EmptyImage {
                        label: label.clone(),
                    });
                }
                Ok(Cow::Borrowed(image.as_ref()))
            }
        }
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ImageRef::Decoded { label, image } => f
                .debug_struct("Decoded")
                .field("label", label)
                .field("width", &image.width())
                .field("height", &image.height())
                .finish(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Path(path) => write!(f, "{}", path.display()),
            ImageRef::Decoded { label, .. } => write!(f, "{}", label),
        }
    }
}

impl Serialize for ImageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<PathBuf> for ImageRef {
    fn from(path: PathBuf) -> Self {
        ImageRef::Path(path)
    }
}
