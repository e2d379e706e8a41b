//! Directory listing on top of walkdir.

use super::filter::ImageFilter;
use crate::error::ScanError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration for listing an intake directory
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files
    pub include_hidden: bool,
    /// How deep to descend; 1 means the directory's own entries only
    pub max_depth: usize,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: false,
            max_depth: 1,
            extensions: None,
        }
    }
}

/// List the photos in `root`, sorted by path.
///
/// The order is lexicographic on the full path, so it is the same on every
/// platform and matches capture order for sequentially named files.
pub fn list_images(root: &Path, config: &ScanConfig) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut filter = ImageFilter::new().with_hidden(config.include_hidden);
    if let Some(ref extensions) = config.extensions {
        filter = filter.with_extensions(extensions.clone());
    }

    let walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .max_depth(config.max_depth.max(1))
        .sort_by_file_name();

    let mut images = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            match e.io_error().map(|io| io.kind()) {
                Some(std::io::ErrorKind::PermissionDenied) => ScanError::PermissionDenied { path },
                _ => ScanError::ReadDirectory {
                    path,
                    source: std::io::Error::other(e.to_string()),
                },
            }
        })?;

        if entry.file_type().is_file() && filter.should_include(entry.path()) {
            images.push(entry.into_path());
        }
    }

    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(list_images(dir.path(), &ScanConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn images_come_back_in_lexicographic_order() {
        let dir = TempDir::new().unwrap();
        for name in ["slab_0003.jpg", "slab_0001.jpg", "slab_0002.png", "slab_0010.jpg"] {
            touch(dir.path(), name);
        }

        let names: Vec<String> = list_images(dir.path(), &ScanConfig::default())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec!["slab_0001.jpg", "slab_0002.png", "slab_0003.jpg", "slab_0010.jpg"]
        );
    }

    #[test]
    fn sidecars_and_hidden_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "slab_0001.jpg");
        touch(dir.path(), "barcodes.json");
        touch(dir.path(), ".DS_Store");
        touch(dir.path(), ".preview.jpg");

        let images = list_images(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn nested_directories_are_ignored_by_default() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "top.jpg");
        let nested = dir.path().join("rejects");
        fs::create_dir(&nested).unwrap();
        touch(&nested, "inner.jpg");

        assert_eq!(list_images(dir.path(), &ScanConfig::default()).unwrap().len(), 1);

        let deep = ScanConfig {
            max_depth: 2,
            ..Default::default()
        };
        assert_eq!(list_images(dir.path(), &deep).unwrap().len(), 2);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = list_images(Path::new("/nonexistent/intake/12345"), &ScanConfig::default());
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }
}
