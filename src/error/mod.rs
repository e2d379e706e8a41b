//! # Error Module
//!
//! Error types for the intake engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, keys, values that were rejected
//! - **Classify** - every error maps onto an [`ErrorKind`] so callers (CLI,
//!   HTTP front-ends) can translate it into a response without matching
//!   every variant
//!
//! A duplicate item is not an error: container and order operations report
//! it through their boolean return value.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Grouping error: {0}")]
    Group(#[from] GroupError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Output error: {0}")]
    Output(String),
}

/// Coarse classification of failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed caller input (group size, threshold, mismatched images)
    InvalidArgument,
    /// An image could not be read or decoded
    ImageDecode,
    /// A requested persisted record does not exist
    NotFound,
    /// Filesystem failure outside image decoding
    Io,
    /// Anything else (configuration, plugin lookup, serialization)
    Other,
}

impl ErrorKind {
    /// Process exit status the CLI reports for this kind
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Other => 1,
            ErrorKind::InvalidArgument => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::ImageDecode => 4,
            ErrorKind::Io => 5,
        }
    }
}

impl IntakeError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IntakeError::Scan(ScanError::DirectoryNotFound { .. }) => ErrorKind::NotFound,
            IntakeError::Scan(_) => ErrorKind::Io,
            IntakeError::Image(_) => ErrorKind::ImageDecode,
            IntakeError::Compare(e) => e.kind(),
            IntakeError::Group(e) => e.kind(),
            IntakeError::Store(e) => e.kind(),
            IntakeError::Plugin(PluginError::Image(_)) => ErrorKind::ImageDecode,
            IntakeError::Plugin(_) => ErrorKind::Other,
            IntakeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            IntakeError::Config(_) | IntakeError::Output(_) => ErrorKind::Other,
        }
    }

    /// True when the error means "no such record"
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Errors that occur while listing an intake directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while reading or decoding an image
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to decode image {label}: {reason}")]
    DecodeError { label: String, reason: String },

    #[error("Image is empty or corrupted: {label}")]
    EmptyImage { label: String },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while comparing two images
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Image dimensions differ: {left_width}x{left_height} vs {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: u32,
        left_height: u32,
        right_width: u32,
        right_height: u32,
    },

    #[error("Invalid similarity threshold: {value} (must be between 0 and 1)")]
    InvalidThreshold { value: f64 },
}

impl CompareError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidArgument
    }
}

/// Errors that abort an image grouping run
#[derive(Error, Debug)]
pub enum GroupError {
    #[error("Invalid group size: {value} (must be at least 1)")]
    InvalidGroupSize { value: usize },

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Compare(#[from] CompareError),
}

impl GroupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GroupError::InvalidGroupSize { .. } => ErrorKind::InvalidArgument,
            GroupError::Image(_) => ErrorKind::ImageDecode,
            GroupError::Compare(e) => e.kind(),
        }
    }
}

/// Errors from the key-value persistence layer
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No record stored under '{key}'")]
    NotFound { key: String },

    #[error("A record already exists under '{key}'")]
    AlreadyExists { key: String },

    #[error("Invalid storage key '{key}': keys must be plain file names")]
    InvalidKey { key: String },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to (de)serialize record '{key}': {reason}")]
    Serialization { key: String, reason: String },

    #[error("Store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::InvalidKey { .. } | StoreError::AlreadyExists { .. } => {
                ErrorKind::InvalidArgument
            }
            StoreError::Io { .. } => ErrorKind::Io,
            StoreError::Serialization { .. } | StoreError::Poisoned => ErrorKind::Other,
        }
    }
}

/// Errors from plugin lookup and item identification
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("No scanner registered for item type '{type_name}'")]
    UnknownScanner { type_name: String },

    #[error("No listing builder registered for item type '{type_name}'")]
    UnknownBuilder { type_name: String },

    #[error("Cannot build a listing without an identified item")]
    MissingItem,

    #[error("Failed to load {path}: {reason}")]
    Collaborator { path: PathBuf, reason: String },

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, IntakeError>;
