//! Decides which directory entries are intake photos.

use std::collections::HashSet;
use std::path::Path;

/// Accepts supported image files, optionally skipping hidden ones
pub struct ImageFilter {
    extensions: HashSet<String>,
    include_hidden: bool,
}

impl ImageFilter {
    /// Filter with the default decodable extensions
    pub fn new() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            include_hidden: false,
        }
    }

    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Replace the accepted extensions (compared case-insensitively)
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    pub fn should_include(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        if !self.include_hidden && name.starts_with('.') {
            return false;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_capture_formats() {
        let filter = ImageFilter::new();
        assert!(filter.should_include(Path::new("/intake/slab_0001.jpg")));
        assert!(filter.should_include(Path::new("/intake/slab_0002.PNG")));
    }

    #[test]
    fn rejects_sidecar_files() {
        let filter = ImageFilter::new();
        assert!(!filter.should_include(Path::new("/intake/barcodes.json")));
        assert!(!filter.should_include(Path::new("/intake/README")));
    }

    #[test]
    fn hidden_files_are_opt_in() {
        let path = Path::new("/intake/.thumb.jpg");
        assert!(!ImageFilter::new().should_include(path));
        assert!(ImageFilter::new().with_hidden(true).should_include(path));
    }

    #[test]
    fn custom_extensions_replace_defaults() {
        let filter = ImageFilter::new().with_extensions(vec!["PNG".to_string()]);
        assert!(filter.should_include(Path::new("a.png")));
        assert!(!filter.should_include(Path::new("a.jpg")));
    }
}
