//! Media library entries.

use serde::{Deserialize, Serialize};

/// Namespace the console stores its images under.
pub const DEFAULT_NAMESPACE: &str = "admin";

/// An uploaded image resolved to a fetchable URL.
///
/// `identifier` is the storage object name and is unique within a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub identifier: String,
    pub display_url: String,
}

/// Object path for `file_name` inside `namespace`.
pub fn object_path(namespace: &str, file_name: &str) -> String {
    let namespace = namespace.trim_matches('/');
    if namespace.is_empty() {
        file_name.to_string()
    } else {
        format!("{namespace}/{file_name}")
    }
}

/// Whether a MIME type guessed from a file name denotes an image.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_joins_namespace_and_name() {
        assert_eq!(object_path("admin", "a.png"), "admin/a.png");
        assert_eq!(object_path("/admin/", "a.png"), "admin/a.png");
        assert_eq!(object_path("", "a.png"), "a.png");
    }

    #[test]
    fn image_detection_uses_mime_prefix() {
        assert!(is_image_content_type("image/png"));
        assert!(!is_image_content_type("application/pdf"));
    }
}
