//! Filesystem-backed media store.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use sha2::{Digest, Sha256};
use slug::slugify;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::application::repos::{MediaStore, StorageError, StorageHandle};

/// Objects live at `<root>/<namespace>/<file>`. URLs are built from
/// `public_base_url` when set, otherwise they point at the file itself.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
    public_base_url: Option<Url>,
}

impl LocalMediaStore {
    /// Initialise storage rooted at the provided directory, creating it if necessary.
    pub fn new(root: PathBuf, public_base_url: Option<Url>) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        let root = std::fs::canonicalize(&root)?;
        Ok(Self {
            root,
            public_base_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, stored_path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(stored_path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|component| matches!(component, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(StorageError::InvalidPath {
                path: stored_path.to_string(),
                reason: "path must stay inside the storage root".into(),
            });
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn list(&self, namespace: &str) -> Result<Vec<StorageHandle>, StorageError> {
        let namespace = namespace.trim_matches('/');
        let directory = self.resolve(namespace)?;
        let mut entries = match fs::read_dir(&directory).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::io(err)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(StorageError::io)? {
            let file_type = entry.file_type().await.map_err(StorageError::io)?;
            if !file_type.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            names.push(name);
        }
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| StorageHandle::from_path(format!("{namespace}/{name}")))
            .collect())
    }

    async fn resolve_url(&self, handle: &StorageHandle) -> Result<String, StorageError> {
        let absolute = self.resolve(&handle.full_path)?;
        if !fs::try_exists(&absolute).await.map_err(StorageError::io)? {
            return Err(StorageError::NotFound {
                path: handle.full_path.clone(),
            });
        }

        let url = match &self.public_base_url {
            Some(base) => {
                let mut url = base.clone();
                url.path_segments_mut()
                    .map_err(|()| StorageError::InvalidPath {
                        path: base.to_string(),
                        reason: "public base url cannot be a base".into(),
                    })?
                    .pop_if_empty()
                    .extend(handle.full_path.split('/'));
                url
            }
            None => Url::from_file_path(&absolute).map_err(|()| StorageError::InvalidPath {
                path: absolute.display().to_string(),
                reason: "not representable as a file url".into(),
            })?,
        };
        Ok(url.to_string())
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<StorageHandle, StorageError> {
        let (directory, file_name) = match path.rsplit_once('/') {
            Some((directory, file_name)) => (directory, file_name),
            None => ("", path),
        };
        let stored_path = if directory.is_empty() {
            sanitize_filename(file_name)
        } else {
            format!("{directory}/{}", sanitize_filename(file_name))
        };
        let absolute = self.resolve(&stored_path)?;
        let parent = absolute.parent().unwrap_or(&self.root).to_path_buf();
        fs::create_dir_all(&parent).await.map_err(StorageError::io)?;

        let partial = parent.join(format!(".{}.part", Uuid::new_v4()));
        let mut file = fs::File::create(&partial).await.map_err(StorageError::io)?;
        let written = async {
            file.write_all(&bytes).await?;
            file.flush().await
        }
        .await;
        drop(file);
        if let Err(err) = written {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::io(err));
        }
        fs::rename(&partial, &absolute)
            .await
            .map_err(StorageError::io)?;

        let checksum = hex::encode(Sha256::digest(&bytes).as_slice());
        tracing::debug!(
            target = "postdesk::storage::local",
            path = %stored_path,
            size_bytes = bytes.len(),
            checksum = %checksum,
            "object stored"
        );
        Ok(StorageHandle::from_path(stored_path))
    }
}

fn sanitize_filename(original: &str) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("upload");
    let mut base = slugify(stem);
    if base.is_empty() {
        base = "upload".to_string();
    }

    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.trim_matches('.').to_ascii_lowercase())
        .filter(|value| !value.is_empty());

    match extension {
        Some(ext) => format!("{base}.{ext}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[tokio::test]
    async fn upload_then_list_and_resolve() {
        let dir = tempdir().expect("tempdir");
        let base = Url::parse("https://media.example/files/").expect("url");
        let store = LocalMediaStore::new(dir.path().to_path_buf(), Some(base)).expect("store");

        let handle = store
            .upload("admin/My Cat.PNG", Bytes::from_static(b"png"), "image/png")
            .await
            .expect("upload");
        assert_eq!(handle.full_path, "admin/my-cat.png");

        let listed = store.list("admin").await.expect("list");
        assert_eq!(listed, vec![handle.clone()]);

        let url = store.resolve_url(&handle).await.expect("url");
        assert_eq!(url, "https://media.example/files/admin/my-cat.png");
    }

    #[tokio::test]
    async fn missing_namespace_lists_empty() {
        let dir = tempdir().expect("tempdir");
        let store = LocalMediaStore::new(dir.path().to_path_buf(), None).expect("store");
        assert!(store.list("admin").await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn file_urls_are_used_without_public_base() {
        let dir = tempdir().expect("tempdir");
        let store = LocalMediaStore::new(dir.path().to_path_buf(), None).expect("store");
        let handle = store
            .upload("admin/a.png", Bytes::from_static(b"x"), "image/png")
            .await
            .expect("upload");
        let url = store.resolve_url(&handle).await.expect("url");
        assert!(url.starts_with("file://"), "{url}");
        assert!(url.ends_with("/admin/a.png"), "{url}");
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let store = LocalMediaStore::new(dir.path().to_path_buf(), None).expect("store");
        let err = store
            .resolve_url(&StorageHandle::from_path("../etc/passwd"))
            .await
            .expect_err("traversal");
        assert!(matches!(err, StorageError::InvalidPath { .. }));
    }

    #[test]
    fn sanitize_keeps_lowercase_extension() {
        assert_eq!(sanitize_filename("Hello World.JPG"), "hello-world.jpg");
        assert_eq!(sanitize_filename("???"), "upload");
    }
}
