//! Media store backends.

mod firebase;
mod local;

use std::sync::Arc;

use reqwest::Client;

pub use firebase::{DEFAULT_ENDPOINT as FIREBASE_DEFAULT_ENDPOINT, FirebaseStorage};
pub use local::LocalMediaStore;

use crate::application::repos::MediaStore;
use crate::config::{StorageBackend, StorageSettings};
use crate::infra::error::InfraError;

/// Build the configured media store.
pub fn build_media_store(settings: &StorageSettings) -> Result<Arc<dyn MediaStore>, InfraError> {
    match &settings.backend {
        StorageBackend::Firebase {
            endpoint,
            bucket,
            auth_token,
        } => {
            let client = Client::builder()
                .user_agent(concat!("postdesk/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|err| InfraError::http_client(err.to_string()))?;
            let store = FirebaseStorage::new(client, endpoint.clone(), bucket.clone())
                .with_auth_token(auth_token.clone());
            Ok(Arc::new(store))
        }
        StorageBackend::Local {
            directory,
            public_base_url,
        } => {
            let store = LocalMediaStore::new(directory.clone(), public_base_url.clone())?;
            Ok(Arc::new(store))
        }
    }
}
