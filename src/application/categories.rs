//! Category options for the composer and the category directory.

use std::sync::Arc;

use thiserror::Error;

use crate::application::repos::{NetworkError, TaxonomyApi};
use crate::domain::categories::{Category, CategoryEntry, Fate, NewCategory};
use crate::domain::error::DomainError;

/// Fetch taxonomy and keep only `{id, name}`.
pub async fn load_categories(api: &dyn TaxonomyApi) -> Result<Vec<Category>, NetworkError> {
    let envelope = api.categories().await?;
    if !envelope.is_ok() {
        return Err(NetworkError::Envelope {
            status: envelope.status,
        });
    }
    Ok(envelope.data.into_iter().map(Category::from).collect())
}

/// Options backing the composer's category field.
pub struct CategorySelector {
    api: Arc<dyn TaxonomyApi>,
    options: Vec<Category>,
}

impl std::fmt::Debug for CategorySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategorySelector")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CategorySelector {
    pub fn new(api: Arc<dyn TaxonomyApi>) -> Self {
        Self {
            api,
            options: Vec::new(),
        }
    }

    /// Reload options. A failed load keeps the previous ones.
    pub async fn load(&mut self) -> Result<&[Category], NetworkError> {
        match load_categories(self.api.as_ref()).await {
            Ok(options) => {
                tracing::debug!(
                    target = "postdesk::categories",
                    count = options.len(),
                    "category options loaded"
                );
                self.options = options;
                Ok(&self.options)
            }
            Err(err) => {
                tracing::error!(
                    target = "postdesk::categories",
                    error = %err,
                    "failed to load category options"
                );
                Err(err)
            }
        }
    }

    pub fn options(&self) -> &[Category] {
        &self.options
    }

    pub fn find(&self, id: &str) -> Option<&Category> {
        self.options.iter().find(|category| category.id == id)
    }
}

#[derive(Debug, Error)]
pub enum CategoryAdminError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Full category listing, fates and category creation.
#[derive(Clone)]
pub struct CategoryDirectory {
    api: Arc<dyn TaxonomyApi>,
}

impl CategoryDirectory {
    pub fn new(api: Arc<dyn TaxonomyApi>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<CategoryEntry>, CategoryAdminError> {
        let envelope = self.api.categories().await?;
        if !envelope.is_ok() {
            return Err(NetworkError::Envelope {
                status: envelope.status,
            }
            .into());
        }
        Ok(envelope.data.into_iter().map(CategoryEntry::from).collect())
    }

    pub async fn fates(&self) -> Result<Vec<Fate>, CategoryAdminError> {
        let envelope = self.api.fates().await?;
        if !envelope.is_ok() {
            return Err(NetworkError::Envelope {
                status: envelope.status,
            }
            .into());
        }
        Ok(envelope.data.into_iter().map(Fate::from).collect())
    }

    /// Validate locally, then create. Returns the server's message.
    pub async fn create(&self, input: NewCategory) -> Result<String, CategoryAdminError> {
        input.validate()?;
        let request = input.into_request();
        let response = self.api.create_category(&request).await.inspect_err(|err| {
            tracing::error!(
                target = "postdesk::categories",
                name = %request.name,
                error = %err,
                "category creation failed"
            );
        })?;
        tracing::info!(
            target = "postdesk::categories",
            name = %request.name,
            "category created"
        );
        Ok(response.message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use postdesk_api_types::{
        CategoryRecord, CreateCategoryRequest, FateRecord, ListEnvelope, MessageResponse,
    };

    use super::*;

    struct FakeTaxonomy {
        status: Mutex<i64>,
        fail: Mutex<bool>,
        created: Mutex<Vec<CreateCategoryRequest>>,
    }

    impl FakeTaxonomy {
        fn new() -> Self {
            Self {
                status: Mutex::new(200),
                fail: Mutex::new(false),
                created: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TaxonomyApi for FakeTaxonomy {
        async fn categories(&self) -> Result<ListEnvelope<CategoryRecord>, NetworkError> {
            if *self.fail.lock().expect("lock") {
                return Err(NetworkError::transport("connection refused"));
            }
            Ok(ListEnvelope {
                status: *self.status.lock().expect("lock"),
                data: vec![CategoryRecord {
                    id: "1".into(),
                    name: "Fire".into(),
                    description: Some("hot".into()),
                    fates: vec![FateRecord {
                        id: "f1".into(),
                        element: "Hoa".into(),
                    }],
                }],
            })
        }

        async fn fates(&self) -> Result<ListEnvelope<FateRecord>, NetworkError> {
            Ok(ListEnvelope {
                status: 200,
                data: vec![FateRecord {
                    id: "f1".into(),
                    element: "Hoa".into(),
                }],
            })
        }

        async fn create_category(
            &self,
            request: &CreateCategoryRequest,
        ) -> Result<MessageResponse, NetworkError> {
            self.created.lock().expect("lock").push(request.clone());
            Ok(MessageResponse {
                message: "Category created".into(),
            })
        }
    }

    #[tokio::test]
    async fn options_keep_only_id_and_name() {
        let mut selector = CategorySelector::new(Arc::new(FakeTaxonomy::new()));
        let options = selector.load().await.expect("load");
        assert_eq!(
            options,
            &[Category {
                id: "1".into(),
                name: "Fire".into()
            }]
        );
        assert!(selector.find("1").is_some());
    }

    #[tokio::test]
    async fn envelope_status_must_be_200() {
        let api = FakeTaxonomy::new();
        *api.status.lock().expect("lock") = 500;
        let err = load_categories(&api).await.expect_err("bad envelope");
        assert_eq!(err, NetworkError::Envelope { status: 500 });
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_options() {
        let api = Arc::new(FakeTaxonomy::new());
        let mut selector = CategorySelector::new(api.clone());
        selector.load().await.expect("first load");

        *api.fail.lock().expect("lock") = true;
        assert!(selector.load().await.is_err());
        assert_eq!(selector.options().len(), 1);
    }

    #[tokio::test]
    async fn directory_flattens_fates_and_lists_fates() {
        let directory = CategoryDirectory::new(Arc::new(FakeTaxonomy::new()));
        let entries = directory.list().await.expect("list");
        assert_eq!(entries[0].fates, vec!["Hoa".to_string()]);
        assert_eq!(entries[0].description, "hot");

        let fates = directory.fates().await.expect("fates");
        assert_eq!(fates[0].element, "Hoa");
    }

    #[tokio::test]
    async fn create_validates_before_sending() {
        let api = Arc::new(FakeTaxonomy::new());
        let directory = CategoryDirectory::new(api.clone());

        let err = directory
            .create(NewCategory {
                name: "Earth".into(),
                description: String::new(),
                fate_ids: vec!["f1".into()],
            })
            .await
            .expect_err("missing description");
        assert!(matches!(err, CategoryAdminError::Validation(_)));
        assert!(api.created.lock().expect("lock").is_empty());

        let message = directory
            .create(NewCategory {
                name: "Earth".into(),
                description: "steady".into(),
                fate_ids: vec!["f1".into()],
            })
            .await
            .expect("created");
        assert_eq!(message, "Category created");
        assert_eq!(api.created.lock().expect("lock")[0].fate_id, vec!["f1"]);
    }
}
