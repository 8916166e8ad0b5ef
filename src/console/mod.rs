//! Command handlers behind the `postdesk` binary.

mod handlers;
mod io;
mod print;

use std::sync::Arc;

use postdesk::{
    application::{editor::EditorSurface, error::AppError, media::MediaCatalog},
    config::{Command, Settings},
    domain::identity::IdentityContext,
    infra::{http::ApiClient, storage::build_media_store},
};

/// Resolved settings plus constructors for the adapters a command needs.
#[derive(Debug, Clone, Copy)]
pub struct Ctx<'a> {
    settings: &'a Settings,
}

impl<'a> Ctx<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn api(&self) -> Result<Arc<ApiClient>, AppError> {
        let client = ApiClient::new(self.settings.api.base_url.as_str())?;
        Ok(Arc::new(client))
    }

    pub fn media_catalog(&self) -> Result<MediaCatalog, AppError> {
        let store = build_media_store(&self.settings.storage)?;
        Ok(MediaCatalog::new(
            store,
            self.settings.storage.namespace.clone(),
        ))
    }

    /// Session seeded from the configured author, signed out when none is set.
    pub fn identity(&self) -> IdentityContext {
        match self.settings.identity.clone() {
            Some(identity) => IdentityContext::signed_in(identity),
            None => IdentityContext::new(),
        }
    }

    pub fn editor_surface(&self) -> EditorSurface {
        self.settings.editor.surface
    }
}

pub async fn dispatch(ctx: &Ctx<'_>, command: Command) -> Result<(), AppError> {
    match command {
        Command::Media(args) => handlers::media::handle(ctx, args.command).await,
        Command::Categories(args) => handlers::categories::handle(ctx, args.command).await,
        Command::Fates(args) => handlers::fates::handle(ctx, args.command).await,
        Command::Posts(args) => handlers::posts::handle(ctx, args.command).await,
    }
}
