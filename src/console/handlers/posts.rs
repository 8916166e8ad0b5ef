use postdesk::{
    application::{
        categories::CategorySelector,
        composer::{ComposeError, Composer},
        error::AppError,
        submission::SubmissionPipeline,
    },
    config::{ComposeArgs, PostsCommand},
};
use serde_json::json;

use crate::console::Ctx;
use crate::console::io::read_opt_value;
use crate::console::print::{print_json, print_notices};

pub async fn handle(ctx: &Ctx<'_>, cmd: PostsCommand) -> Result<(), AppError> {
    match cmd {
        PostsCommand::Compose(args) => compose(ctx, args).await,
    }
}

/// Drive the composer the way an author would: fill the form, place images
/// at the end of the body, then submit once.
async fn compose(ctx: &Ctx<'_>, args: ComposeArgs) -> Result<(), AppError> {
    let ComposeArgs {
        title,
        category,
        body,
        body_file,
        image_urls,
        catalog_images,
        dry_run,
    } = args;
    let body = read_opt_value(body, body_file)?;

    let mut composer = Composer::new(ctx.editor_surface());
    composer.open();
    composer.set_title(&title)?;
    if let Some(markup) = body.as_deref() {
        composer.set_content(markup)?;
    }
    composer.move_to_end()?;

    for url in &image_urls {
        composer.request_image()?;
        composer.enter_image_url(url)?;
        if let Err(err) = composer.confirm_image_url() {
            composer.cancel_image_url();
            print_notices(&composer.take_notices());
            return Err(err.into());
        }
    }

    if !catalog_images.is_empty() {
        let mut catalog = ctx.media_catalog()?;
        catalog.load().await?;
        for name in &catalog_images {
            let asset = catalog.find(name).ok_or_else(|| {
                AppError::validation(format!("`{name}` is not in the media catalog"))
            })?;
            composer.insert_media(&asset.display_url)?;
        }
    }

    if dry_run {
        composer.select_category(category)?;
        let draft = composer.draft().cloned().ok_or(ComposeError::NotOpen)?;
        return print_json(&draft);
    }

    let api = ctx.api()?;
    if let Some(id) = category.as_deref() {
        let mut selector = CategorySelector::new(api.clone());
        selector.load().await?;
        if selector.find(id).is_none() {
            return Err(AppError::validation(format!("unknown category `{id}`")));
        }
    }
    composer.select_category(category)?;

    let pipeline = SubmissionPipeline::new(api);
    let identity = ctx.identity();
    let outcome = composer.submit(&pipeline, &identity).await;
    print_notices(&composer.take_notices());
    let message = outcome?;

    print_json(&json!({ "message": message.0 }))
}
