use std::path::PathBuf;

use bytes::Bytes;
use postdesk::{application::error::AppError, application::notice::Notice, config::MediaCommand};
use serde_json::json;

use crate::console::Ctx;
use crate::console::io::read_bytes;
use crate::console::print::{print_json, print_notices};

pub async fn handle(ctx: &Ctx<'_>, cmd: MediaCommand) -> Result<(), AppError> {
    match cmd {
        MediaCommand::List => list(ctx).await,
        MediaCommand::Upload { file } => upload(ctx, file).await,
    }
}

async fn list(ctx: &Ctx<'_>) -> Result<(), AppError> {
    let mut catalog = ctx.media_catalog()?;
    let assets = catalog.load().await?;
    print_json(assets)
}

async fn upload(ctx: &Ctx<'_>, file: PathBuf) -> Result<(), AppError> {
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| AppError::validation("file name must be valid UTF-8"))?
        .to_string();
    let data = read_bytes(&file)?;

    let mut catalog = ctx.media_catalog()?;
    let outcome = match catalog.upload(&file_name, Bytes::from(data)).await {
        Ok(outcome) => outcome,
        Err(err) => {
            print_notices(&[Notice::warning(err.to_string())]);
            return Err(err.into());
        }
    };

    let mut notices = vec![Notice::success(format!("uploaded {}", outcome.handle.name))];
    if !outcome.reloaded {
        notices.push(Notice::warning("media catalog could not be refreshed"));
    }
    print_notices(&notices);

    print_json(&json!({
        "uploaded": outcome.handle.full_path,
        "catalog": catalog.assets(),
    }))
}
