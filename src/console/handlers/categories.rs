use postdesk::{
    application::{
        categories::{CategoryDirectory, CategorySelector},
        error::AppError,
        notice::Notice,
    },
    config::CategoriesCommand,
    domain::categories::NewCategory,
};
use serde_json::json;

use crate::console::Ctx;
use crate::console::print::{print_json, print_notices};

pub async fn handle(ctx: &Ctx<'_>, cmd: CategoriesCommand) -> Result<(), AppError> {
    match cmd {
        CategoriesCommand::List => list(ctx).await,
        CategoriesCommand::Options => options(ctx).await,
        CategoriesCommand::Create {
            name,
            description,
            fate_ids,
        } => {
            create(
                ctx,
                NewCategory {
                    name,
                    description,
                    fate_ids,
                },
            )
            .await
        }
    }
}

async fn list(ctx: &Ctx<'_>) -> Result<(), AppError> {
    let directory = CategoryDirectory::new(ctx.api()?);
    let entries = directory.list().await?;
    print_json(&entries)
}

async fn options(ctx: &Ctx<'_>) -> Result<(), AppError> {
    let mut selector = CategorySelector::new(ctx.api()?);
    let options = selector.load().await?;
    print_json(options)
}

async fn create(ctx: &Ctx<'_>, input: NewCategory) -> Result<(), AppError> {
    let directory = CategoryDirectory::new(ctx.api()?);
    match directory.create(input).await {
        Ok(message) => {
            print_notices(&[Notice::success(message.clone())]);
            print_json(&json!({ "message": message }))
        }
        Err(err) => {
            print_notices(&[Notice::error(err.to_string())]);
            Err(err.into())
        }
    }
}
