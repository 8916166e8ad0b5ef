use postdesk::{
    application::{categories::CategoryDirectory, error::AppError},
    config::FatesCommand,
};

use crate::console::Ctx;
use crate::console::print::print_json;

pub async fn handle(ctx: &Ctx<'_>, cmd: FatesCommand) -> Result<(), AppError> {
    match cmd {
        FatesCommand::List => {
            let directory = CategoryDirectory::new(ctx.api()?);
            let fates = directory.fates().await?;
            print_json(&fates)
        }
    }
}
