use crate::cli::{utils, OutputFormat};
use crate::database;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = utils::pool()?;
    database::run_migrations(&pool).await?;
    utils::output_success(output_format, "Migrations applied", None)
}
