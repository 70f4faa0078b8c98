use clap::Subcommand;
use serde_json::json;

use crate::auth;
use crate::cli::{utils, OutputFormat};
use crate::database::models::Role;
use crate::database::UserRepository;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user; the only way to get a moderator account")]
    Create {
        #[arg(long, help = "Login name")]
        name: String,
        #[arg(long, help = "Password")]
        password: String,
        #[arg(long, help = "Role: buyer, manager or admin", default_value = "buyer")]
        role: Role,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { name, password, role } => create(name, password, role, output_format).await,
    }
}

async fn create(name: String, password: String, role: Role, output_format: OutputFormat) -> anyhow::Result<()> {
    let name = name.trim();
    anyhow::ensure!(!name.is_empty(), "name is empty");
    anyhow::ensure!(!password.is_empty(), "password is empty");

    let hash = auth::hash_password(&password)?;
    let user = UserRepository::new(utils::pool()?).create(name, &hash, role).await?;

    utils::output_success(
        output_format,
        &format!("Created {} '{}' (id {})", role.as_str(), user.name, user.id),
        Some(json!({ "user": user })),
    )
}
