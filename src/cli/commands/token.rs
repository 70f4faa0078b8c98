use clap::Args;
use serde_json::json;

use crate::auth;
use crate::cli::{utils, OutputFormat};
use crate::config::config;
use crate::database::UserRepository;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long, help = "Name of the user to issue the token for")]
    pub name: String,
}

pub async fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let users = UserRepository::new(utils::pool()?);
    let user = users
        .find_by_name(&args.name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user '{}' not found", args.name))?;

    let (token, ttl) = auth::issue_token(&user, &config().security)?;

    match output_format {
        OutputFormat::Json => utils::output_success(
            output_format,
            "Token issued",
            Some(json!({ "token": token, "expires_in": ttl, "cookie": format!("Bearer{}", token) })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
