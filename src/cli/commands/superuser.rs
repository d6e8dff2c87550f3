use std::io::Write;

use crate::config::Config;
use crate::db::Store;
use crate::services::{SeaOrmUserService, UserError, UserService};

pub async fn cmd_create_superuser(
    config: &Config,
    email: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let password = match password {
        Some(password) => password,
        None => {
            print!("Password: ");
            std::io::stdout().flush()?;
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            input.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let service = SeaOrmUserService::new(store, config.security.clone());

    match service.create_superuser(email, &password).await {
        Ok(user) => {
            println!("✓ Superuser created: {} (ID: {})", user.email, user.id);
            Ok(())
        }
        Err(UserError::Validation(msg)) => {
            println!("Could not create superuser: {msg}");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(e)),
    }
}
