use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trusty_rusty_todo_web::backend::AppSyncClient;
use trusty_rusty_todo_web::cli::{Cli, Command, ConfigCommand};
use trusty_rusty_todo_web::config::ConfigManager;
use trusty_rusty_todo_web::loader::load_index;
use trusty_rusty_todo_web::server::{self, AppState};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut manager =
        ConfigManager::new(cli.config.as_deref()).context("Failed to open configuration")?;

    match cli.command {
        Command::Serve { listen } => {
            let settings = manager
                .config()
                .serve_settings()
                .with_context(|| format!("Invalid configuration in {}", manager.path().display()))?;
            let state = AppState::init(&settings).context("Failed to configure backend client")?;
            server::serve(state, listen.unwrap_or(settings.listen))
                .await
                .context("Server error")?;
        }
        Command::List => {
            let settings = manager
                .config()
                .serve_settings()
                .with_context(|| format!("Invalid configuration in {}", manager.path().display()))?;
            let client = AppSyncClient::new(&settings.graphql_endpoint, &settings.graphql_api_key)
                .context("Failed to configure backend client")?;
            let props = load_index(&client, settings.list_order)
                .await
                .context("Failed to list todos")?;
            if props.todos.is_empty() {
                println!("No todos");
            }
            for todo in &props.todos {
                println!("{}\t{}\t{}", todo.id, todo.name, todo.description);
            }
        }
        Command::Config { command } => match command {
            ConfigCommand::Get { key } => match manager.get(&key) {
                Some(value) => println!("{value}"),
                None => println!("{key} is not set"),
            },
            ConfigCommand::Set { key, value } => {
                manager.set(&key, &value)?;
                println!("Set {key}");
            }
            ConfigCommand::Unset { key } => {
                manager.unset(&key)?;
                println!("Unset {key}");
            }
            ConfigCommand::List => {
                for (key, value, is_default) in manager.list() {
                    if is_default {
                        println!("{key} = {value} (default)");
                    } else {
                        println!("{key} = {value}");
                    }
                }
            }
        },
    }

    Ok(())
}
