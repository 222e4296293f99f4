use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "trtodo-web", version, about = "Server-rendered todo page backed by a managed GraphQL API")]
pub struct Cli {
    /// Path to the JSON config file
    #[arg(long, global = true, env = "TRTODO_WEB_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the todo page over HTTP
    Serve {
        /// Address to listen on, overriding server.listen
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Fetch the todo list once and print it
    List,
    /// Read or change configuration values
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print one value
    Get { key: String },
    /// Set one value
    Set { key: String, value: String },
    /// Remove one value
    Unset { key: String },
    /// Print every value, marking defaults
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_with_listen() {
        let cli = Cli::try_parse_from(["trtodo-web", "serve", "--listen", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Command::Serve { listen } => assert_eq!(listen, Some("0.0.0.0:8080".parse().unwrap())),
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::try_parse_from([
            "trtodo-web",
            "--config",
            "/tmp/web.json",
            "config",
            "set",
            "list-order",
            "created",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/web.json")));
        assert!(matches!(
            cli.command,
            Command::Config {
                command: ConfigCommand::Set { .. }
            }
        ));
    }
}
