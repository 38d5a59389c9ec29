// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! listbot - a chat-driven record manager for Telegram groups.
//!
//! This is the binary entry point.

mod serve;
mod shutdown;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use listbot_config::{ConfigError, ListbotConfig};

/// listbot - a chat-driven record manager for Telegram groups.
#[derive(Parser, Debug)]
#[command(name = "listbot", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the Telegram webhook over HTTP.
    Serve,
    /// Receive updates through long polling (local use).
    Poll,
    /// Print the validated configuration with secrets redacted.
    Config,
}

fn load(path: Option<&PathBuf>) -> Result<ListbotConfig, Vec<ConfigError>> {
    match path {
        Some(path) => listbot_config::load_and_validate_path(path),
        None => listbot_config::load_and_validate(),
    }
}

fn render_config(config: &ListbotConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&config.redacted())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            listbot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Poll) => serve::run_poll(config).await,
        Some(Commands::Config) => match render_config(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(e) => Err(listbot_core::ListbotError::Internal(format!(
                "failed to render configuration: {e}"
            ))),
        },
        None => {
            println!("listbot: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serial_test::serial;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_parses_subcommands_and_config_path() {
        let cli = Cli::try_parse_from(["listbot", "--config", "bot.toml", "poll"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Poll)));
        assert_eq!(cli.config, Some(PathBuf::from("bot.toml")));

        let cli = Cli::try_parse_from(["listbot", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }

    #[test]
    #[serial]
    fn config_file_is_loaded_and_printed_redacted() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("listbot.toml");
        std::fs::write(
            &path,
            r#"
[telegram]
bot_token = "123456:SECRET"
bot_username = "listbot_bot"

[engine]
max_result_count = 5
"#,
        )
        .unwrap();

        let config = load(Some(&path)).expect("config should load");
        assert_eq!(config.engine.max_result_count, 5);

        let rendered = render_config(&config).unwrap();
        assert!(rendered.contains("listbot_bot"));
        assert!(!rendered.contains("123456:SECRET"));
    }

    #[test]
    #[serial]
    fn invalid_config_file_reports_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("listbot.toml");
        std::fs::write(&path, "[engine]\nmax_result_count = 0\n").unwrap();

        assert!(load(Some(&path)).is_err());
    }
}
