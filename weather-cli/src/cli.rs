use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{CustomUserError, Password, Text, validator::Validation};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::warn;
use weather_core::{
    Config, Runtime, SystemClock, ViewController, ViewState, WeatherQuery, provider_from_config,
};

use crate::render::TerminalCard;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-card", version, about = "Current weather for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default city.
    Configure,

    /// Show the weather for one city and exit.
    Show {
        /// City name, e.g. "London" or "New York".
        city: String,
    },

    /// Load the default city, then read city names from stdin, one per line.
    Watch {
        /// City to load on start instead of the configured default.
        #[arg(long)]
        default_city: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let command = self.command.unwrap_or(Command::Watch { default_city: None });

        match command {
            Command::Configure => configure(),
            Command::Show { city } => show(city).await,
            Command::Watch { default_city } => watch(default_city).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_validator(validate_api_key)
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);

    let default_city = Text::new("Default city:")
        .with_default(&config.default_city)
        .with_validator(validate_city)
        .prompt()
        .context("Failed to read default city")?;
    config.default_city = default_city.trim().to_string();

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

fn validate_api_key(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().is_empty() {
        return Ok(Validation::Invalid("The API key must not be empty".into()));
    }
    Ok(Validation::Valid)
}

fn validate_city(input: &str) -> Result<Validation, CustomUserError> {
    Ok(match WeatherQuery::parse(input) {
        Ok(_) => Validation::Valid,
        Err(err) => Validation::Invalid(err.user_message().into()),
    })
}

async fn show(city: String) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let controller = ViewController::new(TerminalCard::new(), SystemClock, config.view_settings()?);

    let (tx, rx) = mpsc::channel(1);
    tx.send(city).await.context("Failed to queue the search")?;
    drop(tx);

    let controller = Runtime::new(controller, provider).without_page_load().run(rx).await;
    lookup_outcome(controller.state())
}

/// A one-shot lookup that ends on the error card is a failed command.
fn lookup_outcome(state: Option<&ViewState>) -> anyhow::Result<()> {
    match state {
        Some(ViewState::Error(message)) => Err(anyhow!("{message}")),
        _ => Ok(()),
    }
}

async fn watch(default_city: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(city) = default_city {
        config.default_city = city;
    }

    let provider = provider_from_config(&config)?;
    let controller = ViewController::new(TerminalCard::new(), SystemClock, config.view_settings()?);

    Runtime::new(controller, provider).run(stdin_lines()).await;
    Ok(())
}

/// Forward stdin lines to a channel until EOF.
fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "failed to read from stdin");
                    break;
                }
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_watch() {
        let cli = Cli::try_parse_from(["weather-card"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn show_takes_a_city() {
        let cli = Cli::try_parse_from(["weather-card", "show", "New York"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Show { city }) if city == "New York"));
    }

    #[test]
    fn watch_accepts_default_city_override() {
        let cli = Cli::try_parse_from(["weather-card", "watch", "--default-city", "Oslo"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Watch { default_city: Some(c) }) if c == "Oslo"
        ));
    }

    #[test]
    fn error_state_fails_the_lookup() {
        let state = ViewState::Error("City not found. Please check the city name and try again.".into());
        let err = lookup_outcome(Some(&state)).unwrap_err();
        assert!(err.to_string().contains("City not found"));

        assert!(lookup_outcome(None).is_ok());
        assert!(lookup_outcome(Some(&ViewState::Loading)).is_ok());
    }

    #[test]
    fn blank_api_key_is_rejected() {
        assert!(matches!(validate_api_key("   ").unwrap(), Validation::Invalid(_)));
        assert!(matches!(validate_api_key("").unwrap(), Validation::Invalid(_)));
        assert!(matches!(validate_api_key(" abc123 ").unwrap(), Validation::Valid));
    }

    #[test]
    fn blank_default_city_is_rejected() {
        assert!(matches!(validate_city(" ").unwrap(), Validation::Invalid(_)));
        assert!(matches!(validate_city("Oslo").unwrap(), Validation::Valid));
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
