use anyhow::{Context, bail};
use cityweather_core::{Config, WeatherProvider, WeatherReport, provider_from_config};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use std::{io::Write, process::ExitCode};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather and 5-day forecast for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key (and optionally a custom endpoint).
    Configure,

    /// Show current weather and the forecast for a city.
    Show {
        /// City name, passed to the provider as typed.
        city: String,

        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => configure().map(|()| ExitCode::SUCCESS),
            Command::Show { city, json } => show(&city, json).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    cfg.set_api_key(api_key.trim().to_string());

    let base_url = Text::new("Custom endpoint (leave empty for the public API):")
        .with_initial_value(cfg.base_url().unwrap_or_default())
        .prompt()
        .context("Failed to read endpoint")?;
    cfg.set_base_url(Some(base_url.trim().to_string()));

    let path = cfg.save()?;
    tracing::info!(path = %path.display(), "configuration saved");
    println!("Saved configuration to {}", path.display());

    Ok(())
}

async fn show(city: &str, json: bool) -> anyhow::Result<ExitCode> {
    let cfg = Config::load()?.with_env_overrides();
    let provider = provider_from_config(&cfg)?;

    let found = print_lookup(
        provider.as_ref(),
        city,
        json,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await?;

    Ok(if found { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Writes the report to `out`, or the user-facing failure line to `err_out`.
/// Returns whether the lookup succeeded.
async fn print_lookup(
    provider: &dyn WeatherProvider,
    city: &str,
    json: bool,
    out: &mut impl Write,
    err_out: &mut impl Write,
) -> anyhow::Result<bool> {
    match provider.lookup(city).await {
        Ok(report) => {
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            } else {
                write!(out, "{}", render(&report))?;
            }
            Ok(true)
        }
        Err(err) => {
            writeln!(err_out, "{}", err.user_message())?;
            Ok(false)
        }
    }
}

fn render(report: &WeatherReport) -> String {
    let current = &report.current;
    let mut out = format!(
        "{}: {:.1}°C, {} [{}]\n",
        current.city, current.temperature, current.description, current.icon
    );

    if !report.forecast.is_empty() {
        out.push_str("\nForecast:\n");
    }
    for entry in &report.forecast {
        out.push_str(&format!(
            "  {}  {:>6.1}°C  {} [{}]\n",
            entry.datetime, entry.temperature, entry.description, entry.icon
        ));
    }

    out
}
