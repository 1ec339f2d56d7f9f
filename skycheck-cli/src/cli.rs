use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use skycheck_core::{Config, CredentialSource, config::API_KEY_ENV, model::normalize_country};
use tracing::{info, warn};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycheck", version, about = "Current weather for a city or pincode")]
pub struct Cli {
    /// Log request details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default country in the config file.
    Configure,

    /// Show current weather for a location (the default).
    Show(ShowArgs),
}

#[derive(Debug, Default, Args)]
pub struct ShowArgs {
    /// City name or numeric postal code; prompted for when absent.
    pub location: Option<String>,

    /// Country code paired with postal codes, e.g. "US".
    #[arg(long)]
    pub country: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// API key; overrides the environment and the config file.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

enum Input {
    Value(String),
    Cancelled,
}

/// How a `show` run ended, before it becomes a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

const LOCATION_PROMPT: &str = "Enter city name or pincode:";

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Show(args)) => show(args).await,
            None => show(ShowArgs::default()).await,
        }
    }
}

async fn show(args: ShowArgs) -> anyhow::Result<ExitCode> {
    let config = Config::load()?;
    let env_key = std::env::var(API_KEY_ENV).ok();

    let outcome = run_show(
        args,
        &config,
        env_key.as_deref(),
        prompt_location,
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .await?;

    Ok(outcome.into())
}

/// The location is read and validated before the credential is resolved, so
/// cancelling or giving no location never trips over a missing key.
async fn run_show(
    args: ShowArgs,
    config: &Config,
    env_key: Option<&str>,
    prompt: impl FnOnce() -> anyhow::Result<Input>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let location = match args.location {
        Some(location) => location,
        None => match prompt()? {
            Input::Value(location) => location,
            Input::Cancelled => {
                writeln!(out, "\nInput cancelled.")?;
                return Ok(Outcome::Success);
            }
        },
    };

    let location = location.trim();
    if location.is_empty() {
        writeln!(out, "No location provided. Exiting.")?;
        return Ok(Outcome::Failure);
    }

    let (credential, source) = config.resolve_credential(args.api_key.as_deref(), env_key)?;
    if source == CredentialSource::CommandLine {
        warn!("API key passed on the command line is visible to other processes; prefer {API_KEY_ENV}");
    }
    info!(%source, "using API key");

    let fetcher = config.fetcher(args.country.as_deref());
    let timeout = config.timeout(args.timeout);

    match fetcher.fetch(location, &credential, Some(timeout)).await {
        Ok(info) if args.json => writeln!(out, "{}", output::render_json(&info)?)?,
        Ok(info) => writeln!(out, "{}", output::render(&info))?,
        Err(e) => {
            writeln!(err, "Error: {e}")?;
            return Ok(Outcome::Failure);
        }
    }

    Ok(Outcome::Success)
}

fn configure() -> anyhow::Result<ExitCode> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message("Leave empty to keep the current key")
        .without_confirmation()
        .prompt();
    let api_key = match cancellable(api_key)? {
        Input::Value(key) => key,
        Input::Cancelled => {
            println!("\nInput cancelled.");
            return Ok(ExitCode::SUCCESS);
        }
    };

    let current_country = config.country(None);
    let country = Text::new("Default country for pincodes:")
        .with_default(&current_country)
        .prompt();
    let country = match cancellable(country)? {
        Input::Value(country) => country,
        Input::Cancelled => {
            println!("\nInput cancelled.");
            return Ok(ExitCode::SUCCESS);
        }
    };

    let api_key = api_key.trim();
    if !api_key.is_empty() {
        config.api_key = Some(api_key.to_string());
    }
    config.default_country = Some(normalize_country(&country));

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(ExitCode::SUCCESS)
}

fn prompt_location() -> anyhow::Result<Input> {
    match Text::new(LOCATION_PROMPT).prompt() {
        Err(InquireError::NotTTY) => read_line(io::stdin().lock(), &mut io::stderr()),
        other => cancellable(other),
    }
}

/// Plain line read for piped input. EOF counts as cancellation.
fn read_line(mut reader: impl BufRead, prompt_out: &mut impl Write) -> anyhow::Result<Input> {
    write!(prompt_out, "{LOCATION_PROMPT} ").context("Failed to write prompt")?;
    prompt_out.flush().context("Failed to flush prompt")?;

    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .context("Failed to read location from stdin")?;

    if read == 0 {
        Ok(Input::Cancelled)
    } else {
        Ok(Input::Value(line))
    }
}

fn cancellable(answer: Result<String, InquireError>) -> anyhow::Result<Input> {
    match answer {
        Ok(value) => Ok(Input::Value(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            Ok(Input::Cancelled)
        }
        Err(err) => Err(err).context("Failed to read input"),
    }
}
