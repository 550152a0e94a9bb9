use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use weather_widget::{
    config::{DEFAULT_LOG_FILTER, RuntimeConfig},
    error::{ErrorKind, SearchError},
    page::Page,
    providers::{HttpProviders, ProviderApi},
    session,
    units::TemperatureUnit,
    widget::Widget,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "City weather widget (Open-Meteo, no API key)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search one city and render current, daily, hourly, alerts and map regions.
    Search {
        #[arg(long)]
        city: Option<String>,
        #[arg(long, value_enum)]
        unit: Option<UnitArg>,
        #[arg(long, value_enum)]
        output: Option<OutputModeArg>,
        #[arg(long)]
        json: bool,
    },
    /// Interactive session: one city or command per line on stdin.
    Session {
        #[arg(long, value_enum)]
        unit: Option<UnitArg>,
    },
}

const ENVELOPE_SCHEMA_VERSION: &str = "v1";
const COMMAND_SEARCH: &str = "weather.search";
const COMMAND_SESSION: &str = "weather.session";
const ERROR_CODE_USER_INVALID_INPUT: &str = "user.invalid_input";
const ERROR_CODE_USER_CITY_NOT_FOUND: &str = "user.city_not_found";
const ERROR_CODE_USER_OUTPUT_MODE_CONFLICT: &str = "user.output_mode_conflict";
const ERROR_CODE_RUNTIME_PROVIDER_FAILED: &str = "runtime.provider_failed";
const ERROR_CODE_RUNTIME_INVALID_PAYLOAD: &str = "runtime.invalid_payload";
const ERROR_CODE_RUNTIME_PROVIDER_INIT: &str = "runtime.provider_init_failed";
const ERROR_CODE_RUNTIME_SERIALIZE: &str = "runtime.serialize_failed";
const ERROR_CODE_RUNTIME_IO: &str = "runtime.io_failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UnitArg {
    Celsius,
    Fahrenheit,
}

impl From<UnitArg> for TemperatureUnit {
    fn from(value: UnitArg) -> Self {
        match value {
            UnitArg::Celsius => TemperatureUnit::Celsius,
            UnitArg::Fahrenheit => TemperatureUnit::Fahrenheit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputModeArg {
    Human,
    Json,
    Html,
}

impl OutputModeArg {
    fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliError {
    kind: ErrorKind,
    code: &'static str,
    message: String,
    cause: Option<String>,
}

impl CliError {
    fn user(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::User,
            code,
            message: message.into(),
            cause: None,
        }
    }

    fn runtime(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            code,
            message: message.into(),
            cause: None,
        }
    }

    fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }
}

impl From<SearchError> for CliError {
    fn from(error: SearchError) -> Self {
        let code = match &error {
            SearchError::Validation(_) => ERROR_CODE_USER_INVALID_INPUT,
            SearchError::CityNotFound(_) => ERROR_CODE_USER_CITY_NOT_FOUND,
            SearchError::Provider(_) => ERROR_CODE_RUNTIME_PROVIDER_FAILED,
            SearchError::Payload(_) => ERROR_CODE_RUNTIME_INVALID_PAYLOAD,
        };
        Self {
            kind: error.kind(),
            code,
            message: error.alert_message().to_string(),
            cause: Some(error.to_string()),
        }
    }
}

impl Cli {
    fn command_name(&self) -> &'static str {
        match &self.command {
            Commands::Search { .. } => COMMAND_SEARCH,
            Commands::Session { .. } => COMMAND_SESSION,
        }
    }

    fn output_mode_hint(&self) -> OutputModeArg {
        match &self.command {
            Commands::Search { output, json, .. } => {
                if *json {
                    OutputModeArg::Json
                } else {
                    output.unwrap_or(OutputModeArg::Human)
                }
            }
            Commands::Session { .. } => OutputModeArg::Human,
        }
    }
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let command = cli.command_name();
    let output_mode = cli.output_mode_hint();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    match run(cli, stdin.lock(), &mut stdout) {
        Ok(output) if output.is_empty() => {}
        Ok(output) => println!("{output}"),
        Err(error) => {
            emit_error(command, output_mode, &error);
            std::process::exit(error.exit_code());
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();
}

fn run<R: BufRead, W: Write>(cli: Cli, input: R, output: &mut W) -> Result<String, CliError> {
    let config = RuntimeConfig::from_env();
    let providers = HttpProviders::new(&config)
        .map_err(|error| CliError::runtime(ERROR_CODE_RUNTIME_PROVIDER_INIT, error.to_string()))?;
    run_with(cli, &config, &providers, input, output)
}

fn run_with<P, R, W>(
    cli: Cli,
    config: &RuntimeConfig,
    providers: &P,
    input: R,
    output: &mut W,
) -> Result<String, CliError>
where
    P: ProviderApi,
    R: BufRead,
    W: Write,
{
    match cli.command {
        Commands::Search {
            city,
            unit,
            output: output_mode,
            json,
        } => {
            let output_mode = resolve_output_mode(output_mode, json)?;
            let config = config.clone().with_unit(unit.map(Into::into));
            run_search(&config, providers, city.as_deref().unwrap_or_default(), output_mode)
        }
        Commands::Session { unit } => {
            let config = config.clone().with_unit(unit.map(Into::into));
            let mut widget = Widget::new(config.unit);
            session::run_session(&mut widget, providers, input, output)
                .map_err(|error| CliError::runtime(ERROR_CODE_RUNTIME_IO, error.to_string()))?;
            Ok(String::new())
        }
    }
}

fn run_search<P: ProviderApi>(
    config: &RuntimeConfig,
    providers: &P,
    city: &str,
    output_mode: OutputModeArg,
) -> Result<String, CliError> {
    let mut widget = Widget::new(config.unit);
    widget.set_city_input(city);
    let mut page = Page::new();
    let view = widget.search(providers, &mut page)?;

    match output_mode {
        OutputModeArg::Human => Ok(page.to_text()),
        OutputModeArg::Html => Ok(page.to_html()),
        OutputModeArg::Json => {
            let result = serde_json::to_value(&view).map_err(|error| {
                CliError::runtime(
                    ERROR_CODE_RUNTIME_SERIALIZE,
                    format!("failed to serialize output: {error}"),
                )
            })?;
            serde_json::to_string(&json!({
                "schema_version": ENVELOPE_SCHEMA_VERSION,
                "command": COMMAND_SEARCH,
                "ok": true,
                "result": result,
            }))
            .map_err(|error| {
                CliError::runtime(
                    ERROR_CODE_RUNTIME_SERIALIZE,
                    format!("failed to serialize output envelope: {error}"),
                )
            })
        }
    }
}

fn resolve_output_mode(
    output: Option<OutputModeArg>,
    json_flag: bool,
) -> Result<OutputModeArg, CliError> {
    match (output, json_flag) {
        (Some(mode), true) if mode != OutputModeArg::Json => Err(CliError::user(
            ERROR_CODE_USER_OUTPUT_MODE_CONFLICT,
            format!(
                "conflicting output flags: --json requires --output json (got {})",
                mode.as_str()
            ),
        )),
        (Some(mode), _) => Ok(mode),
        (None, true) => Ok(OutputModeArg::Json),
        (None, false) => Ok(OutputModeArg::Human),
    }
}

fn emit_error(command: &str, output_mode: OutputModeArg, error: &CliError) {
    match output_mode {
        OutputModeArg::Json => {
            let payload = json!({
                "schema_version": ENVELOPE_SCHEMA_VERSION,
                "command": command,
                "ok": false,
                "error": {
                    "code": error.code,
                    "message": error.message,
                    "details": {
                        "kind": error.kind.as_str(),
                        "exit_code": error.exit_code(),
                        "cause": error.cause,
                    }
                }
            });
            println!("{payload}");
        }
        OutputModeArg::Human | OutputModeArg::Html => match &error.cause {
            Some(cause) if error.kind == ErrorKind::Runtime => {
                eprintln!("error[{}]: {} ({cause})", error.code, error.message)
            }
            _ => eprintln!("error[{}]: {}", error.code, error.message),
        },
    }
}
