//! Route access rule checker
//!
//! Loads a rule set and evaluates a single request against it.

use clap::{Args as ClapArgs, Parser, Subcommand};
use route_warden::{
    AccessRequest, RuleEvaluator, User,
    config::{AccessControlConfig, LogFormat, LoggingConfig, load_config},
};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Evaluate ordered allow/deny route rules
#[derive(Parser, Debug)]
#[command(name = "route-warden")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, env = "ROUTE_WARDEN_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides logging.level
    #[arg(long, env = "ROUTE_WARDEN_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the verdict for a request (exit code 1 when denied)
    Check(RequestArgs),
    /// Print the verdict and the rule that decided it
    Explain(RequestArgs),
    /// Load and compile the rule set
    Validate,
}

#[derive(ClapArgs, Debug)]
struct RequestArgs {
    /// Request path
    #[arg(long)]
    url: String,

    /// Role held by the user (repeatable)
    #[arg(long = "role")]
    roles: Vec<String>,

    /// User status
    #[arg(long)]
    status: Option<String>,

    /// The caller's token passed verification
    #[arg(long)]
    valid: bool,
}

impl RequestArgs {
    fn into_request(self) -> AccessRequest {
        let mut user = User::new(self.roles);
        user.status = self.status;
        AccessRequest::new(self.url, user).with_valid_token(self.valid)
    }
}

fn init_logging(logging: &LoggingConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration; logging settings come from it
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&LoggingConfig::default(), args.log_level.as_deref());
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    init_logging(&config.logging, args.log_level.as_deref());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        rules = config.access_control.rules.len(),
        "Loaded access rules"
    );

    run(args.command, &config.access_control)
        .inspect_err(|e| error!(error = %e, "Access check failed"))
        .map_err(Into::into)
}

fn run(command: Command, access_control: &AccessControlConfig) -> route_warden::Result<ExitCode> {
    let evaluator = RuleEvaluator::new(access_control)?;

    match command {
        Command::Check(request) => {
            let verdict = evaluator.evaluate(&request.into_request());
            println!("{}", serde_json::to_string(&verdict)?);
            Ok(if verdict.is_granted() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Explain(request) => {
            let evaluation = evaluator.explain(&request.into_request());
            println!("{}", serde_json::to_string_pretty(&evaluation)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate => {
            println!(
                "{} rule(s) valid ({:?} mode)",
                evaluator.len(),
                evaluator.mode()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}
