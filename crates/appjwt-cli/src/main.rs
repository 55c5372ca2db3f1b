use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use appjwt_core::validity::parse_duration;
use appjwt_core::{
    load_config, ClaimsValidation, IssuanceParameters, IssuerConfig, KeySource, TokenIssuer,
};
use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate a signed JWT to authenticate as an application (e.g. a GitHub App).
///
/// The token is written to stdout. Exactly one of --duration and --expires-at
/// may be given; without either the token is valid for 10 minutes.
#[derive(Parser, Debug)]
#[command(name = "appjwt", author, version, about, long_about = None)]
struct Cli {
    /// The application ID placed in the `iss` claim (required)
    #[arg(long, visible_alias = "iss", env = "APPJWT_ISSUER", allow_negative_numbers = true)]
    issuer: Option<i64>,

    /// Unix time the token was issued at [default: now]
    #[arg(long, visible_alias = "iat", value_name = "UNIX", allow_negative_numbers = true)]
    issued_at: Option<i64>,

    /// Unix time the token expires at [default: issued-at + duration]
    #[arg(long, visible_alias = "exp", value_name = "UNIX", allow_negative_numbers = true)]
    expires_at: Option<i64>,

    /// How long the token is valid, e.g. 600, 90s, 5m, 1h30m [default: 10m]
    #[arg(long, visible_alias = "dur", value_name = "SPAN")]
    duration: Option<String>,

    /// Signing algorithm, one of HS256/384/512, RS256/384/512, PS256/384/512,
    /// ES256/384 or EdDSA [default: RS256]
    #[arg(long, visible_alias = "alg", env = "APPJWT_ALGORITHM")]
    algorithm: Option<String>,

    /// PEM file holding the private signing key (required)
    #[arg(long, visible_alias = "pem", env = "APPJWT_KEY_PATH", value_name = "PATH")]
    key_path: Option<PathBuf>,

    /// TOML or YAML file supplying defaults for the options above
    #[arg(long, env = "APPJWT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also reject tokens that are already expired or issued in the future
    #[arg(long)]
    strict_time: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(token) => {
            println!("{token}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", render_error(&err));
            eprintln!();
            eprint!("{}", Cli::command().render_help());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<String> {
    let now = unix_now()?;
    let config = match &cli.config {
        Some(path) => load_config(path).context("failed to load config")?,
        None => IssuerConfig::default(),
    };
    let mut policy = config.policy()?;
    if cli.strict_time {
        policy.validation = ClaimsValidation::strict();
    }

    let params = build_params(cli, &config, now)?;
    let issuer = TokenIssuer::new(policy);
    let resolution = issuer.resolve(&params)?;
    let token = TokenIssuer::sign(
        &resolution.claims,
        &resolution.key,
        resolution.method.name(),
    )?;
    info!(
        "issued {} token for issuer {} valid until {}",
        resolution.method.name(),
        resolution.claims.iss,
        resolution.claims.exp
    );
    Ok(token)
}

/// Merges flags over config values. Only flags count as explicit window inputs.
fn build_params(cli: &Cli, config: &IssuerConfig, now: i64) -> Result<IssuanceParameters> {
    let duration = cli.duration.as_deref().map(parse_duration).transpose()?;
    let key_path = cli.key_path.clone().or_else(|| config.key_path.clone());
    Ok(IssuanceParameters {
        issuer: cli.issuer.or(config.issuer).unwrap_or(0),
        issued_at: cli.issued_at,
        expires_at: cli.expires_at,
        duration,
        algorithm: cli.algorithm.clone(),
        key: key_path.map(KeySource::File),
        now,
    })
}

/// Renders the error chain as the single diagnostic line written to stderr.
fn render_error(err: &anyhow::Error) -> String {
    format!("{err:#}")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn unix_now() -> Result<i64> {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?;
    unix_seconds(since_epoch)
}

fn unix_seconds(since_epoch: Duration) -> Result<i64> {
    i64::try_from(since_epoch.as_secs()).context("system clock beyond the unix timestamp range")
}
