//! hnapctl - pilotage d'un boîtier HNAP en ligne de commande

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use hnapclient::{HnapClient, HnapConfigExt, HnapMap, HnapValue};
use hnapconfig::Config;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "hnapctl", version, about = "Query and control HNAP devices")]
struct Cli {
    /// Configuration directory (default: $HNAP_CONFIG, ./.hnap, ~/.hnap)
    #[arg(long, global = true)]
    config: Option<String>,

    /// HNAP endpoint, e.g. http://192.168.0.60/HNAP1/
    #[arg(long, global = true)]
    url: Option<Url>,

    #[arg(long, short, global = true)]
    username: Option<String>,

    #[arg(long, short, global = true, env = "HNAP_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log filter (trace, debug, info, warn, error or a RUST_LOG directive)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the device settings advertised at the HNAP endpoint
    Discover,
    /// Perform the login handshake
    Login,
    /// Log in and call a method with optional Key=Value text fields
    Call {
        method: String,
        #[arg(value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Store --url, --username and --password in the configuration
    SetCredentials,
}

fn parse_field(arg: &str) -> std::result::Result<(String, String), String> {
    arg.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected Key=Value, got {arg:?}"))
}

fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(config.get_log_min_level()?.to_lowercase())?,
        },
    };

    let console = config
        .get_log_enable_console()?
        .then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(console)
        .with(filter)
        .init();
    Ok(())
}

fn build_client(cli: &Cli, config: &Config) -> Result<HnapClient> {
    let url = match &cli.url {
        Some(url) => url.clone(),
        None => config.get_device_url()?,
    };
    let username = match &cli.username {
        Some(username) => username.clone(),
        None => config.get_device_username()?,
    };
    let password = match &cli.password {
        Some(password) => password.clone(),
        None => config.get_device_password()?,
    };
    let timeout = match cli.timeout {
        Some(secs) => Duration::from_secs(secs),
        None => config.get_http_timeout()?,
    };

    debug!("Using HNAP endpoint {} (timeout {:?})", url, timeout);
    Ok(HnapClient::with_http(url, username, password, timeout))
}

fn set_credentials(cli: &Cli, config: &Config) -> Result<()> {
    let url = cli.url.as_ref().ok_or_else(|| anyhow!("--url is required"))?;
    let password = cli
        .password
        .as_deref()
        .ok_or_else(|| anyhow!("--password is required"))?;

    config.set_device_url(url)?;
    if let Some(username) = &cli.username {
        config.set_device_username(username)?;
    }
    config.set_device_password(password)?;

    info!("Device credentials saved in {}", config.directory());
    Ok(())
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Command::Discover => {
            let settings = build_client(cli, config)?.discover()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::Login => {
            let client = build_client(cli, config)?;
            client.login()?;
            println!("Login successful ({} at {})", client.username(), client.url());
        }
        Command::Call { method, fields } => {
            let client = build_client(cli, config)?;
            let session = client.login()?;

            let body: HnapMap = fields
                .iter()
                .map(|(k, v)| (k.clone(), HnapValue::from(v.as_str())))
                .collect();
            let response = client
                .request(&session, method, &body)
                .with_context(|| format!("{method} failed"))?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::SetCredentials => set_credentials(cli, config)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_config(cli.config.as_deref().unwrap_or(""))
        .context("Failed to load configuration")?;
    init_logging(&cli, &config)?;

    run(&cli, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_call() {
        let cli = Cli::try_parse_from([
            "hnapctl",
            "--url",
            "http://192.168.0.60/HNAP1/",
            "call",
            "GetSocketSettings",
            "ModuleID=1",
            "Note=a=b",
        ])
        .unwrap();

        match cli.command {
            Command::Call { method, fields } => {
                assert_eq!(method, "GetSocketSettings");
                assert_eq!(
                    fields,
                    vec![
                        ("ModuleID".to_string(), "1".to_string()),
                        ("Note".to_string(), "a=b".to_string()),
                    ]
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(
            cli.url.map(String::from).as_deref(),
            Some("http://192.168.0.60/HNAP1/")
        );
    }

    #[test]
    fn test_rejects_malformed_field() {
        assert!(Cli::try_parse_from(["hnapctl", "call", "Method", "novalue"]).is_err());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["hnapctl", "login", "--timeout", "5", "-u", "admin"]).unwrap();
        assert!(matches!(cli.command, Command::Login));
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.username.as_deref(), Some("admin"));
    }
}
