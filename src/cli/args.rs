use clap::Parser;
use std::env;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Redirect short names to the latest release assets of registered repositories",
    long_about = "Keeps a table of short names mapped to release feeds and asset filters, \
                  answers the latest tag of a feed, and redirects to the first asset matching the filter."
)]
pub struct Cli {
    #[arg(
        long,
        env = "BIND_ADDRESS",
        default_value = "0.0.0.0",
        value_name = "ADDR",
        help = "Address to listen on"
    )]
    pub host: std::net::IpAddr,

    #[arg(
        short = 'p',
        long,
        env = "PORT",
        default_value_t = 8080u16,
        value_name = "PORT",
        help = "Port to listen on"
    )]
    pub port: u16,

    #[arg(
        long = "db-path",
        env = "DB_PATH",
        default_value = "release-redirect.sqlite",
        value_name = "PATH",
        help = "SQLite database holding the registered repositories"
    )]
    pub db_path: String,

    #[arg(
        long,
        default_value_t = false,
        help = "Reset all persisted state (delete the SQLite database) before starting"
    )]
    pub reset: bool,

    #[arg(
        long = "health-interval-secs",
        env = "HEALTH_INTERVAL_SECS",
        default_value_t = 12 * 60 * 60,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds between store liveness probes"
    )]
    pub health_interval_secs: u64,

    #[arg(
        long = "fetch-timeout-secs",
        env = "FETCH_TIMEOUT_SECS",
        value_name = "SECS",
        help = "Give up on a release feed request after SECS (no limit by default)"
    )]
    pub fetch_timeout_secs: Option<u64>,

    #[arg(
        long = "log-file",
        env = "LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<String>,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    dotenvy::from_filename(&dotenv_path).ok();

    Cli::parse()
}
