use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// Resolved runtime settings, decoupled from argument parsing.
#[derive(Clone, Debug)]
pub struct Context {
    pub api_listen: SocketAddr,
    pub db_path: PathBuf,
    pub reset: bool,
    pub health_interval: Duration,
    pub fetch_timeout: Option<Duration>,
    pub log_file: Option<PathBuf>,
}

impl Context {
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        Self {
            api_listen: SocketAddr::new(cli.host, cli.port),
            db_path: PathBuf::from(&cli.db_path),
            reset: cli.reset,
            health_interval: Duration::from_secs(cli.health_interval_secs),
            fetch_timeout: cli.fetch_timeout_secs.map(Duration::from_secs),
            log_file: cli.log_file.as_ref().map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn from_cli_combines_host_and_port() {
        let cli = crate::cli::Cli::try_parse_from([
            "release-redirect",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--health-interval-secs",
            "60",
        ])
        .unwrap();
        let ctx = Context::from_cli(&cli);
        assert_eq!(ctx.api_listen, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(ctx.health_interval, Duration::from_secs(60));
        assert_eq!(ctx.fetch_timeout, None);
    }
}
