mod config;
mod config_wizard;
mod runner;
mod utils;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use simplelog::*;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use sumo_search::{SearchRequest, SumoClient};

use crate::config::Config;
use crate::runner::RunOptions;
use crate::utils::render::{render, OutputFormat};
use crate::utils::timerange;

#[derive(Parser)]
#[command(name = "sumosearch")]
#[command(about = "Run Sumo Logic search jobs from the command line", long_about = None)]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search job and print one page of messages
    Search(SearchArgs),
    /// Run the configuration wizard
    Config,
}

#[derive(Args)]
struct SearchArgs {
    /// Query to run, e.g. '_sourceCategory=prod/app error'
    query: String,

    /// Start of the range: 'now', an offset like -15m, RFC 3339, or YYYY-MM-DDTHH:MM:SS
    #[arg(long, default_value = "-15m", allow_hyphen_values = true)]
    from: String,

    /// End of the range, same forms as --from
    #[arg(long, default_value = "now", allow_hyphen_values = true)]
    to: String,

    /// Time zone for zone-less timestamps (defaults to the configured one)
    #[arg(long)]
    time_zone: Option<String>,

    #[arg(long, default_value_t = 0)]
    offset: u64,

    #[arg(long, default_value_t = 100)]
    limit: u64,

    /// Seconds between status polls; never faster than the API rate limit allows
    #[arg(long, default_value_t = 5.0)]
    poll_interval: f64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    match log_file {
        Some(path) => {
            let _ = WriteLogger::init(
                LevelFilter::Info,
                simplelog::Config::default(),
                File::create(path).context(format!("Failed to create log file {:?}", path))?,
            );
        }
        None => {
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or("warn"),
            )
            .try_init();
        }
    }
    Ok(())
}

async fn search(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;
    config.validate()?;
    log::info!("Loaded endpoint: '{}'", config.endpoint);

    let now = chrono::Utc::now();
    let request = SearchRequest::new(
        args.query,
        timerange::resolve(&args.from, now)?,
        timerange::resolve(&args.to, now)?,
        args.time_zone.unwrap_or_else(|| config.time_zone().to_string()),
    );

    let client = SumoClient::new(config.token(), &config.endpoint)?;
    let options = RunOptions {
        poll_interval: Duration::try_from_secs_f64(args.poll_interval)
            .context("--poll-interval must be a non-negative number of seconds")?,
        offset: args.offset,
        limit: args.limit,
    };

    let result = runner::run_search(&client, &request, &options).await?;
    println!("{}", render(&result, args.output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Cli::parse();
    init_logging(args.log_file.as_ref())?;

    match args.command {
        Commands::Config => config_wizard::run(),
        Commands::Search(search_args) => search(search_args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_defaults() {
        let cli = Cli::try_parse_from(["sumosearch", "search", "error"]).unwrap();
        let Commands::Search(args) = cli.command else {
            panic!("expected search subcommand");
        };
        assert_eq!(args.query, "error");
        assert_eq!(args.from, "-15m");
        assert_eq!(args.to, "now");
        assert_eq!(args.limit, 100);
        assert_eq!(args.output, OutputFormat::Json);
        assert!(args.time_zone.is_none());
    }

    #[test]
    fn test_search_flags() {
        let cli = Cli::try_parse_from([
            "sumosearch",
            "--log-file",
            "out.log",
            "search",
            "_sourceCategory=test/sumo",
            "--from",
            "-1h",
            "--time-zone",
            "PST",
            "--limit",
            "2",
            "--output",
            "raw",
        ])
        .unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("out.log")));
        let Commands::Search(args) = cli.command else {
            panic!("expected search subcommand");
        };
        assert_eq!(args.from, "-1h");
        assert_eq!(args.time_zone.as_deref(), Some("PST"));
        assert_eq!(args.limit, 2);
        assert_eq!(args.output, OutputFormat::Raw);
    }

    #[test]
    fn test_relative_times_resolve_from_cli() {
        let argv = ["sumosearch", "search", "error", "--from", "-2h", "--to", "-5m"];
        let cli = Cli::try_parse_from(argv).unwrap();
        let Commands::Search(args) = cli.command else {
            panic!("expected search subcommand");
        };
        assert_eq!(args.from, "-2h");
        assert_eq!(args.to, "-5m");

        let now = chrono::Utc::now();
        let ms = now.timestamp_millis();
        assert_eq!(
            timerange::resolve(&args.from, now).unwrap(),
            (ms - 2 * 3_600_000).to_string()
        );
        assert_eq!(
            timerange::resolve(&args.to, now).unwrap(),
            (ms - 5 * 60_000).to_string()
        );
    }

    #[test]
    fn test_query_required() {
        assert!(Cli::try_parse_from(["sumosearch", "search"]).is_err());
    }
}
