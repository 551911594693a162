use clap::{Parser, Subcommand};
use map_reviews::config::{Config, DEFAULT_CONFIG_PATH};
use map_reviews::pipeline::{run_clean, run_scrape, run_sentiment};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "map-reviews")]
#[command(about = "Scrape map-service business reviews, clean them and score their sentiment")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the review page, scroll to the end and save every review.
    ///
    /// Exits with status 1 when the page cannot be loaded or the reviews
    /// cannot be saved, like the other stages.
    Scrape {
        /// Review page URL
        #[arg(long)]
        url: Option<String>,

        /// Output workbook
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },

    /// Deduplicate and normalize scraped comments
    Clean {
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column holding the raw comments
        #[arg(long)]
        column: Option<String>,
    },

    /// Classify cleaned comments and plot the label distribution
    Sentiment {
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Chart image (.png or .svg)
        #[arg(long)]
        chart: Option<PathBuf>,

        /// Model id on the inference endpoint
        #[arg(long)]
        model: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> map_reviews::Result<()> {
    let mut config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Scrape { url, output, headed } => {
            if url.is_some() {
                config.scrape.url = url;
            }
            if let Some(output) = output {
                config.scrape.output = output;
            }
            if headed {
                config.browser.headless = false;
            }
            let summary = run_scrape(&config)?;
            log::info!(
                "Saved {} reviews ({} without rating) to {}",
                summary.reviews,
                summary.missing_ratings,
                summary.output.display()
            );
        }
        Commands::Clean { input, output, column } => {
            let clean = &mut config.clean;
            if let Some(input) = input {
                clean.input = input;
            }
            if let Some(output) = output {
                clean.output = output;
            }
            if let Some(column) = column {
                clean.column = column;
            }
            let summary = run_clean(clean)?;
            log::info!(
                "Kept {} of {} rows, saved to {}",
                summary.rows_out,
                summary.rows_in,
                summary.output.display()
            );
        }
        Commands::Sentiment { input, output, chart, model } => {
            let sentiment = &mut config.sentiment;
            if let Some(input) = input {
                sentiment.input = input;
            }
            if let Some(output) = output {
                sentiment.output = output;
            }
            if let Some(chart) = chart {
                sentiment.chart = chart;
            }
            if let Some(model) = model {
                sentiment.model = model;
            }
            let summary = run_sentiment(&config)?;
            log::info!(
                "Scored {} comments, saved to {}",
                summary.rows,
                summary.output.display()
            );
        }
    }

    Ok(())
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
    fn test_scrape_help_mentions_exit_status() {
        let mut cli = Cli::command();
        let scrape = cli.find_subcommand_mut("scrape").unwrap();
        let help = scrape.render_long_help().to_string();
        assert!(help.contains("Exits with status 1"));
    }

    #[test]
    fn test_headed_flag_parses() {
        let cli = Cli::parse_from(["map-reviews", "scrape", "--headed", "--url", "https://example.com"]);
        match cli.command {
            Commands::Scrape { headed, url, .. } => {
                assert!(headed);
                assert_eq!(url.as_deref(), Some("https://example.com"));
            }
            _ => panic!("expected scrape"),
        }
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }
}
