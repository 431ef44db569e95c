use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use herald::arbitrage::{self, ArbitrageSettings, CheckOutcome, MarketPriceFeed};
use herald::delivery::{all_delivered, ChatTransport};
use herald::environment::{
    self, ChatConfig, GithubConfig, TelegramConfig, DEFAULT_FAST_MODEL, DEFAULT_SMART_MODEL,
};
use herald::headlines::{self, HackerNewsFetcher, RecommenderOutcome, RecommenderSettings};
use herald::issues::{self, DigestOutcome, DigestProfile, DigestSettings, GithubIssueFetcher};
use herald::llm::ChatCompletionClient;
use herald::logging::configure_logging;
use herald::telegram::{ParseMode, TelegramClient};
use std::path::PathBuf;
use tokio::main;
use tokio::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory for the rolling log file
    #[arg(long, default_value = "logs", global = true)]
    log_dir: String,

    /// Timeout for every HTTP request, in seconds
    #[arg(long, default_value = "60", global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the past week's GitHub issues of a repository
    Issues {
        /// Repository as owner/name
        #[arg(short, long, default_value = "ClickHouse/ClickHouse")]
        repo: String,

        /// Project name used in prompts and messages
        #[arg(short, long, default_value = "ClickHouse")]
        project: String,

        /// How much analysis to ask for
        #[arg(long, value_enum, default_value = "detailed")]
        profile: DigestProfile,

        /// Number of top issues to analyze (defaults depend on the profile)
        #[arg(short = 'n', long, conflicts_with = "all")]
        top_n: Option<usize>,

        /// Analyze every issue of the week
        #[arg(long)]
        all: bool,

        /// Who the digest is written for
        #[arg(long, default_value = "a DevOps team")]
        audience: String,

        /// Language of the summary
        #[arg(short, long, default_value = "Korean")]
        language: String,

        /// Days to look back
        #[arg(long, default_value = "7")]
        days: i64,

        /// Where the Markdown archive is written
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// File name prefix of the archive
        #[arg(long, default_value = "clickhouse_weekly_summary")]
        archive_prefix: String,

        /// Pause between message chunks, in milliseconds
        #[arg(long, default_value = "1000")]
        pause_ms: u64,
    },

    /// Check the conversion arbitrage between two listed shares
    Arbitrage {
        /// A shares received per B share
        #[arg(short, long, default_value_t = arbitrage::DEFAULT_RATIO)]
        ratio: f64,

        /// Alert when the absolute deviation reaches this percentage
        #[arg(short, long, default_value_t = arbitrage::DEFAULT_THRESHOLD_PCT)]
        threshold: f64,

        /// Trading fee per side, in percent
        #[arg(short, long, default_value_t = arbitrage::DEFAULT_FEE_PCT)]
        fee: f64,

        /// Send the report even below the threshold (always on under GitHub Actions)
        #[arg(short, long)]
        send_always: bool,
    },

    /// Translate and recommend Hacker News headlines
    Headlines {
        /// Headlines listed at the top
        #[arg(long, default_value = "5")]
        top: usize,

        /// Articles recommended from the rest
        #[arg(long, default_value = "5")]
        recommend: usize,

        /// Language of the translations
        #[arg(short, long, default_value = "Korean")]
        language: String,
    },
}

fn telegram_client(timeout: Duration, parse_mode: Option<ParseMode>) -> Result<Option<TelegramClient>> {
    let Some(config) = TelegramConfig::from_env() else {
        warn!("TG_TOKEN or TG_CHAT_ID not set, messages will only be logged");
        return Ok(None);
    };
    let client = TelegramClient::new(&config, timeout).context("Failed to create Telegram client")?;
    Ok(Some(match parse_mode {
        Some(mode) => client.with_parse_mode(mode),
        None => client,
    }))
}

fn chat_config(model_var: &str, default_model: &str) -> Result<ChatConfig> {
    ChatConfig::from_env(model_var, default_model).ok_or_else(|| anyhow!("CHAT_API_KEY is not set"))
}

fn report_delivery(delivered: bool, attempted: bool) {
    if !attempted {
        return;
    }
    if delivered {
        info!("Notification delivered");
    } else {
        warn!("Notification was not fully delivered");
    }
}

#[main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    configure_logging(&cli.log_dir);

    let timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Commands::Issues {
            repo,
            project,
            profile,
            top_n,
            all,
            audience,
            language,
            days,
            output_dir,
            archive_prefix,
            pause_ms,
        } => {
            let chat = chat_config("CHAT_MODEL_SMART", DEFAULT_SMART_MODEL)?;
            let mut transform = ChatCompletionClient::new(&chat, timeout);
            if profile == DigestProfile::Detailed {
                transform = transform.with_max_tokens(8000).with_temperature(0.5);
            }
            info!("Using model {}", transform.model());

            let source = GithubIssueFetcher::new(&repo, &GithubConfig::from_env(), timeout)
                .context("Failed to create GitHub client")?;
            let telegram = telegram_client(timeout, None)?;

            let settings = DigestSettings {
                project,
                profile,
                top_n: if all { None } else { top_n.or(profile.default_top_n()) },
                audience,
                language,
                lookback: chrono::Duration::days(days),
                output_dir,
                archive_prefix,
                chunk_pause: Some(Duration::from_millis(pause_ms)),
            };

            let outcome = issues::run_digest(
                &source,
                &transform,
                telegram.as_ref().map(|t| t as &dyn ChatTransport),
                &settings,
                Local::now(),
            )
            .await?;

            match outcome {
                DigestOutcome::FetchFailed(reason) => println!("Could not fetch issues: {}", reason),
                DigestOutcome::NoIssues => println!("No new issues in the past {} days", days),
                DigestOutcome::Summarized {
                    issue_count,
                    analyzed,
                    summary,
                    archive_path,
                    delivery,
                } => {
                    println!("{}", "=".repeat(60));
                    println!("{} issues collected, {} analyzed", issue_count, analyzed);
                    println!("{}", "=".repeat(60));
                    println!("{}", summary);
                    println!("{}", "=".repeat(60));
                    println!("Saved to {}", archive_path.display());
                    report_delivery(all_delivered(&delivery), telegram.is_some());
                }
            }
        }

        Commands::Arbitrage {
            ratio,
            threshold,
            fee,
            send_always,
        } => {
            let feed = MarketPriceFeed::new(timeout).context("Failed to create price feed")?;
            let telegram = telegram_client(timeout, Some(ParseMode::Markdown))?;

            let settings = ArbitrageSettings {
                ratio,
                threshold_pct: threshold,
                round_trip_fee_pct: fee,
                send_always: send_always || environment::running_in_github_actions(),
                ..ArbitrageSettings::default()
            };

            let outcome = arbitrage::run_check(
                &feed,
                telegram.as_ref().map(|t| t as &dyn ChatTransport),
                &settings,
                Local::now(),
            )
            .await?;

            match outcome {
                CheckOutcome::NoData(reason) => println!("No price data: {}", reason),
                CheckOutcome::Skipped(decision) => println!(
                    "Deviation {:+.2}% is under the {}% threshold",
                    decision.deviation_pct, threshold
                ),
                CheckOutcome::Sent {
                    decision,
                    alert,
                    delivery,
                } => {
                    println!(
                        "Deviation {:+.2}% ({:?}){}",
                        decision.deviation_pct,
                        decision.classification,
                        if alert { ", alert sent" } else { "" }
                    );
                    report_delivery(all_delivered(&delivery), telegram.is_some());
                }
            }
        }

        Commands::Headlines {
            top,
            recommend,
            language,
        } => {
            let chat = chat_config("CHAT_MODEL_FAST", DEFAULT_FAST_MODEL)?;
            let transform = ChatCompletionClient::new(&chat, timeout);
            info!("Using model {}", transform.model());

            let source = HackerNewsFetcher::new(timeout).context("Failed to create HTTP client")?;
            let telegram = telegram_client(timeout, None)?;

            let settings = RecommenderSettings {
                top_count: top,
                recommend_count: recommend,
                language,
                chunk_pause: None,
            };

            let outcome = headlines::run_recommender(
                &source,
                &transform,
                telegram.as_ref().map(|t| t as &dyn ChatTransport),
                &settings,
            )
            .await?;

            match outcome {
                RecommenderOutcome::FetchFailed(reason) => println!("Could not fetch headlines: {}", reason),
                RecommenderOutcome::Sent { message, delivery } => {
                    println!("{}", message);
                    report_delivery(all_delivered(&delivery), telegram.is_some());
                }
            }
        }
    }

    Ok(())
}
