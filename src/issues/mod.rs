//! Weekly digest of the most discussed issues in a GitHub repository.

mod fetcher;
mod report;
mod score;
mod types;

pub use self::fetcher::{parse_issue_page, GithubIssueFetcher, IssueSource};
pub use self::report::*;
pub use self::score::{rank, score, top_n, ScoredItem};
pub use self::types::*;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use tokio::time::Duration;
use tracing::{info, warn};

use crate::archive::{self, ArchiveDocument};
use crate::delivery::{notify, ChatTransport, DeliveryResult};
use crate::llm::{complete_or_else, TextTransform};
use crate::{prompts, MAX_TELEGRAM_LEN};

/// How much the language model is asked to do with the week's issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DigestProfile {
    /// Per-issue deep analysis of the most popular issues, bodies included.
    Detailed,
    /// Short overview across every issue of the week.
    Brief,
}

impl DigestProfile {
    pub fn default_top_n(&self) -> Option<usize> {
        match self {
            DigestProfile::Detailed => Some(10),
            DigestProfile::Brief => None,
        }
    }

    fn include_bodies(&self) -> bool {
        matches!(self, DigestProfile::Detailed)
    }
}

#[derive(Debug, Clone)]
pub struct DigestSettings {
    /// Display name used in prompts and messages, e.g. "ClickHouse".
    pub project: String,
    pub profile: DigestProfile,
    /// Number of ranked issues handed to the model; `None` means all of them.
    pub top_n: Option<usize>,
    pub audience: String,
    pub language: String,
    pub lookback: chrono::Duration,
    pub output_dir: PathBuf,
    pub archive_prefix: String,
    pub chunk_pause: Option<Duration>,
}

#[derive(Debug)]
pub enum DigestOutcome {
    FetchFailed(String),
    NoIssues,
    Summarized {
        issue_count: usize,
        analyzed: usize,
        summary: String,
        archive_path: PathBuf,
        delivery: Vec<DeliveryResult>,
    },
}

/// Fetches the week's issues, has them summarized, sends and archives the digest.
pub async fn run_digest(
    source: &dyn IssueSource,
    transform: &dyn TextTransform,
    transport: Option<&dyn ChatTransport>,
    settings: &DigestSettings,
    now: DateTime<Local>,
) -> Result<DigestOutcome> {
    let since = now.with_timezone(&Utc) - settings.lookback;
    info!("Collecting {} issues since {}", settings.project, since.format("%Y-%m-%d %H:%M"));

    let issues = match source.fetch_issues(since).await {
        Ok(issues) => issues,
        Err(e) => {
            warn!("Could not fetch issues: {}", e);
            let message = fetch_failed_message(&settings.project, &e.to_string());
            notify(transport, &message, MAX_TELEGRAM_LEN, settings.chunk_pause).await;
            return Ok(DigestOutcome::FetchFailed(e.to_string()));
        }
    };
    info!("Collected {} issues", issues.len());

    if issues.is_empty() {
        let message = no_issues_message(&settings.project);
        info!("{}", message);
        notify(transport, &message, MAX_TELEGRAM_LEN, settings.chunk_pause).await;
        return Ok(DigestOutcome::NoIssues);
    }

    let ranked = match settings.top_n {
        Some(n) => top_n(&issues, n),
        None => rank(&issues),
    };
    let context = format_issue_context(
        &settings.project,
        issues.len(),
        &ranked,
        settings.profile.include_bodies(),
    );

    info!("Generating {:?} digest for {} issues", settings.profile, ranked.len());
    let system = prompts::issue_digest_system_prompt(&settings.project, &settings.audience, &settings.language);
    let prompt = match settings.profile {
        DigestProfile::Detailed => prompts::detailed_digest_prompt(
            &settings.project,
            &settings.audience,
            ranked.len(),
            &settings.language,
            &context,
        ),
        DigestProfile::Brief => {
            prompts::brief_digest_prompt(&settings.project, &settings.audience, &settings.language, &context)
        }
    };
    let summary = complete_or_else(transform, &system, &prompt, |e| {
        format!("Chat API request failed: {}", e)
    })
    .await;

    let message = format_digest_message(&settings.project, &summary);
    let delivery = notify(transport, &message, MAX_TELEGRAM_LEN, settings.chunk_pause).await;

    let archive_path = save_digest(settings, &summary, issues.len(), now)?;

    Ok(DigestOutcome::Summarized {
        issue_count: issues.len(),
        analyzed: ranked.len(),
        summary,
        archive_path,
        delivery,
    })
}

fn save_digest(settings: &DigestSettings, summary: &str, issue_count: usize, now: DateTime<Local>) -> Result<PathBuf> {
    let title = format!("{} weekly issue digest", settings.project);
    let doc = ArchiveDocument {
        title: &title,
        generated_at: now.naive_local(),
        item_label: "Issues",
        item_count: issue_count,
        body: summary,
    };
    archive::save(Path::new(&settings.output_dir), &settings.archive_prefix, &doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingTransport, ScriptedTransform};
    use crate::HeraldError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct StaticSource {
        issues: std::result::Result<Vec<DiscussionItem>, String>,
        since: Mutex<Option<DateTime<Utc>>>,
    }

    #[async_trait]
    impl IssueSource for StaticSource {
        async fn fetch_issues(&self, since: DateTime<Utc>) -> crate::Result<Vec<DiscussionItem>> {
            *self.since.lock().unwrap() = Some(since);
            self.issues.clone().map_err(HeraldError::Fetch)
        }
    }

    fn source(issues: std::result::Result<Vec<DiscussionItem>, String>) -> StaticSource {
        StaticSource {
            issues,
            since: Mutex::new(None),
        }
    }

    fn issue(number: u64, comments: u64) -> DiscussionItem {
        DiscussionItem {
            number,
            title: format!("Issue {}", number),
            created_at: Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap(),
            state: IssueState::Open,
            comments,
            reactions: ReactionSummary::default(),
            labels: Vec::new(),
            html_url: format!("https://github.com/o/r/issues/{}", number),
            body: Some(format!("body of {}", number)),
        }
    }

    fn settings(dir: &Path, profile: DigestProfile) -> DigestSettings {
        DigestSettings {
            project: "ClickHouse".to_string(),
            profile,
            top_n: profile.default_top_n(),
            audience: "a DevOps team".to_string(),
            language: "Korean".to_string(),
            lookback: chrono::Duration::days(7),
            output_dir: dir.to_path_buf(),
            archive_prefix: "clickhouse_weekly_summary".to_string(),
            chunk_pause: None,
        }
    }

    fn now() -> DateTime<Local> {
        Utc.with_ymd_and_hms(2025, 3, 8, 0, 0, 0).unwrap().with_timezone(&Local)
    }

    #[tokio::test]
    async fn test_no_issues_sends_notice() {
        let dir = tempfile::tempdir().unwrap();
        let source = source(Ok(Vec::new()));
        let transform = ScriptedTransform::replying("unused");
        let transport = RecordingTransport::new();

        let outcome = run_digest(&source, &transform, Some(&transport), &settings(dir.path(), DigestProfile::Detailed), now())
            .await
            .unwrap();

        assert!(matches!(outcome, DigestOutcome::NoIssues));
        assert_eq!(transport.sent(), vec!["No new ClickHouse issues in the past week."]);
        assert!(transform.prompts().is_empty());
        assert_eq!(
            *source.since.lock().unwrap(),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_notice() {
        let dir = tempfile::tempdir().unwrap();
        let source = source(Err("502 Bad Gateway".to_string()));
        let transform = ScriptedTransform::replying("unused");
        let transport = RecordingTransport::new();

        let outcome = run_digest(&source, &transform, Some(&transport), &settings(dir.path(), DigestProfile::Brief), now())
            .await
            .unwrap();

        assert!(matches!(outcome, DigestOutcome::FetchFailed(_)));
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("502 Bad Gateway"));
    }

    #[tokio::test]
    async fn test_detailed_digest_limits_to_top_issues() {
        let dir = tempfile::tempdir().unwrap();
        let issues: Vec<DiscussionItem> = (1..=12).map(|n| issue(n, n)).collect();
        let source = source(Ok(issues));
        let transform = ScriptedTransform::replying("Everything is on fire.");
        let transport = RecordingTransport::new();

        let outcome = run_digest(&source, &transform, Some(&transport), &settings(dir.path(), DigestProfile::Detailed), now())
            .await
            .unwrap();

        match outcome {
            DigestOutcome::Summarized {
                issue_count,
                analyzed,
                summary,
                archive_path,
                delivery,
            } => {
                assert_eq!(issue_count, 12);
                assert_eq!(analyzed, 10);
                assert_eq!(summary, "Everything is on fire.");
                assert!(archive_path.exists());
                assert_eq!(delivery.len(), 1);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let (system, prompt) = transform.prompts().remove(0);
        assert!(system.contains("Always respond in Korean"));
        assert!(prompt.contains("#12 - Issue 12"));
        assert!(prompt.contains("Description: body of 12"));
        assert!(!prompt.contains("#2 - Issue 2\n"));
        assert_eq!(
            transport.sent(),
            vec!["🔧 ClickHouse weekly issue digest\n\nEverything is on fire."]
        );
    }

    #[tokio::test]
    async fn test_brief_digest_covers_all_and_survives_model_failure() {
        let dir = tempfile::tempdir().unwrap();
        let issues: Vec<DiscussionItem> = (1..=12).map(|n| issue(n, 1)).collect();
        let source = source(Ok(issues));
        let transform = ScriptedTransform::failing("401 Unauthorized");

        let outcome = run_digest(&source, &transform, None, &settings(dir.path(), DigestProfile::Brief), now())
            .await
            .unwrap();

        match outcome {
            DigestOutcome::Summarized { analyzed, summary, delivery, .. } => {
                assert_eq!(analyzed, 12);
                assert!(summary.starts_with("Chat API request failed"));
                assert!(delivery.is_empty());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let (_, prompt) = transform.prompts().remove(0);
        assert!(!prompt.contains("Description:"));
    }
}
