use super::score::ScoredItem;

const SEPARATOR_WIDTH: usize = 50;

/// Renders ranked issues as context for the language model.
///
/// Sections: statistics header, one block per analyzed issue, in rank order.
/// Issue bodies are only included when `include_body` is set.
pub fn format_issue_context(repo: &str, total: usize, ranked: &[ScoredItem<'_>], include_body: bool) -> String {
    let mut text = format!("{} issue statistics for the past week:\n", repo);
    text.push_str(&format!("- Total issues: {}\n", total));
    text.push_str(&format!("- Analyzed: top {} popular issues\n\n", ranked.len()));
    text.push_str("Top issues by popularity:\n\n");

    for scored in ranked {
        let issue = scored.item;
        let reactions = issue.reactions.total();

        text.push_str(&format!("#{} - {}\n", issue.number, issue.title));
        text.push_str(&format!("Created: {}\n", issue.created_at.format("%Y-%m-%d")));
        text.push_str(&format!("State: {}\n", issue.state));
        text.push_str(&format!(
            "Popularity: {} comments, {} reactions, score {}\n",
            issue.comments, reactions, scored.score
        ));
        if !issue.labels.is_empty() {
            text.push_str(&format!("Labels: {}\n", issue.labels.join(", ")));
        }
        text.push_str(&format!("URL: {}\n", issue.html_url));
        if include_body {
            if let Some(ref body) = issue.body {
                text.push_str(&format!("Description: {}\n", body));
            }
        }
        text.push_str(&format!("\n{}\n\n", "-".repeat(SEPARATOR_WIDTH)));
    }

    text
}

pub fn format_digest_message(repo: &str, summary: &str) -> String {
    format!("🔧 {} weekly issue digest\n\n{}", repo, summary)
}

pub fn no_issues_message(repo: &str) -> String {
    format!("No new {} issues in the past week.", repo)
}

pub fn fetch_failed_message(repo: &str, error: &str) -> String {
    format!("⚠️ Could not fetch {} issues this week: {}", repo, error)
}
