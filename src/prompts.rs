//! Prompt text sent to the language model.

pub const PLAIN_TEXT_ONLY: &str = "Do not use Markdown links, bold text, or any other Markdown syntax. Output plain text only.";

/// System instruction for the issue digest.
pub fn issue_digest_system_prompt(repo: &str, audience: &str, language: &str) -> String {
    format!(
        "You are a {repo} operations expert. Analyze GitHub issues for {audience}. \
         Provide technical insights with operational impact assessment. Always respond in {language}.",
        repo = repo,
        audience = audience,
        language = language
    )
}

/// In-depth, per-issue analysis of the most popular issues.
pub fn detailed_digest_prompt(repo: &str, audience: &str, analyzed: usize, language: &str, issues_text: &str) -> String {
    format!(
        r#"Analyze the top {analyzed} most popular {repo} GitHub issues from the past week for {audience}. Provide detailed, comprehensive analysis in {language}.

**Context:**
- Issues are pre-sorted by popularity (comments + reactions)

**Analysis Requirements:**
Provide in-depth analysis for each of the {analyzed} issues. DO NOT just summarize - analyze each issue's technical details, root causes, and operational implications.

**Detailed Summary Structure:**

1. 📊 **Issue Statistics Overview**
   - Total issues vs analyzed top {analyzed}
   - Status distribution and engagement metrics

2. 🔥 **Individual Issue Deep Analysis**
   For EACH analyzed issue, provide:
   - Issue title, number, and GitHub link
   - Technical problem description and root cause analysis
   - Potential impact on our environment
   - Urgency level (Critical/High/Medium/Low) with reasoning
   - Specific recommendations for our setup

3. 🎯 **Operational Impact Assessment**
   Group issues by operational impact:
   - **CRITICAL**: Immediate action required (data loss, cluster instability)
   - **HIGH**: Performance/reliability concerns for production
   - **MEDIUM**: Operational improvements and monitoring
   - **LOW**: Future considerations and feature requests

4. ⚠️ **Action Plan**
   - Immediate response items (next 24-48 hours)
   - Short-term monitoring and mitigation (this week)
   - Long-term improvements and upgrades (next month)

5. 🛠️ **Technical Deep Dive**
   - Deployment and operator specific issues
   - Performance optimization opportunities

6. 💡 **Strategic Insights**
   - Patterns in community concerns
   - Version-specific issues to watch
   - Monitoring and alerting improvements needed

**Important**: Analyze each issue individually with technical depth. Explain WHY each is important for our environment and WHAT we should do about it.

Issues:
{issues_text}"#,
        analyzed = analyzed,
        repo = repo,
        audience = audience,
        language = language,
        issues_text = issues_text
    )
}

/// Short overview covering every issue of the week.
pub fn brief_digest_prompt(repo: &str, audience: &str, language: &str, issues_text: &str) -> String {
    format!(
        r#"Summarize this week's {repo} GitHub issues for {audience}. Respond in {language}.

Structure:
1. 📊 Overview: issue counts and the main themes
2. 🔥 Notable issues: the issues most worth reading, with number and link
3. ⚠️ Watch list: anything that could affect production
4. 💡 Takeaways: one or two sentences

Keep it concise. Issues are pre-sorted by popularity (comments + reactions).

Issues:
{issues_text}"#,
        repo = repo,
        audience = audience,
        language = language,
        issues_text = issues_text
    )
}

pub fn headline_system_prompt(language: &str) -> String {
    format!(
        "You translate English technology news headlines into natural {language} and pick articles that developers reading in {language} would find interesting. {plain}",
        language = language,
        plain = PLAIN_TEXT_ONLY
    )
}

/// Translate the top headlines and recommend a handful of the rest.
pub fn headline_prompt(top: &[&str], rest: &[&str], recommend: usize, language: &str) -> String {
    let mut prompt = format!(
        "Below are article titles from the Hacker News front page.\n\n\
         1. Translate the top {top_count} headlines into natural {language}.\n\
         2. From the remaining articles, pick {recommend} that would be technically interesting to {language}-speaking readers. \
         For each pick, give the translated title and a short reason.\n\n\
         [Top {top_count} headlines]:\n",
        top_count = top.len(),
        language = language,
        recommend = recommend
    );
    for title in top {
        prompt.push_str(&format!("- {}\n", title));
    }
    prompt.push_str("\n[Remaining articles]:\n");
    for title in rest {
        prompt.push_str(&format!("- {}\n", title));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_prompt_lists_both_groups() {
        let prompt = headline_prompt(&["A", "B"], &["C"], 5, "Korean");
        assert!(prompt.contains("Translate the top 2 headlines into natural Korean"));
        assert!(prompt.contains("pick 5 that would"));
        let top_pos = prompt.find("- A\n- B\n").unwrap();
        let rest_pos = prompt.find("[Remaining articles]:\n- C\n").unwrap();
        assert!(top_pos < rest_pos);
    }

    #[test]
    fn test_digest_prompts_embed_issue_text() {
        let detailed = detailed_digest_prompt("ClickHouse", "a DevOps team", 10, "Korean", "#1 - crash");
        assert!(detailed.contains("top 10 most popular ClickHouse GitHub issues"));
        assert!(detailed.ends_with("Issues:\n#1 - crash"));

        let brief = brief_digest_prompt("ClickHouse", "a DevOps team", "English", "#2 - slow");
        assert!(brief.contains("Respond in English"));
        assert!(brief.ends_with("#2 - slow"));
    }
}
