use super::Headline;

/// Renders the message: header, top headlines, then the model's picks.
pub fn format_headline_message(top: &[Headline], recommendations: &str) -> String {
    let mut lines = vec!["🧠 Hacker News headline digest".to_string(), String::new()];
    lines.push(format!("🔥 Top {} headlines", top.len()));
    for headline in top {
        lines.push(format!("• {}", headline.title));
    }
    lines.push(String::new());
    lines.push("✨ Recommended articles (picked by LLM)".to_string());
    lines.push(recommendations.trim().to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_layout() {
        let top = vec![
            Headline {
                title: "Story 1".to_string(),
                link: None,
            },
            Headline {
                title: "Story 2".to_string(),
                link: Some("https://example.com/2".to_string()),
            },
        ];
        let message = format_headline_message(&top, "\n1. Pick one\n");
        assert_eq!(
            message,
            "🧠 Hacker News headline digest\n\n🔥 Top 2 headlines\n• Story 1\n• Story 2\n\n✨ Recommended articles (picked by LLM)\n1. Pick one"
        );
    }

    #[test]
    fn test_empty_recommendations() {
        let message = format_headline_message(&[], "   ");
        assert!(message.contains("🔥 Top 0 headlines\n\n✨"));
        assert!(message.ends_with("(picked by LLM)\n"));
    }
}
