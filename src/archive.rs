//! Timestamped Markdown copies of generated reports.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ArchiveDocument<'a> {
    pub title: &'a str,
    pub generated_at: NaiveDateTime,
    pub item_label: &'a str,
    pub item_count: usize,
    pub body: &'a str,
}

pub fn render(doc: &ArchiveDocument<'_>) -> String {
    format!(
        "# {title}\n\n\
         **Generated**: {generated}\n\
         **{label}**: {count}\n\n\
         ## Summary\n\n\
         {body}\n\n\
         ---\n\
         *This summary was generated automatically.*\n",
        title = doc.title,
        generated = doc.generated_at.format("%Y-%m-%d %H:%M"),
        label = doc.item_label,
        count = doc.item_count,
        body = doc.body
    )
}

/// Writes `doc` to `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.md` and returns the path.
pub fn save(dir: &Path, prefix: &str, doc: &ArchiveDocument<'_>) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let filename = format!("{}_{}.md", prefix, doc.generated_at.format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);
    fs::write(&path, render(doc)).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Saved report to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn doc(body: &str) -> ArchiveDocument<'_> {
        ArchiveDocument {
            title: "ClickHouse weekly issue digest",
            generated_at: NaiveDate::from_ymd_opt(2025, 3, 7)
                .unwrap()
                .and_hms_opt(9, 5, 30)
                .unwrap(),
            item_label: "Issues",
            item_count: 42,
            body,
        }
    }

    #[test]
    fn test_render_layout() {
        let text = render(&doc("All quiet."));
        assert_eq!(
            text,
            "# ClickHouse weekly issue digest\n\n**Generated**: 2025-03-07 09:05\n**Issues**: 42\n\n## Summary\n\nAll quiet.\n\n---\n*This summary was generated automatically.*\n"
        );
    }

    #[test]
    fn test_save_uses_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out");
        let path = save(&nested, "clickhouse_weekly_summary", &doc("body")).unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "clickhouse_weekly_summary_20250307_090530.md"
        );
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("## Summary\n\nbody\n"));
    }
}
