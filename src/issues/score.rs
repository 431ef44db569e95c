use super::types::DiscussionItem;

/// An issue paired with its popularity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredItem<'a> {
    pub item: &'a DiscussionItem,
    pub score: u64,
}

/// Popularity: comment count plus total reactions.
pub fn score(item: &DiscussionItem) -> u64 {
    item.comments.saturating_add(item.reactions.total())
}

/// Orders items by descending score. Equal scores keep their input order.
pub fn rank(items: &[DiscussionItem]) -> Vec<ScoredItem<'_>> {
    let mut ranked: Vec<ScoredItem<'_>> = items
        .iter()
        .map(|item| ScoredItem {
            item,
            score: score(item),
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// The `n` most popular items, or all of them when there are fewer.
pub fn top_n(items: &[DiscussionItem], n: usize) -> Vec<ScoredItem<'_>> {
    let mut ranked = rank(items);
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::types::{IssueState, ReactionSummary};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn item(number: u64, comments: u64, reactions: ReactionSummary) -> DiscussionItem {
        DiscussionItem {
            number,
            title: format!("Issue {}", number),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            state: IssueState::Open,
            comments,
            reactions,
            labels: Vec::new(),
            html_url: format!("https://github.com/o/r/issues/{}", number),
            body: None,
        }
    }

    fn raw(pairs: &[(&str, serde_json::Value)]) -> ReactionSummary {
        ReactionSummary::Raw(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_score_ignores_non_integer_reactions() {
        let issue = item(1, 3, raw(&[("+1", json!(2)), ("note", json!("x"))]));
        assert_eq!(score(&issue), 5);
    }

    #[test]
    fn test_score_defaults_to_comments() {
        assert_eq!(score(&item(1, 4, ReactionSummary::default())), 4);
        assert_eq!(score(&item(1, 0, ReactionSummary::default())), 0);
        assert_eq!(score(&item(1, 2, ReactionSummary::Precomputed(9))), 11);
    }

    #[test]
    fn test_rank_is_descending_and_stable() {
        let items = vec![
            item(1, 1, ReactionSummary::default()),
            item(2, 5, ReactionSummary::default()),
            item(3, 0, ReactionSummary::Precomputed(1)),
            item(4, 2, raw(&[("rocket", json!(3))])),
            item(5, 1, ReactionSummary::default()),
        ];
        let ranked: Vec<(u64, u64)> = rank(&items)
            .iter()
            .map(|s| (s.item.number, s.score))
            .collect();
        assert_eq!(ranked, vec![(2, 5), (4, 5), (1, 1), (3, 1), (5, 1)]);
    }

    #[test]
    fn test_top_n_with_fewer_items() {
        let items = vec![
            item(10, 1, ReactionSummary::default()),
            item(11, 3, ReactionSummary::default()),
            item(12, 2, ReactionSummary::default()),
        ];
        let top: Vec<u64> = top_n(&items, 10).iter().map(|s| s.item.number).collect();
        assert_eq!(top, vec![11, 12, 10]);

        let top: Vec<u64> = top_n(&items, 1).iter().map(|s| s.item.number).collect();
        assert_eq!(top, vec![11]);
        assert!(top_n(&items, 0).is_empty());
    }
}
