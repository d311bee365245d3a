use std::collections::BTreeSet;

use interpersona_core::config::SummaryLimits;
use interpersona_core::reference::content::SummaryText;
use interpersona_core::types::StyleCode;

/// How many summaries to show given `high` entries at or above the
/// threshold: `max(min(high, min_count), max_count)`.
pub fn display_count(high: usize, limits: &SummaryLimits) -> usize {
    high.min(limits.min_count).max(limits.max_count)
}

/// Summaries of the user's styles worth showing, in reading order.
///
/// Entries are ranked by value (highest first, then sequence), the top
/// [`display_count`] are kept, and the result is put back in sequence order.
pub fn summary_subset<'a>(
    summaries: &'a [SummaryText],
    user_codes: &BTreeSet<StyleCode>,
    limits: &SummaryLimits,
) -> Vec<&'a SummaryText> {
    let mut ranked: Vec<&SummaryText> = summaries
        .iter()
        .filter(|s| user_codes.contains(&s.code))
        .collect();
    ranked.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then(a.sequence.cmp(&b.sequence))
    });

    let high = ranked.iter().filter(|s| s.value >= limits.high_value).count();
    ranked.truncate(display_count(high, limits));
    ranked.sort_by_key(|s| s.sequence);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(code: i32, value: f64, sequence: u32) -> SummaryText {
        SummaryText {
            code: StyleCode::from_raw(code),
            value,
            sequence,
            content: format!("summary {code}"),
        }
    }

    fn codes(raw: &[i32]) -> BTreeSet<StyleCode> {
        raw.iter().copied().map(StyleCode::from_raw).collect()
    }

    #[test]
    fn one_high_entry_still_shows_three() {
        assert_eq!(display_count(1, &SummaryLimits::default()), 3);
    }

    #[test]
    fn count_is_capped_by_min_count() {
        let limits = SummaryLimits::default();
        assert_eq!(display_count(4, &limits), 4);
        assert_eq!(display_count(9, &limits), 5);
        assert_eq!(display_count(0, &limits), 3);
    }

    #[test]
    fn keeps_top_ranked_in_sequence_order() {
        let all = vec![
            summary(101, 5.0, 4),
            summary(201, 2.0, 1),
            summary(301, 3.0, 3),
            summary(401, 1.0, 2),
            summary(999, 9.0, 0),
        ];
        let picked = summary_subset(&all, &codes(&[101, 201, 301, 401]), &SummaryLimits::default());
        let seq: Vec<u32> = picked.iter().map(|s| s.sequence).collect();
        assert_eq!(seq, vec![1, 3, 4]);
    }

    #[test]
    fn equal_values_rank_by_sequence() {
        let all = vec![
            summary(101, 2.0, 9),
            summary(201, 2.0, 2),
            summary(301, 2.0, 5),
            summary(401, 2.0, 7),
        ];
        let picked = summary_subset(&all, &codes(&[101, 201, 301, 401]), &SummaryLimits::default());
        let seq: Vec<u32> = picked.iter().map(|s| s.sequence).collect();
        assert_eq!(seq, vec![2, 5, 7]);
    }

    #[test]
    fn fewer_entries_than_count() {
        let all = vec![summary(101, 1.0, 1)];
        assert_eq!(summary_subset(&all, &codes(&[101]), &SummaryLimits::default()).len(), 1);
    }
}
