//! Same-page duplicate removal.

use std::collections::HashSet;

use crate::models::{ContentHash, ListingRecord};

/// Iterator adapter dropping records whose content hash was already yielded.
pub struct Dedup<I> {
    inner: I,
    seen: HashSet<ContentHash>,
}

impl<I> Iterator for Dedup<I>
where
    I: Iterator<Item = ListingRecord>,
{
    type Item = ListingRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = self.inner.next()?;
            if self.seen.insert(record.content_hash()) {
                return Some(record);
            }
        }
    }
}

/// Keep the first occurrence of every record, in the original order.
pub fn dedupe<I>(records: I) -> Dedup<I::IntoIter>
where
    I: IntoIterator<Item = ListingRecord>,
{
    Dedup {
        inner: records.into_iter(),
        seen: HashSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(title: &str) -> ListingRecord {
        ListingRecord {
            id: None,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            organization: "Acme".to_string(),
            title: title.to_string(),
            detail_url: format!("https://portal.test/{}", title),
        }
    }

    #[test]
    fn test_dedupe_keeps_first_seen_order() {
        let input = vec![
            record("a"),
            record("b"),
            record("a"),
            record("c"),
            record("b"),
            record("a"),
        ];
        let titles: Vec<String> = dedupe(input).map(|r| r.title).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dedupe_without_duplicates_is_identity() {
        let input = vec![record("x"), record("y")];
        assert_eq!(dedupe(input.clone()).collect::<Vec<_>>(), input);
        assert_eq!(dedupe(Vec::new()).count(), 0);
    }

    #[test]
    fn test_records_differing_in_any_field_are_kept() {
        let mut other = record("a");
        other.id = Some("1".to_string());
        assert_eq!(dedupe(vec![record("a"), other]).count(), 2);
    }
}
