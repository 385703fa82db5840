use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use crate::store::{parse_date, VocabEntry, MAX_LEVEL};

/// Day count used when a stored date cannot be read. Large enough that the
/// entry is always due.
pub const FALLBACK_DAYS: i64 = 9999;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaysSince {
    Elapsed(i64),
    Fallback(DateFallback),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFallback {
    pub raw: String,
    pub reason: String,
}

impl DaysSince {
    pub fn days(&self) -> i64 {
        match self {
            Self::Elapsed(days) => *days,
            Self::Fallback(_) => FALLBACK_DAYS,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Whole calendar days from `raw` to `today`; negative for future dates.
pub fn days_since(raw: &str, today: NaiveDate) -> DaysSince {
    match parse_date(raw) {
        Ok(date) => DaysSince::Elapsed((today - date).num_days()),
        Err(err) => DaysSince::Fallback(DateFallback {
            raw: raw.to_string(),
            reason: err.to_string(),
        }),
    }
}

pub fn required_gap(level: i32) -> i64 {
    let level = i64::from(level);
    level * level
}

pub fn is_due(entry: &VocabEntry, today: NaiveDate) -> bool {
    if entry.level > MAX_LEVEL {
        return false;
    }

    let since = days_since(&entry.last_reviewed, today);
    if let DaysSince::Fallback(fallback) = &since {
        debug!(
            word = %entry.word,
            raw = %fallback.raw,
            reason = %fallback.reason,
            "unreadable review date, treating as overdue"
        );
    }

    since.days() >= required_gap(entry.level)
}

/// Indices of every entry due on `today`, in store order.
pub fn due_indices(entries: &[VocabEntry], today: NaiveDate) -> Vec<usize> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| is_due(entry, today))
        .map(|(index, _)| index)
        .collect()
}

/// Uniform random draw among the due entries; `None` when nothing is due.
pub fn pick_due<R: Rng + ?Sized>(
    entries: &[VocabEntry],
    today: NaiveDate,
    rng: &mut R,
) -> Option<usize> {
    due_indices(entries, today).choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::format_date;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn entry(word: &str, level: i32, days_ago: i64) -> VocabEntry {
        VocabEntry {
            word: word.to_string(),
            level,
            last_reviewed: format_date(today() - chrono::Duration::days(days_ago)),
        }
    }

    #[test]
    fn test_level_two_after_ten_days_is_due() {
        assert!(is_due(&entry("Haus", 2, 10), today()));
    }

    #[test]
    fn test_level_three_after_five_days_is_not_due() {
        assert!(!is_due(&entry("Haus", 3, 5), today()));
    }

    #[test]
    fn test_fresh_word_is_due_same_day() {
        let fresh = VocabEntry::new("Haus", today());
        assert!(is_due(&fresh, today()));
    }

    #[test]
    fn test_gap_boundary_is_inclusive() {
        assert!(is_due(&entry("Baum", 3, 9), today()));
        assert!(!is_due(&entry("Baum", 3, 8), today()));
    }

    #[test]
    fn test_level_above_ceiling_never_due() {
        let mut stale = entry("Haus", 6, 10_000);
        assert!(!is_due(&stale, today()));
        stale.last_reviewed = "kaputt".to_string();
        assert!(!is_due(&stale, today()));
    }

    #[test]
    fn test_unreadable_date_falls_back() {
        let since = days_since("31.02.2024", today());
        assert!(since.is_fallback());
        assert_eq!(since.days(), FALLBACK_DAYS);

        let broken = VocabEntry {
            word: "Haus".to_string(),
            level: 5,
            last_reviewed: "2024-03-01 00:00:00".to_string(),
        };
        assert!(is_due(&broken, today()));
    }

    #[test]
    fn test_future_date_gives_negative_days() {
        assert_eq!(days_since("16.03.2024", today()), DaysSince::Elapsed(-1));
        assert!(!is_due(&entry("Haus", 0, -1), today()));
    }

    #[test]
    fn test_pick_due_only_returns_due_entries() {
        let entries = vec![
            entry("Haus", 3, 1),
            entry("Baum", 0, 0),
            entry("Katze", 1, 2),
            entry("Hund", 5, 3),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let index = pick_due(&entries, today(), &mut rng).unwrap();
            assert!(index == 1 || index == 2);
        }
    }

    #[test]
    fn test_pick_due_reaches_every_candidate() {
        let entries: Vec<_> = (0..4).map(|i| entry(&format!("w{i}"), 0, 0)).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [false; 4];
        for _ in 0..400 {
            seen[pick_due(&entries, today(), &mut rng).unwrap()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_pick_due_empty_when_nothing_due() {
        let entries = vec![entry("Haus", 4, 3)];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_due(&entries, today(), &mut rng), None);
        assert_eq!(pick_due(&[], today(), &mut rng), None);
    }
}
