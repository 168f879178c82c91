use crate::plan::{Weekday, CANONICAL_WEEK};

/// Enumerates the calendar days to adjust after an event on `anchor`.
///
/// Day `k` (1-based) is `CANONICAL_WEEK[(anchor_index + k) % 7]`, so targets
/// are visited in fixed cyclic order and wrap past sunday. A `count` above 7
/// revisits days; the last substitution for a day wins.
///
/// An unrecognized anchor resolves to index 0 (monday) instead of failing.
/// Historical clients rely on this permissive behavior; it masks invalid
/// input by intent, not by accident.
#[must_use]
pub fn resolve(anchor: &str, count: u32) -> Vec<Weekday> {
    let anchor_index = Weekday::from_name(anchor).map_or(0, Weekday::index);
    (1..=count as usize)
        .map(|offset| CANONICAL_WEEK[(anchor_index + offset) % CANONICAL_WEEK.len()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Weekday::{Friday, Monday, Saturday, Sunday, Thursday, Tuesday, Wednesday};

    #[test]
    fn resolves_following_days() {
        assert_eq!(resolve("wednesday", 3), vec![Thursday, Friday, Saturday]);
    }

    #[test]
    fn wraps_past_the_weekend() {
        assert_eq!(resolve("saturday", 3), vec![Sunday, Monday, Tuesday]);
    }

    #[test]
    fn unknown_anchor_behaves_like_monday() {
        assert_eq!(resolve("unknown_day", 2), vec![Tuesday, Wednesday]);
        assert_eq!(resolve("", 2), resolve("monday", 2));
    }

    #[test]
    fn counts_above_seven_revisit_days() {
        let days = resolve("monday", 9);
        assert_eq!(days.len(), 9);
        assert_eq!(days[0], Tuesday);
        assert_eq!(days[6], Monday);
        assert_eq!(days[7], Tuesday);
    }

    #[test]
    fn zero_count_resolves_to_nothing() {
        assert!(resolve("monday", 0).is_empty());
    }
}
