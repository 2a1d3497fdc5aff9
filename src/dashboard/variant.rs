//! Deterministic schedule-variant cycling
//!
//! Each distinct date selection bumps a counter; the visible schedule is
//! the counter modulo the number of registered variants. No randomness,
//! no hidden state: the same counter always shows the same schedule.

use chrono::NaiveDate;

/// Advance the selection counter and derive the variant index.
///
/// Pure and total: `variant_count` of zero is treated as one so the
/// index stays in range. Callers must reject no-op selections (same
/// value re-selected) before invoking this; every call counts.
pub fn next_variant(counter: u64, variant_count: usize) -> (u64, usize) {
    let count = variant_count.max(1) as u64;
    let next = counter + 1;
    (next, (next % count) as usize)
}

/// Tracks the dashboard's active date and selection counter.
///
/// `select` is the caller-side gate: re-selecting the date already
/// active is a no-op and does not advance the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCycle {
    active: NaiveDate,
    counter: u64,
    variant_count: usize,
}

impl DateCycle {
    /// Start a cycle at `initial` with the counter at zero
    pub fn new(initial: NaiveDate, variant_count: usize) -> Self {
        Self {
            active: initial,
            counter: 0,
            variant_count,
        }
    }

    /// The date currently shown
    pub fn active_date(&self) -> NaiveDate {
        self.active
    }

    /// Selections made so far
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Variant index for the current counter
    pub fn variant(&self) -> usize {
        (self.counter % self.variant_count.max(1) as u64) as usize
    }

    /// Change the active date.
    ///
    /// Returns the new variant index, or `None` when `date` is already
    /// active (the counter is untouched).
    pub fn select(&mut self, date: NaiveDate) -> Option<usize> {
        if date == self.active {
            return None;
        }
        self.active = date;
        let (next, index) = next_variant(self.counter, self.variant_count);
        self.counter = next;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_three_cycle() {
        assert_eq!(next_variant(0, 3), (1, 1));
        assert_eq!(next_variant(1, 3), (2, 2));
        assert_eq!(next_variant(2, 3), (3, 0));
    }

    #[test]
    fn test_same_counter_same_variant() {
        assert_eq!(next_variant(7, 3), next_variant(7, 3));
    }

    #[test]
    fn test_zero_variant_count_stays_in_range() {
        assert_eq!(next_variant(5, 0), (6, 0));
    }

    #[test]
    fn test_select_new_date_advances() {
        let mut cycle = DateCycle::new(date("2025-09-22"), 3);
        assert_eq!(cycle.variant(), 0);

        assert_eq!(cycle.select(date("2025-09-23")), Some(1));
        assert_eq!(cycle.select(date("2025-09-24")), Some(2));
        assert_eq!(cycle.select(date("2025-09-25")), Some(0));
        assert_eq!(cycle.counter(), 3);
    }

    #[test]
    fn test_reselecting_active_date_is_a_noop() {
        let mut cycle = DateCycle::new(date("2025-09-22"), 3);
        cycle.select(date("2025-09-23"));

        assert_eq!(cycle.select(date("2025-09-23")), None);
        assert_eq!(cycle.counter(), 1);
        assert_eq!(cycle.variant(), 1);
    }

    #[test]
    fn test_going_back_to_an_earlier_date_still_advances() {
        let mut cycle = DateCycle::new(date("2025-09-22"), 3);
        cycle.select(date("2025-09-23"));

        // Returning to a previously shown date is a change, not a replay
        assert_eq!(cycle.select(date("2025-09-22")), Some(2));
    }
}
