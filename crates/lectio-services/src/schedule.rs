//! Billing cycle expansion
//!
//! Pure calendar arithmetic: given a start instant, a cycle length, and a
//! cycle count, produce the chained sequence of half-open `[start, end)`
//! periods. Month-based cycles use calendar months (a cycle starting
//! 2024-01-31 ends 2024-02-29), never fixed 30-day blocks.

use chrono::{DateTime, Duration, Months, Utc};
use lectio_core::{models::DurationUnit, AppError, AppResult};
use serde::Serialize;

/// One billing period, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingCycle {
    /// Period start (inclusive)
    pub start: DateTime<Utc>,
    /// Period end (exclusive)
    pub end: DateTime<Utc>,
}

/// Compute the end of a single cycle beginning at `start`
pub fn cycle_end(
    start: DateTime<Utc>,
    duration: i32,
    unit: DurationUnit,
) -> AppResult<DateTime<Utc>> {
    if duration <= 0 {
        return Err(AppError::InvalidInput(format!(
            "Cycle duration must be positive, got {}",
            duration
        )));
    }

    let end = match unit {
        DurationUnit::Days => start.checked_add_signed(Duration::days(duration as i64)),
        DurationUnit::Weeks => start.checked_add_signed(Duration::days(duration as i64 * 7)),
        DurationUnit::Months => start.checked_add_months(Months::new(duration as u32)),
    };

    end.ok_or_else(|| AppError::InvalidInput("Cycle end date out of range".to_string()))
}

/// Expand a booking into its chained billing cycles
///
/// Cycle `i` starts exactly where cycle `i-1` ends, so the cycles of one
/// booking never overlap and never leave a gap.
pub fn expand_cycles(
    start: DateTime<Utc>,
    duration: i32,
    unit: DurationUnit,
    cycle_count: i32,
) -> AppResult<Vec<BillingCycle>> {
    if cycle_count <= 0 {
        return Err(AppError::InvalidInput(format!(
            "Cycle count must be at least 1, got {}",
            cycle_count
        )));
    }

    let mut cycles = Vec::with_capacity(cycle_count as usize);
    let mut cursor = start;

    for _ in 0..cycle_count {
        let end = cycle_end(cursor, duration, unit)?;
        cycles.push(BillingCycle { start: cursor, end });
        cursor = end;
    }

    Ok(cycles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_month_end_clamps_in_leap_year() {
        let cycles = expand_cycles(date(2024, 1, 31), 1, DurationUnit::Months, 1).unwrap();

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].start, date(2024, 1, 31));
        assert_eq!(cycles[0].end, date(2024, 2, 29));
    }

    #[test]
    fn test_month_end_clamps_in_common_year() {
        let cycles = expand_cycles(date(2023, 1, 31), 1, DurationUnit::Months, 1).unwrap();
        assert_eq!(cycles[0].end, date(2023, 2, 28));
    }

    #[test]
    fn test_weekly_cycles_are_contiguous() {
        let cycles = expand_cycles(date(2024, 3, 1), 7, DurationUnit::Days, 3).unwrap();

        assert_eq!(cycles.len(), 3);
        assert_eq!(cycles[0].start, date(2024, 3, 1));
        assert_eq!(cycles[0].end, date(2024, 3, 8));
        assert_eq!(cycles[1].start, date(2024, 3, 8));
        assert_eq!(cycles[1].end, date(2024, 3, 15));
        assert_eq!(cycles[2].start, date(2024, 3, 15));
        assert_eq!(cycles[2].end, date(2024, 3, 22));
    }

    #[test]
    fn test_weeks_unit() {
        let cycles = expand_cycles(date(2024, 3, 1), 2, DurationUnit::Weeks, 1).unwrap();
        assert_eq!(cycles[0].end, date(2024, 3, 15));
    }

    #[test]
    fn test_multi_month_chaining() {
        let cycles = expand_cycles(date(2024, 4, 1), 1, DurationUnit::Months, 2).unwrap();

        assert_eq!(cycles[0].start, date(2024, 4, 1));
        assert_eq!(cycles[0].end, date(2024, 5, 1));
        assert_eq!(cycles[1].start, date(2024, 5, 1));
        assert_eq!(cycles[1].end, date(2024, 6, 1));
    }

    #[test]
    fn test_zero_cycle_count_rejected() {
        let result = expand_cycles(date(2024, 3, 1), 1, DurationUnit::Months, 0);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_negative_cycle_count_rejected() {
        let result = expand_cycles(date(2024, 3, 1), 1, DurationUnit::Months, -2);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = expand_cycles(date(2024, 3, 1), 0, DurationUnit::Days, 1);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    proptest! {
        #[test]
        fn prop_cycles_chain_without_gaps(
            day_offset in 0i64..20_000,
            duration in 1i32..24,
            unit_idx in 0usize..3,
            count in 1i32..12,
        ) {
            let unit = [DurationUnit::Days, DurationUnit::Weeks, DurationUnit::Months][unit_idx];
            let start = date(2000, 1, 1) + Duration::days(day_offset);

            let cycles = expand_cycles(start, duration, unit, count).unwrap();

            prop_assert_eq!(cycles.len(), count as usize);
            prop_assert_eq!(cycles[0].start, start);

            for cycle in &cycles {
                prop_assert!(cycle.start < cycle.end);
            }
            for pair in cycles.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
        }
    }
}
