//! Calendar range picker: turns day clicks into a check-in/check-out pair.
//!
//! One range at a time: a click after both bounds are set starts a new range.
//! A click before the current check-in (with no check-out yet) moves the
//! check-in instead of producing an inverted range.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::error::DialogError;

const MONTH_NAMES: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// A calendar month, `month` in 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// `delta` months away, or `None` when that leaves the date range.
    pub fn shifted(self, delta: i32) -> Option<Self> {
        let index = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(delta);
        let shifted = Self {
            year: i32::try_from(index.div_euclid(12)).ok()?,
            month: index.rem_euclid(12) as u32 + 1,
        };
        shifted.day(1).map(|_| shifted)
    }

    pub fn days(self) -> u32 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(self.year) => 29,
            2 => 28,
            _ => 31,
        }
    }

    pub fn day(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// How a day cell relates to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayMark {
    CheckIn,
    CheckOut,
    InRange,
    Plain,
}

/// Whole nights between two dates, regardless of argument order.
///
/// Dates carry no time of day, so the difference is already a whole number
/// of days and no rounding is needed.
pub fn compute_nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days().abs()
}

/// A completed range, produced by [`CalendarRangePicker::confirm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfirmedRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
}

impl ConfirmedRange {
    /// `10/03/2026 até 13/03/2026 (3 noites)`
    pub fn describe(&self) -> String {
        let unit = if self.nights == 1 { "noite" } else { "noites" };
        format!(
            "{} até {} ({} {})",
            self.check_in.format("%d/%m/%Y"),
            self.check_out.format("%d/%m/%Y"),
            self.nights,
            unit
        )
    }
}

/// Selection state of the date-range calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarRangePicker {
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    visible: YearMonth,
}

impl CalendarRangePicker {
    /// Start with an empty selection showing the month of `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            check_in: None,
            check_out: None,
            visible: YearMonth::of(today),
        }
    }

    pub fn check_in(&self) -> Option<NaiveDate> {
        self.check_in
    }

    pub fn check_out(&self) -> Option<NaiveDate> {
        self.check_out
    }

    pub fn visible_month(&self) -> YearMonth {
        self.visible
    }

    pub fn days_in_month(&self) -> u32 {
        self.visible.days()
    }

    /// Empty cells before day 1 in a Sunday-first grid.
    pub fn leading_blanks(&self) -> u32 {
        self.visible
            .day(1)
            .map(|d| d.weekday().num_days_from_sunday())
            .unwrap_or(0)
    }

    /// e.g. `março 2026`
    pub fn month_label(&self) -> String {
        let name = MONTH_NAMES[(self.visible.month as usize - 1) % 12];
        format!("{name} {}", self.visible.year)
    }

    /// Apply a click on `day` of the visible month.
    pub fn click_day(&mut self, day: u32) -> Result<(), DialogError> {
        let date = self.visible.day(day).ok_or(DialogError::DayOutOfRange {
            day,
            days_in_month: self.days_in_month(),
        })?;

        match (self.check_in, self.check_out) {
            (Some(check_in), None) if date < check_in => self.check_in = Some(date),
            (Some(_), None) => self.check_out = Some(date),
            _ => {
                self.check_in = Some(date);
                self.check_out = None;
            }
        }
        debug!(check_in = ?self.check_in, check_out = ?self.check_out, "Calendar selection changed");
        Ok(())
    }

    /// Move the visible month; the selection is untouched.
    pub fn shift_month(&mut self, delta: i32) -> Result<(), DialogError> {
        self.visible = self
            .visible
            .shifted(delta)
            .ok_or(DialogError::MonthOutOfRange { delta })?;
        Ok(())
    }

    /// Night count, once both bounds are set.
    pub fn nights(&self) -> Option<i64> {
        Some(compute_nights(self.check_in?, self.check_out?))
    }

    pub fn is_complete(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_some()
    }

    pub fn mark(&self, day: u32) -> DayMark {
        let Some(date) = self.visible.day(day) else {
            return DayMark::Plain;
        };
        match (self.check_in, self.check_out) {
            (Some(ci), _) if ci == date => DayMark::CheckIn,
            (_, Some(co)) if co == date => DayMark::CheckOut,
            (Some(ci), Some(co)) if ci < date && date < co => DayMark::InRange,
            _ => DayMark::Plain,
        }
    }

    /// Finish the selection. Only succeeds with both bounds set.
    pub fn confirm(&self) -> Result<ConfirmedRange, DialogError> {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) => Ok(ConfirmedRange {
                check_in,
                check_out,
                nights: compute_nights(check_in, check_out),
            }),
            _ => Err(DialogError::RangeIncomplete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn picker() -> CalendarRangePicker {
        CalendarRangePicker::new(date(2026, 3, 5))
    }

    fn assert_valid(p: &CalendarRangePicker) {
        if p.check_out().is_some() {
            assert!(p.check_in().is_some(), "check-out set without check-in");
        }
        if let (Some(ci), Some(co)) = (p.check_in(), p.check_out()) {
            assert!(co >= ci, "inverted range {ci} > {co}");
        }
    }

    #[test]
    fn first_click_sets_check_in() {
        let mut p = picker();
        p.click_day(10).unwrap();
        assert_eq!(p.check_in(), Some(date(2026, 3, 10)));
        assert_eq!(p.check_out(), None);
        assert_eq!(p.nights(), None);
    }

    #[test]
    fn second_later_click_sets_check_out() {
        let mut p = picker();
        p.click_day(10).unwrap();
        p.click_day(13).unwrap();
        assert_eq!(p.check_out(), Some(date(2026, 3, 13)));
        assert_eq!(p.nights(), Some(3));
    }

    #[test]
    fn earlier_click_redefines_check_in() {
        let mut p = picker();
        p.click_day(10).unwrap();
        p.click_day(7).unwrap();
        assert_eq!(p.check_in(), Some(date(2026, 3, 7)));
        assert_eq!(p.check_out(), None);
    }

    #[test]
    fn click_after_complete_range_starts_over() {
        let mut p = picker();
        p.click_day(10).unwrap();
        p.click_day(13).unwrap();
        p.click_day(20).unwrap();
        assert_eq!(p.check_in(), Some(date(2026, 3, 20)));
        assert_eq!(p.check_out(), None);
    }

    #[test]
    fn same_day_twice_gives_zero_nights() {
        let mut p = picker();
        p.click_day(10).unwrap();
        p.click_day(10).unwrap();
        assert_eq!(p.nights(), Some(0));
    }

    #[test]
    fn out_of_range_day_is_refused_without_change() {
        let mut p = CalendarRangePicker::new(date(2026, 2, 1));
        p.click_day(5).unwrap();
        let before = p.clone();
        assert_eq!(
            p.click_day(29),
            Err(DialogError::DayOutOfRange {
                day: 29,
                days_in_month: 28
            })
        );
        assert_eq!(p.click_day(0).unwrap_err(), DialogError::DayOutOfRange {
            day: 0,
            days_in_month: 28
        });
        assert_eq!(p, before);
    }

    #[test]
    fn range_invariant_holds_for_click_sequences() {
        let sequences: [&[u32]; 6] = [
            &[10, 13],
            &[13, 10, 12],
            &[20, 5, 4, 30, 1],
            &[31, 1, 31, 15, 14, 16],
            &[2, 2, 2, 1],
            &[28, 27, 26, 25, 29, 3],
        ];
        for seq in sequences {
            let mut p = picker();
            for &day in seq {
                p.click_day(day).unwrap();
                assert_valid(&p);
            }
        }
    }

    #[test]
    fn range_across_months() {
        let mut p = picker();
        p.click_day(30).unwrap();
        p.shift_month(1).unwrap();
        assert_eq!(p.check_in(), Some(date(2026, 3, 30)), "shift keeps selection");
        p.click_day(2).unwrap();
        assert_eq!(p.check_out(), Some(date(2026, 4, 2)));
        assert_eq!(p.nights(), Some(3));
    }

    #[test]
    fn shift_month_wraps_years() {
        let mut p = CalendarRangePicker::new(date(2026, 1, 15));
        p.shift_month(-1).unwrap();
        assert_eq!(p.visible_month(), YearMonth { year: 2025, month: 12 });
        p.shift_month(1).unwrap();
        p.shift_month(1).unwrap();
        assert_eq!(p.visible_month(), YearMonth { year: 2026, month: 2 });
        p.shift_month(11).unwrap();
        assert_eq!(p.visible_month(), YearMonth { year: 2027, month: 1 });
    }

    #[test]
    fn shift_month_refuses_leaving_the_date_range() {
        let mut p = picker();
        p.click_day(10).unwrap();
        for delta in [i32::MAX, i32::MIN, 300_000 * 12] {
            assert_eq!(p.shift_month(delta), Err(DialogError::MonthOutOfRange { delta }));
            assert_eq!(p.visible_month(), YearMonth { year: 2026, month: 3 });
        }
        assert_eq!(p.check_in(), Some(date(2026, 3, 10)));
        assert_eq!(
            YearMonth { year: 2026, month: 3 }.shifted(-26 * 12),
            Some(YearMonth { year: 2000, month: 3 })
        );
    }

    #[test]
    fn compute_nights_is_symmetric() {
        let a = date(2026, 3, 10);
        let b = date(2026, 3, 13);
        assert_eq!(compute_nights(a, b), 3);
        assert_eq!(compute_nights(b, a), 3);
        assert_eq!(compute_nights(a, a), 0);
    }

    #[test]
    fn month_geometry() {
        // March 2026 starts on a Sunday.
        let p = picker();
        assert_eq!(p.days_in_month(), 31);
        assert_eq!(p.leading_blanks(), 0);
        assert_eq!(p.month_label(), "março 2026");

        let feb_leap = CalendarRangePicker::new(date(2028, 2, 10));
        assert_eq!(feb_leap.days_in_month(), 29);
        assert_eq!(YearMonth { year: 1900, month: 2 }.days(), 28);
        assert_eq!(YearMonth { year: 2000, month: 2 }.days(), 29);
    }

    #[test]
    fn day_marks() {
        let mut p = picker();
        p.click_day(10).unwrap();
        p.click_day(13).unwrap();
        assert_eq!(p.mark(10), DayMark::CheckIn);
        assert_eq!(p.mark(11), DayMark::InRange);
        assert_eq!(p.mark(12), DayMark::InRange);
        assert_eq!(p.mark(13), DayMark::CheckOut);
        assert_eq!(p.mark(14), DayMark::Plain);
        assert_eq!(p.mark(40), DayMark::Plain);
    }

    #[test]
    fn confirm_requires_both_bounds() {
        let mut p = picker();
        assert_eq!(p.confirm(), Err(DialogError::RangeIncomplete));
        p.click_day(10).unwrap();
        assert_eq!(p.confirm(), Err(DialogError::RangeIncomplete));
        p.click_day(13).unwrap();
        let range = p.confirm().unwrap();
        assert_eq!(range.nights, 3);
        assert_eq!(range.describe(), "10/03/2026 até 13/03/2026 (3 noites)");
    }

    #[test]
    fn describe_uses_singular_for_one_night() {
        let range = ConfirmedRange {
            check_in: date(2026, 3, 10),
            check_out: date(2026, 3, 11),
            nights: 1,
        };
        assert_eq!(range.describe(), "10/03/2026 até 11/03/2026 (1 noite)");
    }
}
