use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    /// 1 = January.
    pub month: u32,
}

impl CalendarMonth {
    /// Out-of-range months are clamped into 1..=12.
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month: month.clamp(1, 12),
        }
    }

    pub fn current_utc() -> Self {
        let today = Utc::now().date_naive();
        Self::new(today.year(), today.month())
    }

    pub fn add_months(self, months: u32) -> Self {
        let zero_based = i64::from(self.year) * 12 + i64::from(self.month - 1) + i64::from(months);
        let year = zero_based.div_euclid(12);
        let month = zero_based.rem_euclid(12) as u32 + 1;
        Self {
            year: i32::try_from(year).unwrap_or(i32::MAX),
            month,
        }
    }

    pub fn previous(self) -> Self {
        match self.month {
            1 => Self {
                year: self.year - 1,
                month: 12,
            },
            m => Self {
                year: self.year,
                month: m - 1,
            },
        }
    }

    /// Short English label such as `Jan 2026`.
    pub fn label(self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(date) => date.format("%b %Y").to_string(),
            None => format!("{:02}/{}", self.month, self.year),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_months_rolls_over_year_boundaries() {
        let start = CalendarMonth::new(2025, 11);
        assert_eq!(start.add_months(0), CalendarMonth::new(2025, 11));
        assert_eq!(start.add_months(2), CalendarMonth::new(2026, 1));
        assert_eq!(start.add_months(14), CalendarMonth::new(2027, 1));
        assert_eq!(start.add_months(1199), CalendarMonth::new(2125, 10));
    }

    #[test]
    fn previous_steps_back_across_january() {
        assert_eq!(CalendarMonth::new(2026, 1).previous(), CalendarMonth::new(2025, 12));
        assert_eq!(CalendarMonth::new(2026, 7).previous(), CalendarMonth::new(2026, 6));
    }

    #[test]
    fn new_clamps_month_into_calendar_range() {
        assert_eq!(CalendarMonth::new(2024, 0).month, 1);
        assert_eq!(CalendarMonth::new(2024, 13).month, 12);
    }

    #[test]
    fn label_uses_short_month_and_year() {
        assert_eq!(CalendarMonth::new(2026, 1).label(), "Jan 2026");
        assert_eq!(CalendarMonth::new(2030, 12).label(), "Dec 2030");
    }
}
