use crate::error::{Result, SocietyError};
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// First month of every financial year (April).
pub const FY_START_MONTH: u32 = 4;

/// A financial year running April 1 to March 31, identified by the calendar
/// year in which it ends. `FinancialYear::new(2025)` is April 2024 to March 2025.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct FinancialYear {
    pub end_year: i32,
}

impl FinancialYear {
    pub fn new(end_year: i32) -> Self {
        Self { end_year }
    }

    /// The financial year that `date` falls in.
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= FY_START_MONTH {
            Self::new(date.year() + 1)
        } else {
            Self::new(date.year())
        }
    }

    pub fn start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.end_year.saturating_sub(1), FY_START_MONTH, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn end(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.end_year, 3, 31).unwrap_or(NaiveDate::MAX)
    }

    pub fn previous(&self) -> Self {
        Self::new(self.end_year.saturating_sub(1))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.end()
    }

    /// Short label such as `2024-25`.
    pub fn label(&self) -> String {
        format!(
            "{}-{:02}",
            i64::from(self.end_year) - 1,
            self.end_year.rem_euclid(100)
        )
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FY {}", self.label())
    }
}

/// Parses `YYYY-MM-DD`, also accepting `DD-MM-YYYY` and `DD/MM/YYYY` as they
/// appear in spreadsheet exports.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    for format in ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    Err(SocietyError::DateError(format!(
        "Invalid date: {}. Expected YYYY-MM-DD",
        value
    )))
}

/// Parses a financial year label: `2025`, `2024-25` or `2024-2025`.
pub fn parse_financial_year(label: &str) -> Result<FinancialYear> {
    let invalid = || {
        SocietyError::DateError(format!(
            "Invalid financial year: {}. Expected 'YYYY' or 'YYYY-YY'",
            label
        ))
    };

    let parts: Vec<&str> = label.trim().split('-').collect();
    match parts.as_slice() {
        [end] => end.parse::<i32>().map(FinancialYear::new).map_err(|_| invalid()),
        [start, end] => {
            let start: i32 = start.parse().map_err(|_| invalid())?;
            let next = start.checked_add(1).ok_or_else(invalid)?;
            let end_year = match end.len() {
                2 => {
                    let short: i32 = end.parse().map_err(|_| invalid())?;
                    (next / 100 * 100).checked_add(short).ok_or_else(invalid)?
                }
                _ => end.parse().map_err(|_| invalid())?,
            };
            if end_year != next {
                return Err(invalid());
            }
            Ok(FinancialYear::new(end_year))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bounds() {
        let fy = FinancialYear::new(2025);
        assert_eq!(fy.start(), date(2024, 4, 1));
        assert_eq!(fy.end(), date(2025, 3, 31));
        assert_eq!(fy.previous().end(), date(2024, 3, 31));
        assert_eq!(fy.label(), "2024-25");
    }

    #[test]
    fn test_containing() {
        assert_eq!(FinancialYear::containing(date(2024, 4, 1)).end_year, 2025);
        assert_eq!(FinancialYear::containing(date(2025, 3, 31)).end_year, 2025);
        assert_eq!(FinancialYear::containing(date(2024, 3, 31)).end_year, 2024);

        let fy = FinancialYear::new(2025);
        assert!(fy.contains(date(2024, 5, 1)));
        assert!(!fy.contains(date(2025, 4, 1)));
    }

    #[test]
    fn test_parse_financial_year() {
        assert_eq!(parse_financial_year("2025").unwrap().end_year, 2025);
        assert_eq!(parse_financial_year("2024-25").unwrap().end_year, 2025);
        assert_eq!(parse_financial_year("1999-00").unwrap().end_year, 2000);
        assert_eq!(parse_financial_year("2024-2025").unwrap().end_year, 2025);
        assert!(parse_financial_year("2024-27").is_err());
        assert!(parse_financial_year("FY25").is_err());
    }

    #[test]
    fn test_extreme_years_do_not_overflow() {
        assert!(parse_financial_year("2147483647-00").is_err());
        assert!(parse_financial_year("2147483646-99").is_err());
        assert!(parse_financial_year("2147483647-2147483648").is_err());

        let earliest = FinancialYear::new(i32::MIN);
        assert_eq!(earliest.previous(), earliest);
        assert_eq!(earliest.label(), "-2147483649-52");
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-05-08").unwrap(), date(2024, 5, 8));
        assert_eq!(parse_date("08-05-2024").unwrap(), date(2024, 5, 8));
        assert_eq!(parse_date(" 08/05/2024 ").unwrap(), date(2024, 5, 8));
        assert!(parse_date("May 8").is_err());
    }
}
