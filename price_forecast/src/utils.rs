//! Utility functions for the price_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};

/// `count` consecutive calendar dates beginning with `start`
pub fn calendar_dates_from(start: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
    (0..count as u64)
        .map(|offset| {
            start.checked_add_days(Days::new(offset)).ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "Date {start} + {offset} days is out of range"
                ))
            })
        })
        .collect()
}

/// Check a user-supplied horizon and convert it to a day count
pub fn validate_horizon(horizon_days: i64) -> Result<usize> {
    if horizon_days < 1 {
        return Err(ForecastError::InvalidHorizon(horizon_days));
    }
    usize::try_from(horizon_days).map_err(|_| ForecastError::InvalidHorizon(horizon_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_date;

    #[test]
    fn consecutive_dates_cross_month_end() {
        let dates = calendar_dates_from(parse_date("2024-02-28").unwrap(), 3).unwrap();
        assert_eq!(
            dates,
            vec![
                parse_date("2024-02-28").unwrap(),
                parse_date("2024-02-29").unwrap(),
                parse_date("2024-03-01").unwrap(),
            ]
        );
        assert!(calendar_dates_from(parse_date("2024-02-28").unwrap(), 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn horizon_must_be_positive() {
        assert_eq!(validate_horizon(1).unwrap(), 1);
        assert!(matches!(validate_horizon(0), Err(ForecastError::InvalidHorizon(0))));
        assert!(matches!(validate_horizon(-4), Err(ForecastError::InvalidHorizon(-4))));
    }
}
