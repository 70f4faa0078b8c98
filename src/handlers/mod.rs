// Handlers grouped by who may call them:
// public (no session), protected (session), elevated (moderator),
// service (external checker holding the shared key).
pub mod elevated;
pub mod protected;
pub mod public;
pub mod service;

use chrono::NaiveDate;

use crate::error::ApiError;
use crate::filter::{parse_query_date, FilterError};

/// Date field that must be present in a request body.
pub(crate) fn required_date(raw: &str, field: &'static str) -> Result<NaiveDate, ApiError> {
    parse_query_date(raw, field)?.ok_or_else(|| {
        FilterError::InvalidDate {
            field,
            message: "date is empty".to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_date_rejects_empty_input() {
        assert_eq!(
            required_date("2024-03-01T00:00:00Z", "From").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        let err = required_date("", "To").unwrap_err();
        assert_eq!(err.message(), "error parsing dateTo: date is empty");
    }
}
