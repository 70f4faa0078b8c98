use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder};

use super::error::FilterError;
use crate::database::models::ApplicationState;

/// Moderator listing filter: optional status plus an inclusive range over the submission date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationFilter {
    status: Option<ApplicationState>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl ApplicationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty input means "any status".
    pub fn status(&mut self, status: Option<&str>) -> Result<&mut Self, FilterError> {
        self.status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(raw.parse().map_err(|_| FilterError::InvalidStatus(raw.to_string()))?),
            None => None,
        };
        Ok(self)
    }

    pub fn range(&mut self, from: Option<&str>, to: Option<&str>) -> Result<&mut Self, FilterError> {
        let from = from.map(|s| parse_query_date(s, "From")).transpose()?.flatten();
        let to = to.map(|s| parse_query_date(s, "To")).transpose()?.flatten();

        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(FilterError::InvertedRange {
                    from: f.to_string(),
                    to: t.to_string(),
                });
            }
        }

        self.from = from;
        self.to = to;
        Ok(self)
    }

    /// Appends the WHERE clause. Drafts and deleted applications are never listed.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE state <> ")
            .push_bind(ApplicationState::Draft.as_str())
            .push(" AND state <> ")
            .push_bind(ApplicationState::Deleted.as_str());

        if let Some(status) = self.status {
            qb.push(" AND state = ").push_bind(status.as_str());
        }
        if let Some(from) = self.from {
            qb.push(" AND date_send >= ").push_bind(from);
        }
        if let Some(to) = self.to {
            qb.push(" AND date_send <= ").push_bind(to);
        }
    }
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part (`2024-01-31T00:00:00Z`),
/// which is ignored. Empty input yields `None`.
pub fn parse_query_date(raw: &str, field: &'static str) -> Result<Option<NaiveDate>, FilterError> {
    let date_part = raw.split('T').next().unwrap_or_default().trim();
    if date_part.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| FilterError::InvalidDate {
            field,
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_timestamped_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31);
        assert_eq!(parse_query_date("2024-01-31", "From").unwrap(), expected);
        assert_eq!(parse_query_date("2024-01-31T12:30:00Z", "From").unwrap(), expected);
        assert_eq!(parse_query_date("", "From").unwrap(), None);
        assert_eq!(parse_query_date("T10:00", "From").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = parse_query_date("31.01.2024", "To").unwrap_err();
        assert!(matches!(err, FilterError::InvalidDate { field: "To", .. }));
        assert!(err.to_string().starts_with("error parsing dateTo"));
    }

    #[test]
    fn status_is_optional_but_must_be_known() {
        let mut filter = ApplicationFilter::new();
        filter.status(Some("")).unwrap();
        assert_eq!(filter, ApplicationFilter::default());

        filter.status(Some("Approved")).unwrap();
        assert_eq!(filter.status, Some(ApplicationState::Approved));

        assert_eq!(
            filter.status(Some("Lost")).unwrap_err(),
            FilterError::InvalidStatus("Lost".into())
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut filter = ApplicationFilter::new();
        assert!(filter.range(Some("2024-02-01"), Some("2024-01-01")).is_err());
        assert!(filter.range(Some("2024-01-01"), Some("2024-01-01")).is_ok());
    }

    #[test]
    fn builds_bound_where_clause() {
        let mut filter = ApplicationFilter::new();
        filter.status(Some("Submitted")).unwrap();
        filter.range(Some("2024-01-01"), None).unwrap();

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM ruler_applications");
        filter.push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM ruler_applications WHERE state <> $1 AND state <> $2 AND state = $3 AND date_send >= $4"
        );
    }
}
