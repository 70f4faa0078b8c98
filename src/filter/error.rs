use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("error parsing date{field}: {message}")]
    InvalidDate { field: &'static str, message: String },

    #[error("unknown application status '{0}'")]
    InvalidStatus(String),

    #[error("date range is inverted: From {from} is after To {to}")]
    InvertedRange { from: String, to: String },
}
