pub mod application;
pub mod error;
pub mod kingdom;

pub use application::{parse_query_date, ApplicationFilter};
pub use error::FilterError;
pub use kingdom::name_search_pattern;
