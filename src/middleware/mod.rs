pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{removal_cookie, session_cookie, CurrentUser, Moderator, OptionalSession, ServiceKey, Session};
pub use extract::{JsonBody, QueryParams};
pub use response::{ApiResponse, ApiResult};
