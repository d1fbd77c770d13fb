pub mod auth;
pub mod response;

pub use auth::{session_middleware, session_cookie, AdminUser, AuthUser};
pub use response::{ApiResponse, ApiResult};
