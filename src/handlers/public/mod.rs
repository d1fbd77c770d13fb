pub mod auth;
pub mod curriculum;
pub mod system;
