pub mod admin;
pub mod status;
pub mod store;
