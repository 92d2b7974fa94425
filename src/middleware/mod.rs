pub mod auth;
pub mod cors;
pub mod json;
pub mod rate_limit;
