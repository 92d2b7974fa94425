pub mod application;
pub mod job;
pub mod otp;
pub mod user;
