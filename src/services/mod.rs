pub mod application_service;
pub mod credential_service;
pub mod job_service;
pub mod notification_service;
pub mod otp_service;
pub mod session_service;
