use chrono::{DateTime, Utc};

/// A live passcode for one email. Only the digest of the code is kept.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
}

impl OtpRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Result of an atomic check-and-consume against the OTP store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    /// The code matched; the record is gone.
    Verified,
    /// Wrong code; carries the failed-attempt count after this attempt.
    /// `revoked` is set when this attempt reached the cap and the record was
    /// deleted in the same step.
    Mismatch { attempts: u32, revoked: bool },
    /// No live record (never issued, consumed, or expired).
    Missing,
}
