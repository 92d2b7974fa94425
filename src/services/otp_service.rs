use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::database::{DynOtpStore, DynStore};
use crate::error::{Error, Result};
use crate::models::otp::{OtpCheck, OtpRecord};
use crate::services::notification_service::OtpMailer;
use crate::utils::{crypto::digest_otp, time, token::generate_otp_code, validation::checked_email};

#[derive(Clone)]
pub struct OtpService {
    codes: DynOtpStore,
    users: DynStore,
    mailer: Arc<dyn OtpMailer>,
    ttl_minutes: i64,
    max_attempts: u32,
}

/// What `issue` stored, for callers that need the expiry.
#[derive(Debug, Clone)]
pub struct IssuedOtp {
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpService {
    pub fn new(
        codes: DynOtpStore,
        users: DynStore,
        mailer: Arc<dyn OtpMailer>,
        ttl_minutes: i64,
        max_attempts: u32,
    ) -> Self {
        Self {
            codes,
            users,
            mailer,
            ttl_minutes,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Stores a fresh code for `email`, replacing any live one, and sends it.
    pub async fn issue(&self, email: &str) -> Result<IssuedOtp> {
        let email = checked_email(email)?;
        let code = generate_otp_code();
        let expires_at = time::minutes_from(time::now(), self.ttl_minutes);

        let code_hash = digest_otp(&email, &code);

        self.codes
            .put(OtpRecord {
                email: email.clone(),
                code_hash: code_hash.clone(),
                expires_at,
                attempts: 0,
            })
            .await?;

        if let Err(err) = self.mailer.send_otp(&email, &code, self.ttl_minutes).await {
            // An undelivered code must not stay live.
            self.codes.remove_if_matches(&email, &code_hash).await?;
            return Err(match err {
                Error::DeliveryFailed(reason) => Error::DeliveryFailed(reason),
                other => Error::DeliveryFailed(other.to_string()),
            });
        }

        tracing::info!(%email, %expires_at, "OTP issued");
        Ok(IssuedOtp { email, expires_at })
    }

    /// Consumes the code on success. Marks a registered account with that
    /// email as verified.
    pub async fn verify(&self, email: &str, code: &str) -> Result<()> {
        let email = checked_email(email)?;
        let code_hash = digest_otp(&email, code.trim());

        match self
            .codes
            .check_and_consume(&email, &code_hash, time::now(), self.max_attempts)
            .await?
        {
            OtpCheck::Verified => {
                let known = self.users.mark_email_verified(&email).await?;
                tracing::info!(%email, account = known, "OTP verified");
                Ok(())
            }
            OtpCheck::Mismatch { attempts, revoked } => {
                if revoked {
                    tracing::warn!(%email, attempts, "OTP attempt limit reached, code revoked");
                }
                Err(Error::OtpMismatch)
            }
            OtpCheck::Missing => Err(Error::OtpExpiredOrMissing),
        }
    }

    pub async fn sweep_expired(&self) -> Result<u64> {
        let purged = self.codes.purge_expired(time::now()).await?;
        if purged > 0 {
            tracing::debug!(purged, "Swept expired OTP records");
        }
        Ok(purged)
    }
}
