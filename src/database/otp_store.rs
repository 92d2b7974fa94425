//! Keyed storage for one-time passcodes: email -> (code digest, expiry, attempts).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::otp::{OtpCheck, OtpRecord};
use crate::utils::crypto::digests_match;

#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Inserts or replaces the record for `record.email`.
    async fn put(&self, record: OtpRecord) -> Result<()>;
    /// Removes the record only while it still holds `code_hash`, so a newer
    /// code issued in the meantime survives. Returns whether a row went away.
    async fn remove_if_matches(&self, email: &str, code_hash: &str) -> Result<bool>;
    /// Atomically consumes the record when `code_hash` matches and it is still
    /// live; otherwise bumps the attempt counter of a live record and deletes
    /// it in the same step once the counter reaches `max_attempts`. An expired
    /// record is removed and reported as missing.
    async fn check_and_consume(
        &self,
        email: &str,
        code_hash: &str,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<OtpCheck>;
    /// Deletes every record whose expiry is at or before `now`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[derive(Default)]
pub struct InMemoryOtpStore {
    records: Mutex<HashMap<String, OtpRecord>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, email: &str) -> Option<OtpRecord> {
        self.records.lock().await.get(email).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, record: OtpRecord) -> Result<()> {
        self.records
            .lock()
            .await
            .insert(record.email.clone(), record);
        Ok(())
    }

    async fn remove_if_matches(&self, email: &str, code_hash: &str) -> Result<bool> {
        let mut records = self.records.lock().await;
        match records.get(email) {
            Some(record) if digests_match(&record.code_hash, code_hash) => {
                records.remove(email);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn check_and_consume(
        &self,
        email: &str,
        code_hash: &str,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<OtpCheck> {
        let mut records = self.records.lock().await;
        let Some(record) = records.get_mut(email) else {
            return Ok(OtpCheck::Missing);
        };

        if record.is_expired(now) {
            records.remove(email);
            return Ok(OtpCheck::Missing);
        }

        if digests_match(&record.code_hash, code_hash) {
            records.remove(email);
            return Ok(OtpCheck::Verified);
        }

        record.attempts += 1;
        let attempts = record.attempts;
        let revoked = attempts >= max_attempts;
        if revoked {
            records.remove(email);
        }
        Ok(OtpCheck::Mismatch { attempts, revoked })
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        Ok((before - records.len()) as u64)
    }
}

/// Shared table so every server process sees the same codes.
#[derive(Clone)]
pub struct PgOtpStore {
    pool: PgPool,
}

impl PgOtpStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AttemptsRow {
    attempts: i32,
}

#[async_trait]
impl OtpStore for PgOtpStore {
    async fn put(&self, record: OtpRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO otp_codes (email, code_hash, expires_at, attempts)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET code_hash = EXCLUDED.code_hash,
                expires_at = EXCLUDED.expires_at,
                attempts = EXCLUDED.attempts
            "#,
        )
        .bind(&record.email)
        .bind(&record.code_hash)
        .bind(record.expires_at)
        .bind(record.attempts as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_if_matches(&self, email: &str, code_hash: &str) -> Result<bool> {
        let res = sqlx::query("DELETE FROM otp_codes WHERE email = $1 AND code_hash = $2")
            .bind(email)
            .bind(code_hash)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn check_and_consume(
        &self,
        email: &str,
        code_hash: &str,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<OtpCheck> {
        let consumed = sqlx::query(
            "DELETE FROM otp_codes WHERE email = $1 AND code_hash = $2 AND expires_at > $3",
        )
        .bind(email)
        .bind(code_hash)
        .bind(now)
        .execute(&self.pool)
        .await?;
        if consumed.rows_affected() == 1 {
            return Ok(OtpCheck::Verified);
        }

        // The UPDATE row lock is held until commit, so a concurrent `put`
        // for the same email waits and is never deleted by the revocation.
        let mut tx = self.pool.begin().await?;
        let bumped = sqlx::query_as::<_, AttemptsRow>(
            r#"
            UPDATE otp_codes SET attempts = attempts + 1
            WHERE email = $1 AND expires_at > $2
            RETURNING attempts
            "#,
        )
        .bind(email)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = bumped else {
            tx.commit().await?;
            sqlx::query("DELETE FROM otp_codes WHERE email = $1 AND expires_at <= $2")
                .bind(email)
                .bind(now)
                .execute(&self.pool)
                .await?;
            return Ok(OtpCheck::Missing);
        };

        let attempts = row.attempts.max(0) as u32;
        let revoked = attempts >= max_attempts;
        if revoked {
            sqlx::query("DELETE FROM otp_codes WHERE email = $1")
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(OtpCheck::Mismatch { attempts, revoked })
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let res = sqlx::query("DELETE FROM otp_codes WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
