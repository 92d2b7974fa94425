use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};

/// Delivery channel for one-time passcodes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp(&self, email: &str, code: &str, ttl_minutes: i64) -> Result<()>;
}

/// Posts a rendered message to an HTTP mail relay.
#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    relay_url: String,
    relay_token: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(relay_url: String, relay_token: Option<String>, from: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| Error::Config(format!("failed to build mail client: {}", e)))?;
        Ok(Self {
            client,
            relay_url,
            relay_token,
            from,
        })
    }
}

fn render_otp_html(code: &str, ttl_minutes: i64) -> String {
    format!(
        "<h2>Your OTP Code</h2>\
         <p>Your verification code is: <strong>{}</strong></p>\
         <p>This code will expire in {} minutes.</p>",
        code, ttl_minutes
    )
}

#[async_trait]
impl OtpMailer for HttpMailer {
    async fn send_otp(&self, email: &str, code: &str, ttl_minutes: i64) -> Result<()> {
        let payload = json!({
            "from": self.from,
            "to": email,
            "subject": "Your OTP Code - Job Portal",
            "html": render_otp_html(code, ttl_minutes),
        });

        let mut request = self.client.post(&self.relay_url).json(&payload);
        if let Some(token) = &self.relay_token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| Error::DeliveryFailed(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::DeliveryFailed(format!(
                "mail relay answered {}: {}",
                status, body
            )));
        }

        tracing::info!(to = %email, "OTP email handed to relay");
        Ok(())
    }
}

/// Development channel used when no relay is configured; the code only
/// reaches the debug log.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl OtpMailer for LogMailer {
    async fn send_otp(&self, email: &str, code: &str, ttl_minutes: i64) -> Result<()> {
        tracing::info!(to = %email, ttl_minutes, "OTP issued (no mail relay configured)");
        tracing::debug!(to = %email, %code, "OTP code");
        Ok(())
    }
}

pub fn mailer_from_config(config: &Config) -> Result<std::sync::Arc<dyn OtpMailer>> {
    match &config.mail_relay_url {
        Some(url) => Ok(std::sync::Arc::new(HttpMailer::new(
            url.clone(),
            config.mail_relay_token.clone(),
            config.mail_from.clone(),
        )?)),
        None => {
            tracing::warn!("MAIL_RELAY_URL not set, OTP codes are only written to the debug log");
            Ok(std::sync::Arc::new(LogMailer))
        }
    }
}
