use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

use crate::core::config::Settings;

/// Thin client for the transactional-mail collaborator. Delivery failures
/// are reported to the caller, which logs and continues: mail is a side
/// effect, never a precondition.
#[derive(Debug, Clone)]
pub(crate) struct MailerService {
    client: Client,
    api_key: String,
    base_url: String,
    from_address: String,
    invite_link_base: String,
}

impl MailerService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        if !settings.mail().is_configured() {
            tracing::warn!("Mail transport not configured; invitation emails will be skipped");
            return Ok(None);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(settings.mail().timeout_seconds))
            .build()
            .context("Failed to build mail HTTP client")?;

        Ok(Some(Self {
            client,
            api_key: settings.mail().api_key.clone(),
            base_url: settings.mail().base_url.trim_end_matches('/').to_string(),
            from_address: settings.mail().from_address.clone(),
            invite_link_base: settings.mail().invite_link_base.trim_end_matches('/').to_string(),
        }))
    }

    pub(crate) async fn send_invitation(
        &self,
        to: &str,
        presentation_title: &str,
        token: &str,
    ) -> Result<()> {
        let link = format!("{}/{}", self.invite_link_base, token);
        let body = format!(
            "You have been invited to take the \"{presentation_title}\" audit.\n\n\
             Open {link} to get started."
        );
        self.send(to, &format!("Invitation: {presentation_title}"), &body).await
    }

    pub(crate) async fn send_share_notice(
        &self,
        to: &str,
        presentation_title: &str,
    ) -> Result<()> {
        let body = format!(
            "The \"{presentation_title}\" audit has been shared with you.\n\n\
             Sign in to take it from your dashboard."
        );
        self.send(to, &format!("Audit shared with you: {presentation_title}"), &body).await
    }

    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<()> {
        let endpoint = format!("{}/messages", self.base_url);

        let response = self
            .client
            .post(&endpoint)
            .header("X-Api-Key", &self.api_key)
            .json(&serde_json::json!({
                "from": self.from_address,
                "to": to,
                "subject": subject,
                "text": text,
            }))
            .send()
            .await
            .context("Failed to call mail API")?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let raw_body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<Value>(&raw_body)
            .ok()
            .and_then(|parsed| {
                parsed.get("error").and_then(Value::as_str).map(|msg| msg.to_string())
            })
            .unwrap_or(raw_body);

        anyhow::bail!("Mail API rejected message (status {status}): {detail}")
    }
}
