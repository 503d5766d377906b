//! Alert delivery channels

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};

use crate::{
    config::{AlertChannelKind, EmailConfig},
    error::{AppError, AppResult},
};

/// Outbound notification channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertChannel: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Build the channel selected in configuration
pub fn channel_for(kind: AlertChannelKind, email: &EmailConfig) -> Arc<dyn AlertChannel> {
    match kind {
        AlertChannelKind::Log => Arc::new(LogAlertChannel::new(email)),
        AlertChannelKind::Email => Arc::new(EmailAlertChannel::new(email.clone())),
    }
}

/// Simulated email: the message is written to the log
#[derive(Clone)]
pub struct LogAlertChannel {
    from: String,
}

impl LogAlertChannel {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            from: format_from(config),
        }
    }
}

#[async_trait]
impl AlertChannel for LogAlertChannel {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        tracing::info!(
            to,
            from = %self.from,
            subject,
            "Simulated email notification\n{}",
            body
        );
        Ok(())
    }
}

/// SMTP delivery through lettre
#[derive(Clone)]
pub struct EmailAlertChannel {
    config: EmailConfig,
}

impl EmailAlertChannel {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> AppResult<Message> {
        let from_mailbox = Mailbox::from_str(&format_from(&self.config))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body(body)),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))
    }

    fn build_mailer(&self) -> AppResult<SmtpTransport> {
        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        Ok(mailer_builder.build())
    }
}

#[async_trait]
impl AlertChannel for EmailAlertChannel {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let email = self.build_message(to, subject, body)?;
        let mailer = self.build_mailer()?;

        // SmtpTransport blocks; keep it off the async workers
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn html_body(body: &str) -> String {
    format!(
        r#"<html><body><pre>{}</pre></body></html>"#,
        html_escape(body).replace('\n', "<br>")
    )
}

fn format_from(config: &EmailConfig) -> String {
    let from_name = config.smtp_from_name.as_deref().unwrap_or("LabMonitor");
    format!("{} <{}>", from_name, config.smtp_from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_channel_never_fails() {
        let channel = LogAlertChannel::new(&EmailConfig::default());
        assert_eq!(channel.from, "LabMonitor <noreply@labmonitor.app>");
        assert!(channel.send("lab.admin@example.com", "subject", "body").await.is_ok());
    }

    #[test]
    fn test_html_body_escapes_names() {
        let html = html_body("Instrument: <script>alert(\"x\")</script> & co\nDue: today");
        assert_eq!(
            html,
            "<html><body><pre>Instrument: &lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; co<br>Due: today</pre></body></html>"
        );
    }

    #[test]
    fn test_email_message_rejects_bad_recipient() {
        let channel = EmailAlertChannel::new(EmailConfig::default());
        assert!(channel.build_message("not an address", "s", "b").is_err());
        assert!(channel.build_message("lab.admin@example.com", "s", "b").is_ok());
    }
}
