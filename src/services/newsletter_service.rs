use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::{AppError, EmailError};
use crate::models::{NewsletterResponse, Subscription};
use crate::secrets::ApiKey;

const WELCOME_SUBJECT: &str = "Welcome to Fed Risk Brief - Your Subscription is Confirmed";
const DASHBOARD_URL: &str = "https://fedanalysis.com/dashboard";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// SMTP settings for the welcome email
#[derive(Debug, Clone)]
pub struct NewsletterConfig {
    pub smtp_enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: Option<ApiKey>,
    pub from_email: String,
    pub from_name: String,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            smtp_enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: None,
            from_email: "newsletter@fedanalysis.com".to_string(),
            from_name: "FedAnalysis".to_string(),
        }
    }
}

impl NewsletterConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            smtp_enabled: std::env::var("SMTP_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                == "true",
            smtp_host: std::env::var("SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.smtp_port),
            smtp_username: std::env::var("SMTP_USERNAME").unwrap_or(defaults.smtp_username),
            smtp_password: ApiKey::from_env("SMTP_PASSWORD"),
            from_email: std::env::var("SMTP_FROM_EMAIL").unwrap_or(defaults.from_email),
            from_name: std::env::var("SMTP_FROM_NAME").unwrap_or(defaults.from_name),
        }
    }
}

/// Where subscriptions are recorded
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Record `email`, returning the existing subscription if already present.
    async fn record(&self, email: &str) -> Result<Subscription, AppError>;
}

/// Process-local subscription store
#[derive(Clone, Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: Arc<DashMap<String, Subscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.subscriptions.contains_key(email)
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn record(&self, email: &str) -> Result<Subscription, AppError> {
        let entry = self
            .subscriptions
            .entry(email.to_string())
            .or_insert_with(|| Subscription {
                id: Uuid::new_v4(),
                email: email.to_string(),
                subscribed_at: Utc::now(),
            });
        Ok(entry.value().clone())
    }
}

/// Delivers the welcome email
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_welcome(&self, to_email: &str) -> Result<(), EmailError>;
}

/// Sends mail through an SMTP relay with STARTTLS
pub struct SmtpEmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(config: &NewsletterConfig) -> Result<Self, EmailError> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| EmailError::Address(format!("invalid from address: {}", e)))?;

        let password = config
            .smtp_password
            .as_ref()
            .map(|p| p.expose().to_string())
            .unwrap_or_default();
        let creds = Credentials::new(config.smtp_username.clone(), password);

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| EmailError::Transport(format!("failed to create SMTP transport: {}", e)))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        info!("SMTP email sender configured for {}:{}", config.smtp_host, config.smtp_port);
        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send_welcome(&self, to_email: &str) -> Result<(), EmailError> {
        let to: Mailbox = to_email
            .parse()
            .map_err(|e| EmailError::Address(format!("invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(WELCOME_SUBJECT)
            .multipart(MultiPart::alternative_plain_html(
                welcome_text(),
                welcome_html(),
            ))
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        info!("Newsletter welcome email sent to {}", to_email);
        Ok(())
    }
}

/// Logs the email instead of sending it (SMTP disabled)
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_welcome(&self, to_email: &str) -> Result<(), EmailError> {
        info!("SMTP disabled; welcome email would be sent to {} (subject: {})", to_email, WELCOME_SUBJECT);
        Ok(())
    }
}

/// Records newsletter subscriptions and sends the welcome email.
///
/// The subscription is persisted before the email is attempted, and a failed
/// email never removes it.
pub struct NewsletterService {
    store: Arc<dyn SubscriptionStore>,
    sender: Arc<dyn EmailSender>,
}

impl NewsletterService {
    pub fn new(store: Arc<dyn SubscriptionStore>, sender: Arc<dyn EmailSender>) -> Self {
        Self { store, sender }
    }

    /// Build from configuration, falling back to log-only email when SMTP is
    /// disabled or cannot be set up.
    pub fn from_config(config: &NewsletterConfig, store: Arc<dyn SubscriptionStore>) -> Self {
        let sender: Arc<dyn EmailSender> = if config.smtp_enabled {
            match SmtpEmailSender::new(config) {
                Ok(sender) => Arc::new(sender),
                Err(e) => {
                    warn!("Failed to configure SMTP, logging emails instead: {}", e);
                    Arc::new(LogEmailSender)
                }
            }
        } else {
            info!("SMTP disabled; newsletter emails will be logged");
            Arc::new(LogEmailSender)
        };

        Self::new(store, sender)
    }

    pub async fn subscribe(&self, email: &str) -> Result<NewsletterResponse, AppError> {
        let email = normalize_email(email)?;

        let subscription = self.store.record(&email).await?;
        info!("Recorded newsletter subscription {} for {}", subscription.id, email);

        let email_sent = match self.sender.send_welcome(&email).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to send welcome email to {}: {}", email, e);
                false
            }
        };

        Ok(NewsletterResponse {
            success: true,
            email_sent,
            subscribed_at: subscription.subscribed_at,
        })
    }
}

/// Trim, lowercase and shape-check an address.
pub fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(AppError::Validation(format!("Invalid email address: {}", email)));
    }
    Ok(email)
}

fn welcome_text() -> String {
    format!(
        "Welcome to Fed Risk Brief\n\n\
         Thank you for subscribing to our weekly Federal Reserve analysis newsletter.\n\n\
         What to expect:\n\
         - Weekly Federal Reserve policy analysis and signals\n\
         - Market impact assessments from FOMC communications\n\
         - Portfolio positioning insights for policy scenarios\n\
         - Exclusive institutional research and data\n\n\
         Launch the dashboard: {}\n\n\
         FedAnalysis - Professional Federal Reserve Analysis Platform",
        DASHBOARD_URL
    )
}

fn welcome_html() -> String {
    format!(
        r#"<div style="max-width: 600px; margin: 0 auto; padding: 20px; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', sans-serif;">
  <div style="background: linear-gradient(135deg, #1e293b 0%, #1e40af 100%); padding: 40px 30px; border-radius: 16px; margin-bottom: 30px;">
    <h1 style="color: white; font-size: 32px; font-weight: bold; margin: 0 0 15px 0;">Welcome to Fed Risk Brief</h1>
    <p style="color: #cbd5e1; font-size: 18px; margin: 0; line-height: 1.6;">Thank you for subscribing to our weekly Federal Reserve analysis newsletter.</p>
  </div>
  <div style="background: #f8fafc; padding: 30px; border-radius: 12px; margin-bottom: 30px;">
    <h2 style="color: #1e293b; font-size: 24px; margin: 0 0 20px 0;">What to Expect</h2>
    <ul style="color: #475569; font-size: 16px; line-height: 1.8; margin: 0; padding-left: 20px;">
      <li>Weekly Federal Reserve policy analysis and signals</li>
      <li>Market impact assessments from FOMC communications</li>
      <li>Portfolio positioning insights for policy scenarios</li>
      <li>Exclusive institutional research and data</li>
    </ul>
  </div>
  <div style="text-align: center; padding: 30px 0;">
    <a href="{}" style="background: #2563eb; color: white; padding: 16px 32px; text-decoration: none; border-radius: 8px; font-weight: bold; display: inline-block;">Launch Dashboard</a>
  </div>
</div>"#,
        DASHBOARD_URL
    )
}
