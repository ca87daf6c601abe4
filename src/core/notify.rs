use crate::domain::model::{DealNotification, Email, SearchResult, ShopperState};
use crate::domain::ports::{Agent, Mailer};
use crate::utils::error::{Result, ShopperError};
use async_trait::async_trait;
use std::io::Write;
use std::sync::{Arc, Mutex};

pub const AGENT_NAME: &str = "NotifyAgent";

const DIVIDER: &str = "==================================================";

/// The caller must present the key configured on this machine.
pub fn authorize(provided: Option<&str>, expected: Option<&str>) -> Result<()> {
    let expected = expected
        .filter(|key| !key.is_empty())
        .ok_or(ShopperError::MissingApiKey)?;

    match provided {
        Some(key) if key == expected => Ok(()),
        _ => Err(ShopperError::Unauthorized),
    }
}

pub fn subject(notification: &DealNotification) -> String {
    format!("Deal found: {} for ${:.2}", notification.product, notification.price)
}

pub fn render_text(notification: &DealNotification) -> String {
    format!(
        "Great news! We found {} for ${:.2}.\nWhere to buy:\n{}\n\nReply 'yes' to confirm purchase or 'no' to ignore.",
        notification.product,
        notification.price,
        notification.links.join("\n")
    )
}

pub fn render_html(notification: &DealNotification) -> String {
    format!(
        "<p>Great news! We found <strong>{}</strong> for <strong>${:.2}</strong>.</p>\
        <p>Where to buy:<br/>{}</p>\
        <p>Reply <em>yes</em> to confirm purchase or <em>no</em> to ignore.</p>",
        notification.product,
        notification.price,
        notification.links.join("<br/>")
    )
}

pub fn render_stdout(notification: &DealNotification) -> String {
    let mut block = vec![DIVIDER.to_string()];
    match notification.user_contact.as_deref() {
        Some(contact) if !contact.is_empty() => block.push(format!("Notification TO: {}", contact)),
        _ => block.push("Notification (stdout only)".to_string()),
    }
    block.push(format!("Suggested Product: {}", notification.product));
    block.push(format!("Price: ${:.2}", notification.price));
    block.push("Where to buy:".to_string());
    block.extend(notification.links.iter().map(|link| format!("  - {}", link)));
    block.push("\nDo you want to buy this product? Reply 'yes' or 'no' to confirm.".to_string());
    block.push(DIVIDER.to_string());
    block.push("(Notification printed – in production this would be sent by email.)".to_string());
    block.join("\n")
}

/// Delivers deal notifications by email, or to stdout when email is off or fails.
pub struct Notifier {
    mailer: Option<Arc<dyn Mailer>>,
    expected_key: Option<String>,
    from_email: String,
    out: Mutex<Box<dyn Write + Send>>,
}

impl Notifier {
    pub fn new(mailer: Option<Arc<dyn Mailer>>, expected_key: Option<String>, from_email: &str) -> Self {
        Self {
            mailer,
            expected_key,
            from_email: from_email.to_string(),
            out: Mutex::new(Box::new(std::io::stdout())),
        }
    }

    pub fn with_output(mut self, out: Box<dyn Write + Send>) -> Self {
        self.out = Mutex::new(out);
        self
    }

    pub async fn send(&self, notification: &DealNotification, use_email: bool) -> bool {
        if let Err(e) = authorize(notification.api_key.as_deref(), self.expected_key.as_deref()) {
            tracing::error!("❌ Notification rejected: {}", e);
            return false;
        }

        let email_target = notification
            .user_contact
            .as_deref()
            .filter(|contact| contact.contains('@'));

        if let (true, Some(mailer), Some(to)) = (use_email, self.mailer.as_ref(), email_target) {
            let email = Email {
                from: self.from_email.clone(),
                to: to.to_string(),
                subject: subject(notification),
                html: render_html(notification),
                text: render_text(notification),
            };
            match mailer.send(&email).await {
                Ok(()) => {
                    tracing::info!("📧 Email sent to {}", to);
                    return true;
                }
                Err(e) => tracing::warn!("⚠️ Email failed, printing instead: {}", e),
            }
        }

        self.print(notification)
    }

    fn print(&self, notification: &DealNotification) -> bool {
        let block = render_stdout(notification);
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        match writeln!(out, "{}", block).and_then(|_| out.flush()) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("❌ Could not print notification: {}", e);
                false
            }
        }
    }
}

/// Last graph node: turns the search outcome into a notification.
pub struct NotifyAgent {
    notifier: Arc<Notifier>,
    contact: Option<String>,
    api_key: Option<String>,
    use_email: bool,
}

impl NotifyAgent {
    pub fn new(notifier: Arc<Notifier>, contact: Option<String>, api_key: Option<String>, use_email: bool) -> Self {
        Self {
            notifier,
            contact,
            api_key,
            use_email,
        }
    }

    pub fn build_notification(&self, state: &ShopperState) -> DealNotification {
        let (product, price, links) = match state.search_result.as_ref() {
            Some(SearchResult::Listing(listing)) => (
                listing.product_name.clone(),
                listing.price,
                vec![listing.url.clone()],
            ),
            Some(SearchResult::Note(_)) | None => (state.product.clone(), None, Vec::new()),
        };

        DealNotification {
            product,
            price: price.or(state.suggested_budget).unwrap_or(0.0),
            links,
            user_contact: self.contact.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

#[async_trait]
impl Agent for NotifyAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    async fn run(&self, mut state: ShopperState) -> Result<ShopperState> {
        let notification = self.build_notification(&state);

        let sent = if notification.product.trim().is_empty() || notification.price == 0.0 {
            tracing::warn!("⚠️ Nothing to notify about: no product or price");
            false
        } else {
            self.notifier.send(&notification, self.use_email).await
        };

        state.notification_sent = Some(sent);
        Ok(state)
    }
}
