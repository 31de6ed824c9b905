use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::util::email::{EmailError, EmailMessage, Mailer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchKind {
    Quote,
    Inquiry,
    Review,
}

impl DispatchKind {
    fn label(self) -> &'static str {
        match self {
            DispatchKind::Quote => "quote request",
            DispatchKind::Inquiry => "inquiry",
            DispatchKind::Review => "review",
        }
    }

    /// Reviews are moderated silently; everything else gets a confirmation.
    fn confirms_to_customer(self) -> bool {
        !matches!(self, DispatchKind::Review)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DispatchItem {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

/// Body of the notification-email function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmailDispatchRequest {
    #[serde(rename = "type")]
    pub kind: DispatchKind,
    #[validate(length(min = 1, max = 120))]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: String,
    #[serde(default)]
    #[validate(nested)]
    pub items: Option<Vec<DispatchItem>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub admin_notified: bool,
    pub customer_confirmed: bool,
}

/// Renders and sends the templated notification emails.
pub struct EmailDispatchService {
    mailer: Arc<dyn Mailer>,
    admin_email: String,
    company_name: String,
}

impl EmailDispatchService {
    pub fn new(mailer: Arc<dyn Mailer>, admin_email: String, company_name: String) -> Self {
        Self { mailer, admin_email, company_name }
    }

    /// Mails the admin inbox, then confirms to the customer where applicable.
    /// Only the admin message can fail the call.
    #[instrument(skip(self, request), fields(kind = ?request.kind, customer = %request.customer_email))]
    pub async fn dispatch(&self, request: &EmailDispatchRequest) -> Result<DispatchOutcome, EmailError> {
        let admin = EmailMessage::new(
            self.admin_email.clone(),
            format!("New {} from {}", request.kind.label(), request.customer_name),
        )
        .with_text_body(self.admin_text(request))
        .with_html_body(self.admin_html(request));
        self.mailer.send_email(admin).await?;
        info!("Admin notification email sent");

        let mut customer_confirmed = false;
        if request.kind.confirms_to_customer() && request.customer_email.trim().is_empty() {
            debug!("No customer address, confirmation skipped");
        } else if request.kind.confirms_to_customer() {
            let confirmation = EmailMessage::new(
                request.customer_email.clone(),
                format!("We received your {} - {}", request.kind.label(), self.company_name),
            )
            .with_text_body(self.confirmation_text(request))
            .with_html_body(self.confirmation_html(request));
            match self.mailer.send_email(confirmation).await {
                Ok(()) => customer_confirmed = true,
                Err(e) => warn!("Customer confirmation email failed: {}", e),
            }
        }

        Ok(DispatchOutcome { admin_notified: true, customer_confirmed })
    }

    fn items_text(request: &EmailDispatchRequest) -> String {
        match request.items.as_deref() {
            Some(items) if !items.is_empty() => items
                .iter()
                .map(|item| format!("- {} x{}", item.name, item.quantity))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => "(no items)".to_string(),
        }
    }

    fn items_html(request: &EmailDispatchRequest) -> String {
        match request.items.as_deref() {
            Some(items) if !items.is_empty() => {
                let rows: String = items
                    .iter()
                    .map(|item| {
                        format!(
                            "<tr><td>{}</td><td style=\"text-align:right\">{}</td></tr>",
                            html_escape::encode_text(&item.name),
                            item.quantity
                        )
                    })
                    .collect();
                format!("<table><tr><th>Product</th><th>Qty</th></tr>{rows}</table>")
            }
            _ => String::new(),
        }
    }

    fn admin_text(&self, request: &EmailDispatchRequest) -> String {
        let mut body = format!(
            "A new {kind} was submitted.\n\nName: {name}\nEmail: {email}\n",
            kind = request.kind.label(),
            name = request.customer_name,
            email = request.customer_email,
        );
        if request.kind == DispatchKind::Quote {
            body.push_str("\nRequested items:\n");
            body.push_str(&Self::items_text(request));
            body.push('\n');
        }
        body.push_str("\nSign in to the admin dashboard to follow up.");
        body
    }

    fn admin_html(&self, request: &EmailDispatchRequest) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: Arial, sans-serif; color: #333; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #0077b6;">New {kind}</h2>
    <p><strong>Name:</strong> {name}<br><strong>Email:</strong> {email}</p>
    {items}
    <p>Sign in to the admin dashboard to follow up.</p>
</body>
</html>"#,
            kind = request.kind.label(),
            name = html_escape::encode_text(&request.customer_name),
            email = html_escape::encode_text(&request.customer_email),
            items = Self::items_html(request),
        )
    }

    fn confirmation_text(&self, request: &EmailDispatchRequest) -> String {
        let mut body = format!(
            "Hello {name},\n\nThank you for your {kind}. Our team will get back to you shortly.\n",
            name = request.customer_name,
            kind = request.kind.label(),
        );
        if request.kind == DispatchKind::Quote {
            body.push_str("\nYour selection:\n");
            body.push_str(&Self::items_text(request));
            body.push('\n');
        }
        body.push_str(&format!("\nBest regards,\nThe {} Team", self.company_name));
        body
    }

    fn confirmation_html(&self, request: &EmailDispatchRequest) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: Arial, sans-serif; color: #333; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #0077b6;">{company}</h2>
    <p>Hello {name},</p>
    <p>Thank you for your {kind}. Our team will get back to you shortly.</p>
    {items}
    <p>Best regards,<br>The {company} Team</p>
</body>
</html>"#,
            company = html_escape::encode_text(&self.company_name),
            name = html_escape::encode_text(&request.customer_name),
            kind = request.kind.label(),
            items = Self::items_html(request),
        )
    }
}
