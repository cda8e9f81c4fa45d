use crate::domain::repository::Mailer;
use crate::domain::types::OutgoingMail;

/// Mailer that records the send intent in the log. SMTP delivery is not wired up.
///
/// Only the recipient and template are logged; the token stays out of the log.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn enqueue(&self, mail: OutgoingMail) {
        tracing::info!(
            to = %mail.to,
            user_id = %mail.user_id,
            template = mail.template.as_str(),
            "mail queued"
        );
    }
}
