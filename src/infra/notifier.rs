use crate::{
    domain::message::Message,
    usecases::contracts::{NotificationDispatcher, NotificationError},
};

const NOTIFICATION_QUEUED: &str = "NOTIFICATION_QUEUED";

/// Records the out-of-band notification as a log event instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl NotificationDispatcher for LogNotifier {
    fn notify_new_message(&self, message: &Message) -> Result<(), NotificationError> {
        tracing::info!(
            code = NOTIFICATION_QUEUED,
            message_id = %message.id,
            recipient = %message.recipient_id,
            kind = ?message.kind,
            "new message notification"
        );
        Ok(())
    }
}
