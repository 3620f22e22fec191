use contracts::domain::a004_message::aggregate::{Message, MessageChange};

/// Audit log entry as shown on the message page
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRow {
    pub id: i64,
    pub date: i64,
    /// Role half of a `role|target` old value
    pub old_role: Option<String>,
    pub old: String,
    pub new: String,
    pub change_type: String,
    pub description: String,
}

impl From<MessageChange> for ChangeRow {
    fn from(change: MessageChange) -> Self {
        let (old_role, old) = match change.old.split('|').collect::<Vec<_>>().as_slice() {
            [role, target] => (Some(role.to_string()), target.to_string()),
            _ => (None, change.old.clone()),
        };
        let change_type = change
            .change_type
            .split('-')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            id: change.id,
            date: change.date,
            old_role,
            old,
            new: change.new,
            change_type,
            description: change.description,
        }
    }
}

/// `None` when the sender never reported a status
pub fn sent_status(message: &Message) -> Option<&'static str> {
    message
        .generic_message_sent_status
        .map(|sent| if sent { "sent" } else { "failed to send" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(old: &str, change_type: &str) -> MessageChange {
        MessageChange {
            id: 1,
            date: 100,
            old: old.into(),
            new: "bob".into(),
            change_type: change_type.into(),
            description: "".into(),
        }
    }

    #[test]
    fn test_role_target_split() {
        let row = ChangeRow::from(change("user|alice", "target-change"));
        assert_eq!(row.old_role.as_deref(), Some("user"));
        assert_eq!(row.old, "alice");
        assert_eq!(row.change_type, "target");
    }

    #[test]
    fn test_plain_old_value() {
        let row = ChangeRow::from(change("sms", "mode"));
        assert_eq!(row.old_role, None);
        assert_eq!(row.old, "sms");
        assert_eq!(row.change_type, "mode");

        let row = ChangeRow::from(change("a|b|c", "mode-change"));
        assert_eq!(row.old, "a|b|c");
    }

    #[test]
    fn test_sent_status() {
        let mut message: Message = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(sent_status(&message), None);
        message.generic_message_sent_status = Some(true);
        assert_eq!(sent_status(&message), Some("sent"));
        message.generic_message_sent_status = Some(false);
        assert_eq!(sent_status(&message), Some("failed to send"));
    }
}
