use serde::{Deserialize, Serialize};

/// The locally persisted identity of the current subscriber.
///
/// Serialised without a tag so the stored JSON is exactly the shape the
/// backend returned: `{name, email, picture}` for identity-provider sign-ins,
/// `{email}` for plain email subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubscriberRecord {
    Profile {
        name: String,
        email: String,
        picture: String,
    },
    Email {
        email: String,
    },
}

impl SubscriberRecord {
    pub fn email(&self) -> &str {
        match self {
            SubscriberRecord::Profile { email, .. } | SubscriberRecord::Email { email } => email,
        }
    }

    /// Name shown in greetings; email-only subscribers are greeted by address.
    pub fn display_name(&self) -> &str {
        match self {
            SubscriberRecord::Profile { name, .. } => name,
            SubscriberRecord::Email { email } => email,
        }
    }
}
