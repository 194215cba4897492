use crate::domain::{is_valid_email, SubscriberEmail};

/// In-progress contents of the email field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftEmail {
    value: String,
    is_valid: bool,
}

impl DraftEmail {
    pub fn edit(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.is_valid = is_valid_email(&self.value);
    }

    pub fn clear(&mut self) {
        self.edit(String::new());
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn to_subscriber_email(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(self.value.clone())
    }
}
