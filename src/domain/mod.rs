mod draft_email;
mod identity;
mod notification;
mod subscriber_email;
mod subscriber_record;

pub use draft_email::DraftEmail;
pub use identity::Identity;
pub use notification::{Notification, Severity};
pub use subscriber_email::{is_valid_email, SubscriberEmail};
pub use subscriber_record::SubscriberRecord;
