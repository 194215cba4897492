use secrecy::SecretString;
use crate::domain::SubscriberEmail;

/// What the credential strategies hand to the subscription client.
#[derive(Debug)]
pub enum Identity {
    /// Opaque token issued by the identity provider.
    BearerToken(SecretString),
    Email(SubscriberEmail),
}
