use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::domain::{Identity, SubscriberRecord};
use crate::error::SubmitError;

pub const GOOGLE_AUTH_PATH: &str = "/api/auth/google";
pub const SUBSCRIBE_PATH: &str = "/api/subscribe";

/// A successful subscription as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub record: SubscriberRecord,
    /// The backend already knew this subscriber.
    pub existing: bool,
    pub message: Option<String>,
}

/// Talks to the subscription backend. One call, one request, no retries.
pub struct SubscriptionClient {
    http_client: Client,
    base_url: String,
}

impl SubscriptionClient {
    pub fn new(base_url: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http_client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[tracing::instrument(
        name = "Submitting subscription to backend",
        skip(self, identity),
        fields(endpoint = tracing::field::Empty)
    )]
    pub async fn submit(&self, identity: &Identity) -> Result<Subscription, SubmitError> {
        let (path, request) = match identity {
            Identity::BearerToken(token) => (
                GOOGLE_AUTH_PATH,
                self.http_client.post(format!("{}{}", self.base_url, GOOGLE_AUTH_PATH)).json(&GoogleAuthRequest {
                    id_token: token.expose_secret(),
                    message: "Subscribed",
                }),
            ),
            Identity::Email(email) => (
                SUBSCRIBE_PATH,
                self.http_client
                    .post(format!("{}{}", self.base_url, SUBSCRIBE_PATH))
                    .json(&SubscribeRequest { email: email.as_ref() }),
            ),
        };
        tracing::Span::current().record("endpoint", path);

        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to reach the subscription backend: {:?}", e);
            SubmitError::Network(e.to_string())
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read the response body: {:?}", e);
            SubmitError::Network(e.to_string())
        })?;
        tracing::debug!(%status, "Backend responded");

        let body: Value = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(%status, "Backend returned a non-JSON body: {:?}", e);
            SubmitError::Protocol(format!("response body is not JSON ({})", e))
        })?;

        if body.get("ok").and_then(Value::as_bool) != Some(true) {
            return Err(SubmitError::Rejected(rejection_reason(&body)));
        }

        match identity {
            Identity::BearerToken(_) => parse_google_auth_response(body),
            Identity::Email(_) => parse_subscribe_response(body),
        }
    }
}

#[derive(Serialize)]
struct GoogleAuthRequest<'a> {
    id_token: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct SubscribeRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct GoogleAuthResponse {
    #[serde(default)]
    existing: bool,
    user: GoogleUser,
}

#[derive(Deserialize)]
struct GoogleUser {
    name: String,
    email: String,
    picture: String,
}

#[derive(Deserialize)]
struct SubscribeResponse {
    #[serde(default)]
    existing: bool,
    email: String,
    message: Option<String>,
}

fn parse_google_auth_response(body: Value) -> Result<Subscription, SubmitError> {
    let response: GoogleAuthResponse = serde_json::from_value(body)
        .map_err(|e| SubmitError::Protocol(format!("malformed sign-in response ({})", e)))?;
    let GoogleUser { name, email, picture } = response.user;
    Ok(Subscription {
        record: SubscriberRecord::Profile { name, email, picture },
        existing: response.existing,
        message: None,
    })
}

fn parse_subscribe_response(body: Value) -> Result<Subscription, SubmitError> {
    let response: SubscribeResponse = serde_json::from_value(body)
        .map_err(|e| SubmitError::Protocol(format!("malformed subscribe response ({})", e)))?;
    Ok(Subscription {
        record: SubscriberRecord::Email { email: response.email },
        existing: response.existing,
        message: response.message,
    })
}

/// `msg` when the backend gave one, otherwise the whole body.
fn rejection_reason(body: &Value) -> String {
    match body.get("msg") {
        Some(Value::String(msg)) if !msg.is_empty() => msg.clone(),
        Some(Value::Null) | Some(Value::String(_)) | None => body.to_string(),
        Some(other) => other.to_string(),
    }
}
