use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use crate::credentials::{CredentialAcquisition, SignInState};
use crate::domain::{Identity, Notification, Severity, SubscriberRecord};
use crate::error::WidgetError;
use crate::notifications::NotificationManager;
use crate::session_store::SessionStore;
use crate::subscription_client::{Subscription, SubscriptionClient};

/// Shared flag telling an in-flight submission whether the widget still
/// exists. Clone it out before awaiting and call [`Liveness::tear_down`] from
/// wherever the widget is being disposed of.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn tear_down(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What the card currently offers the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Controls {
    /// Subscriber view with a logout control.
    Subscribed,
    SubscribeButton,
    SignInSurface,
    EmailForm { draft: String, is_valid: bool },
}

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub subscriber: Option<SubscriberRecord>,
    pub notification: Option<Notification>,
    pub controls: Controls,
}

pub struct SubscriptionWidget<S> {
    acquisition: CredentialAcquisition,
    subscriber: Option<SubscriberRecord>,
    store: S,
    client: SubscriptionClient,
    notifications: NotificationManager,
    liveness: Liveness,
}

impl<S: SessionStore> SubscriptionWidget<S> {
    /// Builds the widget and rehydrates the subscriber from `store`.
    ///
    /// Toast auto-dismissal runs on the current tokio runtime; built outside
    /// one, the widget works but toasts stay until replaced or dismissed.
    pub fn new(
        acquisition: CredentialAcquisition,
        store: S,
        client: SubscriptionClient,
        notifications: NotificationManager,
    ) -> Self {
        let mut widget = Self {
            acquisition,
            subscriber: None,
            store,
            client,
            notifications,
            liveness: Liveness::new(),
        };
        widget.rehydrate();
        widget
    }

    fn rehydrate(&mut self) {
        match self.store.load() {
            Ok(Some(record)) => {
                tracing::info!(email = %record.email(), "Restored subscriber from session storage");
                self.notifications
                    .show(format!("Welcome back, {}", record.display_name()), Severity::Success);
                self.subscriber = Some(record);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring unreadable session: {:?}", e),
        }
    }

    pub fn view(&self) -> WidgetView {
        let controls = match (&self.subscriber, &self.acquisition) {
            (Some(_), _) => Controls::Subscribed,
            (None, CredentialAcquisition::IdentityProvider(flow)) => match flow.state() {
                SignInState::Hidden | SignInState::Failed => Controls::SubscribeButton,
                SignInState::Requested | SignInState::Succeeded => Controls::SignInSurface,
            },
            (None, CredentialAcquisition::Email(form)) => Controls::EmailForm {
                draft: form.draft().value().to_string(),
                is_valid: form.draft().is_valid(),
            },
        };
        WidgetView {
            subscriber: self.subscriber.clone(),
            notification: self.notifications.current(),
            controls,
        }
    }

    pub fn subscriber(&self) -> Option<&SubscriberRecord> {
        self.subscriber.as_ref()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscriber.is_some()
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    pub fn dismiss_notification(&mut self) {
        self.notifications.dismiss();
    }

    /// "Subscribe Now": mounts the identity provider's sign-in surface.
    pub fn activate_subscribe(&mut self) -> Result<(), WidgetError> {
        if self.is_subscribed() {
            return Err(WidgetError::NotAvailable("already subscribed"));
        }
        match &mut self.acquisition {
            CredentialAcquisition::IdentityProvider(flow) => {
                flow.request();
                Ok(())
            }
            CredentialAcquisition::Email(_) => Err(WidgetError::NotAvailable("no subscribe button on the email form")),
        }
    }

    pub fn edit_email(&mut self, value: impl Into<String>) -> Result<(), WidgetError> {
        match &mut self.acquisition {
            CredentialAcquisition::Email(form) if self.subscriber.is_none() => {
                form.edit(value);
                Ok(())
            }
            CredentialAcquisition::Email(_) => Err(WidgetError::NotAvailable("already subscribed")),
            CredentialAcquisition::IdentityProvider(_) => Err(WidgetError::NotAvailable("no email field")),
        }
    }

    /// Submits the draft email. Invalid drafts are refused with an error toast
    /// and never reach the backend; the draft is only cleared on success.
    #[tracing::instrument(name = "Submitting email subscription", skip(self))]
    pub async fn submit_email(&mut self) -> Result<Subscription, WidgetError> {
        if self.is_subscribed() {
            return Err(WidgetError::NotAvailable("already subscribed"));
        }
        let identity = match &self.acquisition {
            CredentialAcquisition::Email(form) => form.identity(),
            CredentialAcquisition::IdentityProvider(_) => return Err(WidgetError::NotAvailable("no email field")),
        };
        let identity = identity.map_err(|e| self.report(e))?;
        let subscription = self.submit(identity).await?;
        if let CredentialAcquisition::Email(form) = &mut self.acquisition {
            form.reset();
        }
        Ok(subscription)
    }

    /// Feeds the identity surface callback into the widget and, when it
    /// carries a credential, exchanges it with the backend.
    #[tracing::instrument(name = "Receiving identity provider credential", skip(self, credential))]
    pub async fn receive_credential(&mut self, credential: Option<String>) -> Result<Subscription, WidgetError> {
        let flow = match &mut self.acquisition {
            CredentialAcquisition::IdentityProvider(flow) if flow.state() == SignInState::Requested => flow,
            _ => return Err(WidgetError::NotAvailable("sign-in surface is not mounted")),
        };
        let token = flow.complete(credential).map_err(|e| self.report(e))?;

        let outcome = self.submit(Identity::BearerToken(token)).await;
        if let CredentialAcquisition::IdentityProvider(flow) = &mut self.acquisition {
            match &outcome {
                Ok(_) => flow.hide(),
                Err(WidgetError::Detached) => {}
                Err(_) => flow.retry(),
            }
        }
        outcome
    }

    pub fn logout(&mut self) {
        if let Some(record) = self.subscriber.take() {
            tracing::info!(email = %record.email(), "Logging out");
        }
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear session storage: {:?}", e);
        }
        match &mut self.acquisition {
            CredentialAcquisition::IdentityProvider(flow) => flow.hide(),
            CredentialAcquisition::Email(form) => form.reset(),
        }
        self.notifications.show("Logged out", Severity::Info);
    }

    async fn submit(&mut self, identity: Identity) -> Result<Subscription, WidgetError> {
        let liveness = self.liveness.clone();
        let outcome = self.client.submit(&identity).await;
        if !liveness.is_alive() {
            tracing::warn!("Discarding subscription response for a torn-down widget");
            return Err(WidgetError::Detached);
        }

        let subscription = outcome.map_err(|e| self.report(e.into()))?;
        if let Err(e) = self.store.save(&subscription.record) {
            tracing::error!("Failed to persist subscriber: {:?}", e);
        }
        self.notifications.show(success_message(&subscription), Severity::Success);
        self.subscriber = Some(subscription.record.clone());
        Ok(subscription)
    }

    fn report(&mut self, error: WidgetError) -> WidgetError {
        if error.is_surfaced() {
            tracing::error!("Subscription attempt failed: {:?}", error);
            self.notifications.show(error.to_string(), Severity::Error);
        }
        error
    }
}

fn success_message(subscription: &Subscription) -> String {
    match (&subscription.record, subscription.existing) {
        (SubscriberRecord::Profile { name, .. }, true) => format!("Welcome back, {}. Already subscribed.", name),
        (SubscriberRecord::Profile { name, .. }, false) => format!("Welcome {}. Subscription saved.", name),
        (SubscriberRecord::Email { email }, true) => format!("{} is already subscribed.", email),
        (SubscriberRecord::Email { email }, false) => {
            format!("{}: {}", subscription.message.as_deref().unwrap_or("Subscribed"), email)
        }
    }
}
