use secrecy::SecretString;
use crate::domain::{DraftEmail, Identity};
use crate::error::WidgetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Popup,
}

/// How the third-party sign-in surface is initialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceOptions {
    pub client_id: String,
    pub display_mode: DisplayMode,
}

/// The identity provider's sign-in surface. The host mounts it when asked
/// and later feeds its single callback into
/// [`SubscriptionWidget::receive_credential`](crate::widget::SubscriptionWidget::receive_credential).
pub trait IdentitySurface: Send {
    fn mount(&mut self, options: &SurfaceOptions);

    fn unmount(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInState {
    Hidden,
    Requested,
    Succeeded,
    Failed,
}

pub struct SignInFlow {
    state: SignInState,
    options: SurfaceOptions,
    surface: Box<dyn IdentitySurface>,
}

impl SignInFlow {
    pub fn new(client_id: String, surface: Box<dyn IdentitySurface>) -> Self {
        Self {
            state: SignInState::Hidden,
            options: SurfaceOptions {
                client_id,
                display_mode: DisplayMode::Popup,
            },
            surface,
        }
    }

    pub fn state(&self) -> SignInState {
        self.state
    }

    /// Mounts the surface. Calling it again while `Requested` re-mounts.
    pub fn request(&mut self) {
        tracing::debug!(previous = ?self.state, "Mounting identity surface");
        self.surface.mount(&self.options);
        self.state = SignInState::Requested;
    }

    /// Consumes the surface callback. A missing or empty credential fails
    /// the attempt and hides the surface again.
    pub fn complete(&mut self, credential: Option<String>) -> Result<SecretString, WidgetError> {
        match credential.filter(|c| !c.is_empty()) {
            Some(credential) => {
                self.state = SignInState::Succeeded;
                Ok(SecretString::from(credential))
            }
            None => {
                self.state = SignInState::Failed;
                tracing::warn!("Identity surface returned no credential");
                self.hide();
                Err(WidgetError::CredentialMissing)
            }
        }
    }

    /// The backend did not accept the credential; keep the surface up for another try.
    pub fn retry(&mut self) {
        self.state = SignInState::Requested;
    }

    pub fn hide(&mut self) {
        if self.state != SignInState::Hidden {
            self.surface.unmount();
        }
        self.state = SignInState::Hidden;
    }
}

#[derive(Debug, Default)]
pub struct EmailForm {
    draft: DraftEmail,
}

impl EmailForm {
    pub fn draft(&self) -> &DraftEmail {
        &self.draft
    }

    pub fn edit(&mut self, value: impl Into<String>) {
        self.draft.edit(value);
    }

    pub fn reset(&mut self) {
        self.draft.clear();
    }

    /// Refuses invalid drafts before anything touches the network.
    pub fn identity(&self) -> Result<Identity, WidgetError> {
        self.draft
            .to_subscriber_email()
            .map(Identity::Email)
            .map_err(WidgetError::Validation)
    }
}

/// The two ways the widget can obtain a subscriber identity.
pub enum CredentialAcquisition {
    IdentityProvider(SignInFlow),
    Email(EmailForm),
}

impl CredentialAcquisition {
    pub fn identity_provider(client_id: String, surface: Box<dyn IdentitySurface>) -> Self {
        Self::IdentityProvider(SignInFlow::new(client_id, surface))
    }

    pub fn email() -> Self {
        Self::Email(EmailForm::default())
    }
}
