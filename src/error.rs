/// Why a single submission to the backend did not produce a subscriber.
#[derive(thiserror::Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected response from server: {0}")]
    Protocol(String),
    #[error("Error: {0}")]
    Rejected(String),
}

impl std::fmt::Debug for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Every way a widget action can fail. The `Display` text of the surfaced
/// variants is exactly what the user sees in the error toast.
#[derive(thiserror::Error)]
pub enum WidgetError {
    #[error("Please enter a valid email")]
    Validation(String),
    #[error("Google sign-in failed: id_token missing")]
    CredentialMissing,
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("{0}")]
    NotAvailable(&'static str),
    #[error("the widget was torn down before the response arrived")]
    Detached,
}

impl WidgetError {
    /// Whether the error is shown to the user as a toast.
    pub fn is_surfaced(&self) -> bool {
        !matches!(self, WidgetError::NotAvailable(_) | WidgetError::Detached)
    }
}

impl std::fmt::Debug for WidgetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

pub fn error_chain_fmt(e: &impl std::error::Error, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
