use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use crate::configuration::{CredentialConfig, Settings};
use crate::console::{render, Command, HELP};
use crate::credentials::{CredentialAcquisition, IdentitySurface};
use crate::notifications::NotificationManager;
use crate::session_store::{FileSessionStore, SessionStore};
use crate::subscription_client::SubscriptionClient;
use crate::widget::SubscriptionWidget;

/// Wires settings into a ready widget. `surface` is only mounted when the
/// identity provider strategy is configured.
pub fn build_widget<S: SessionStore>(
    configuration: &Settings,
    store: S,
    surface: Box<dyn IdentitySurface>,
) -> anyhow::Result<SubscriptionWidget<S>> {
    let acquisition = match configuration.widget.credential_config()? {
        CredentialConfig::IdentityProvider { client_id } => CredentialAcquisition::identity_provider(client_id, surface),
        CredentialConfig::Email => CredentialAcquisition::email(),
    };
    let client = SubscriptionClient::new(configuration.widget.backend_url.clone())
        .context("Failed to build the HTTP client")?;
    let notifications = NotificationManager::new(configuration.notifications.dismiss_after());

    tracing::info!(
        backend_url = %client.base_url(),
        strategy = ?configuration.widget.strategy,
        "Subscription widget ready"
    );
    Ok(SubscriptionWidget::new(acquisition, store, client, notifications))
}

pub struct Application {
    widget: SubscriptionWidget<FileSessionStore>,
}

impl Application {
    pub fn build(configuration: Settings, surface: Box<dyn IdentitySurface>) -> anyhow::Result<Application> {
        let store = FileSessionStore::new(configuration.session.path.clone());
        let widget = build_widget(&configuration, store, surface)?;
        Ok(Self { widget })
    }

    /// Reads commands from stdin until `quit` or end of input.
    pub async fn run_until_stopped(mut self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        print!("{}", render(&self.widget.view()));

        while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(message) => {
                    println!("{}", message);
                    continue;
                }
            };
            if !self.handle(command).await {
                break;
            }
            print!("{}", render(&self.widget.view()));
        }
        self.widget.liveness().tear_down();
        Ok(())
    }

    async fn handle(&mut self, command: Command) -> bool {
        let outcome = match command {
            Command::Subscribe => self.widget.activate_subscribe(),
            Command::Email(value) => self.widget.edit_email(value),
            Command::Submit => self.widget.submit_email().await.map(|_| ()),
            Command::Credential(credential) => self.widget.receive_credential(credential).await.map(|_| ()),
            Command::Logout => {
                self.widget.logout();
                Ok(())
            }
            Command::Dismiss => {
                self.widget.dismiss_notification();
                Ok(())
            }
            Command::Status => Ok(()),
            Command::Help => {
                println!("{}", HELP);
                Ok(())
            }
            Command::Quit => return false,
        };
        // Surfaced errors are already in the notification slot.
        if let Err(e) = outcome {
            if !e.is_surfaced() {
                println!("Not available: {}", e);
            }
        }
        true
    }
}
