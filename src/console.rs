use crate::credentials::{IdentitySurface, SurfaceOptions};
use crate::widget::{Controls, WidgetView};

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Subscribe,
    Email(String),
    Submit,
    Credential(Option<String>),
    Logout,
    Dismiss,
    Status,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        match verb.to_lowercase().as_str() {
            "subscribe" => Ok(Self::Subscribe),
            // The field is bound verbatim, spaces included, so validation sees what was typed.
            "email" => Ok(Self::Email(rest.to_string())),
            "submit" => Ok(Self::Submit),
            "credential" => Ok(Self::Credential(Some(rest.to_string()).filter(|c| !c.is_empty()))),
            "logout" => Ok(Self::Logout),
            "dismiss" => Ok(Self::Dismiss),
            "status" | "" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command `{}`. Type `help` for the list of commands.", other)),
        }
    }
}

pub const HELP: &str = "\
Commands:
  subscribe            open the sign-in surface
  credential [token]   hand the sign-in result to the widget
  email <address>      edit the email field
  submit               submit the email field
  logout               forget the current subscriber
  dismiss              hide the current notification
  status               show the widget
  quit                 leave";

pub fn render(view: &WidgetView) -> String {
    let mut out = String::new();
    if let Some(notification) = &view.notification {
        out.push_str(&format!("[{}] {}\n", notification.severity.as_str(), notification.text));
    }
    match &view.controls {
        Controls::Subscribed => {
            if let Some(subscriber) = &view.subscriber {
                out.push_str(&format!("{} <{}>\n", subscriber.display_name(), subscriber.email()));
            }
            out.push_str("Already subscribed.  (logout)\n");
        }
        Controls::SubscribeButton => {
            out.push_str("(subscribe) Subscribe Now\n");
        }
        Controls::SignInSurface => {
            out.push_str("Waiting for sign-in.  (credential <token>)\n");
        }
        Controls::EmailForm { draft, is_valid } => {
            let marker = if draft.is_empty() || *is_valid { "" } else { "  (invalid)" };
            out.push_str(&format!("Email: [{}]{}  (submit)\n", draft, marker));
        }
    }
    out
}

/// Prints where to sign in; the token is pasted back with `credential`.
pub struct TerminalSurface;

impl IdentitySurface for TerminalSurface {
    fn mount(&mut self, options: &SurfaceOptions) {
        println!(
            "Sign in with the identity provider (client id {}, {:?} mode), then run `credential <id_token>`.",
            options.client_id, options.display_mode
        );
    }
}
