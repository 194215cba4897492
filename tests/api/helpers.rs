use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;
use serde_json::Value;
use subscribe_widget::credentials::{CredentialAcquisition, IdentitySurface, SurfaceOptions};
use subscribe_widget::notifications::NotificationManager;
use subscribe_widget::session_store::{InMemorySessionStore, SESSION_KEY};
use subscribe_widget::subscription_client::SubscriptionClient;
use subscribe_widget::telemetry::{get_subscriber, init_subscriber};
use subscribe_widget::widget::SubscriptionWidget;
use wiremock::MockServer;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_layer = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok_and(|x| x.to_lowercase() == "true") {
        let subscriber = get_subscriber(subscriber_name, default_filter_layer, std::io::stdout);
        init_subscriber(subscriber).expect("Failed to initialise tracing");
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_layer, std::io::sink);
        init_subscriber(subscriber).expect("Failed to initialise tracing");
    }
});

pub const CLIENT_ID: &str = "test-client.apps.example.com";

/// Identity surface that records every mount for later inspection.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    pub mounts: Arc<Mutex<Vec<SurfaceOptions>>>,
}

impl IdentitySurface for RecordingSurface {
    fn mount(&mut self, options: &SurfaceOptions) {
        self.mounts.lock().unwrap().push(options.clone());
    }
}

pub struct TestApp {
    pub widget: SubscriptionWidget<InMemorySessionStore>,
    pub store: InMemorySessionStore,
    pub backend: MockServer,
    pub surface: RecordingSurface,
}

pub enum Variant {
    Email,
    IdentityProvider,
}

pub async fn spawn_app(variant: Variant) -> TestApp {
    spawn_app_with_store(variant, InMemorySessionStore::new()).await
}

pub async fn spawn_app_with_store(variant: Variant, store: InMemorySessionStore) -> TestApp {
    Lazy::force(&TRACING);

    let backend = MockServer::start().await;
    let surface = RecordingSurface::default();
    let widget = build_widget(&variant, store.clone(), backend.uri(), surface.clone());

    TestApp { widget, store, backend, surface }
}

fn build_widget(
    variant: &Variant,
    store: InMemorySessionStore,
    backend_url: String,
    surface: RecordingSurface,
) -> SubscriptionWidget<InMemorySessionStore> {
    let acquisition = match variant {
        Variant::Email => CredentialAcquisition::email(),
        Variant::IdentityProvider => CredentialAcquisition::identity_provider(CLIENT_ID.into(), Box::new(surface)),
    };
    let client = SubscriptionClient::new(backend_url).expect("Failed to build subscription client");
    SubscriptionWidget::new(acquisition, store, client, NotificationManager::default())
}

impl TestApp {
    /// A fresh widget over the same storage and backend, as after a page reload.
    pub fn reload(&self, variant: Variant) -> SubscriptionWidget<InMemorySessionStore> {
        build_widget(&variant, self.store.clone(), self.backend.uri(), self.surface.clone())
    }

    pub fn persisted(&self) -> Option<Value> {
        self.store.get_item(SESSION_KEY)
    }

    pub async fn received_request_count(&self) -> usize {
        self.backend.received_requests().await.map(|r| r.len()).unwrap_or(0)
    }
}

pub fn unreachable_backend_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind address");
    let port = listener.local_addr().unwrap().port();
    format!("http://127.0.0.1:{}", port)
}

pub fn widget_against(url: String, store: InMemorySessionStore) -> SubscriptionWidget<InMemorySessionStore> {
    Lazy::force(&TRACING);
    build_widget(&Variant::Email, store, url, RecordingSurface::default())
}
