pub mod configuration;
pub mod console;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod notifications;
pub mod session_store;
pub mod startup;
pub mod subscription_client;
pub mod telemetry;
pub mod widget;
