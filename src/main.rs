use subscribe_widget::configuration::get_configuration;
use subscribe_widget::console::TerminalSurface;
use subscribe_widget::startup::Application;
use subscribe_widget::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let subscriber = get_subscriber("subscribe-widget".into(), "info".into(), std::io::stderr);
    init_subscriber(subscriber)?;

    let configuration = get_configuration()?;
    let application = Application::build(configuration, Box::new(TerminalSurface))?;
    application.run_until_stopped().await
}
