use stock_dash::app::DashboardApp;
use stock_dash::config::Config;
use stock_dash::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::builtin();
    let mut app = DashboardApp::new(config)?;
    app.run().await
}
