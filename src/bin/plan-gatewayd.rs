use clap::Parser;
use plan_gateway::config::Config;
use plan_gateway::daemon;
use plan_gateway::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    plan_gateway::logging::init_tracing("plan_gatewayd");
    let config = Config::parse();

    daemon::run(config).await
}
