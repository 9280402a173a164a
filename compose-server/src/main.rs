use anyhow::Result;
use compose_server::{config, utils::logger, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init("info,tower_http=debug");

    let config = config::load();
    let addr = ServerConfig::from_snapshot(&config.snapshot())?.addr();

    let ax = compose_server::build(&config).await?;
    ax.listen(addr).await?;

    Ok(())
}
