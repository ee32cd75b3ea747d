use dotenv::dotenv;
use log::info;

use watchdog::compliance::ComplianceConfig;
use watchdog::server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    let compliance = ComplianceConfig::from_env();

    info!("설정 로드 완료: {}:{} ({})", config.host, config.port, config.database_url);

    start_server(config, compliance).await
}
