use pos_server::core::{Config, ServerState, server};
use pos_server::utils::logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = Config::from_env();

    let log_level = if config.is_development() { "debug" } else { "info" };
    logger::init_logger_with_file(Some(log_level), Some(&config.work_dir));

    tracing::info!(
        port = config.http_port,
        timezone = %config.timezone,
        environment = %config.environment,
        "starting pos-server"
    );

    let state = ServerState::initialize(config)?;
    server::run(state).await
}
