use anyhow::Result;
use taskdesk_core::Config;
use taskdesk_web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Logging first so config warnings are visible
    taskdesk_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    let state = AppState::from_config(config)?;

    tracing::info!("Taskdesk starting");
    taskdesk_web::serve(state).await
}
