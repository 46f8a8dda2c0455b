use sunrise_press::app::{self, AppState};
use sunrise_press::{Error, Server, Settings, telemetry};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init_tracing();

    let settings = Settings::from_env().inspect_err(|e| error!("{e}"))?;
    info!(
        addr = %settings.addr,
        store = ?settings.store,
        data_dir = %settings.data_dir.display(),
        store_timeout_ms = settings.store_timeout.as_millis() as u64,
        body_limit = settings.body_limit,
        "configuration loaded"
    );

    let state = AppState::from_settings(&settings).inspect_err(|e| error!("startup failed: {e}"))?;

    Server::bind(settings.addr)
        .serve(app::router(state).body_limit(settings.body_limit))
        .await
}
