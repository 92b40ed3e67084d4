use airindex::{api, config, model, state};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

fn init_tracing() {
    let subscriber = tracing_subscriber::fmt().with_target(false).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        "airindex starting"
    );
    let config = config::load_default()?;

    // A service without a predictor must not begin serving.
    let Some(model_path) = config.model_path() else {
        tracing::error!("No model path configured in [model].path");
        return Err("model path is required".into());
    };
    let predictor = match model::load_model_from_path(model_path) {
        Ok(predictor) => {
            tracing::info!(
                path = %model_path.display(),
                name = predictor.name(),
                "Prediction model loaded"
            );
            predictor
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to load prediction model");
            return Err(err.into());
        }
    };

    let state = Arc::new(RwLock::new(state::AppState::new()));
    if let Ok(mut guard) = state.write() {
        guard.set_predictor(Arc::from(predictor));
    } else {
        tracing::warn!("State lock poisoned while applying model");
    }

    let app = api::router(Arc::clone(&state));
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
