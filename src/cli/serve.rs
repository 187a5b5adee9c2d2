use std::sync::Arc;

use crate::{api::AppState, error, info, server};

pub async fn serve() {
    let state = match AppState::from_env() {
        Ok(state) => state,
        Err(e) => error!("Cannot start backend. Err: {}", e),
    };

    info!("Upload ladder: {} KB", state.uploader.policy().ladder);
    if let Some(audit) = &state.audit {
        info!("Audit log at {}", audit.root().display());
    }

    server::start_api_server(Arc::new(state)).await;
}
