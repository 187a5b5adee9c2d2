use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{info, spotify, types::PkceToken};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    info!("Authorize sporlcover to change your playlist covers.");
    spotify::auth::auth(shared_state).await;
}
