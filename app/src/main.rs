mod config;
mod error;
mod logging;
mod models;
mod observer;
mod rest;

use config::CONFIG;
use greenhouse_core::WateringPolicy;
use models::{MemoryPlantStore, PgPlantStore, PlantStore};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing();

    let store = match build_store().await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed preparing the plant store: {}", e);
            return Err(e.into());
        }
    };

    let policy = WateringPolicy::new(CONFIG.max_soil_temperature());
    info!(
        max_soil_temperature = policy.max_soil_temperature(),
        "Loaded watering policy"
    );
    let observer = observer::ConcurrentObserver::new(store, policy, CONFIG.request_timeout());

    rest::dispatch_server(observer, CONFIG.server_port()).await?;
    Ok(())
}

async fn build_store() -> Result<Arc<dyn PlantStore>, error::DBError> {
    match CONFIG.database_url() {
        Some(url) => {
            let conn = models::establish_db_connection(&url).await?;
            models::migrate(&conn).await?;
            info!("Connected to database");
            Ok(Arc::new(PgPlantStore::new(conn)))
        }
        None => {
            warn!("DATABASE_URL not set, plants are kept in memory only");
            Ok(Arc::new(MemoryPlantStore::new()))
        }
    }
}
