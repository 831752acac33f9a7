use crate::error::{ApiError, ObserverError};
use crate::models::PlantStore;
use greenhouse_core::{Evaluation, ReceivedReading, WateringPolicy};
use serde::Serialize;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::error;
use utoipa::ToSchema;

pub mod plant;
pub mod watering;

#[cfg(test)]
mod mock;

pub use plant::PlantObserver;
pub use watering::WateringObserver;

/// What the data logger sent last and how it was judged
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatestStatus {
    pub reading: ReceivedReading,
    pub evaluation: Option<Evaluation>,
}

pub struct ConcurrentObserver {
    pub(crate) store: Arc<dyn PlantStore>,
    pub(crate) policy: WateringPolicy,
    request_timeout: Duration,
    latest: RwLock<Option<LatestStatus>>,
    // serializes the duplicate check with the insert
    pub(crate) create_lock: Mutex<()>,
}

impl Debug for ConcurrentObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentObserver")
            .field("policy", &self.policy)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ConcurrentObserver {
    pub fn new(
        store: Arc<dyn PlantStore>,
        policy: WateringPolicy,
        request_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(ConcurrentObserver {
            store,
            policy,
            request_timeout,
            latest: RwLock::new(None),
            create_lock: Mutex::new(()),
        })
    }

    /// Runs a request against the store, bounded by the request timeout
    pub(crate) async fn timed<T, F>(&self, request: F) -> Result<T, ObserverError>
    where
        F: Future<Output = Result<T, ObserverError>>,
    {
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(resp) => resp,
            Err(_) => Err(ApiError::Timeout(self.request_timeout.as_millis()).into()),
        }
    }

    /// Keeps the newest reading, a slower evaluation of an older one
    /// never replaces it
    pub(crate) async fn set_latest(&self, status: LatestStatus) {
        let mut latest = self.latest.write().await;
        let is_newer = match latest.as_ref() {
            Some(current) => status.reading.received_at >= current.reading.received_at,
            None => true,
        };
        if is_newer {
            *latest = Some(status);
        }
    }

    pub async fn latest(&self) -> Option<LatestStatus> {
        self.latest.read().await.clone()
    }

    pub async fn check_db(&self) -> String {
        let check = async { self.store.check_schema().await.map_err(ObserverError::from) };
        match self.timed(check).await {
            Ok(()) => "healthy".to_owned(),
            Err(e) => {
                error!("Database check failed: {}", e);
                format!("{}", e)
            }
        }
    }

    pub async fn plant_count(&self) -> Option<i64> {
        self.timed(async { self.store.count().await.map_err(ObserverError::from) })
            .await
            .ok()
    }
}
