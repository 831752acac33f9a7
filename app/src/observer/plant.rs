use super::ConcurrentObserver;
use crate::error::{ApiError, ObserverError};
use crate::models::PlantDao;
use std::sync::Arc;
use tracing::{debug, info};

/// A plant as submitted through a form or the api, already validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlant {
    pub name: String,
    pub watered_soil_moisture: i32,
    pub pos_x: i32,
    pub pos_y: i32,
}

pub struct PlantObserver {
    inner: Arc<ConcurrentObserver>,
}

impl Clone for PlantObserver {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl PlantObserver {
    pub fn new(inner: Arc<ConcurrentObserver>) -> Self {
        PlantObserver { inner }
    }

    /// Adds a plant, names have to be unique
    #[tracing::instrument(skip(self))]
    pub async fn add(&self, plant: NewPlant) -> Result<PlantDao, ObserverError> {
        let store = &self.inner.store;
        let created = self
            .inner
            .timed(async {
                let _guard = self.inner.create_lock.lock().await;
                match store.threshold_by_name(&plant.name).await {
                    Ok(_) => Err(ApiError::DuplicatePlant(plant.name.clone()).into()),
                    Err(e) if e.is_not_found() => store
                        .create(
                            &plant.name,
                            plant.watered_soil_moisture,
                            plant.pos_x,
                            plant.pos_y,
                        )
                        .await
                        .map_err(ObserverError::from),
                    Err(e) => Err(ObserverError::from(e)),
                }
            })
            .await?;

        info!(plant_id = created.id(), "Added plant");
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_threshold(
        &self,
        name: &str,
        watered_soil_moisture: i32,
    ) -> Result<(), ObserverError> {
        let store = &self.inner.store;
        self.inner
            .timed(async {
                store
                    .update_threshold(name, watered_soil_moisture)
                    .await
                    .map_err(ObserverError::from)
            })
            .await?;

        info!(watered_soil_moisture, "Updated plant threshold");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, name: &str) -> Result<u64, ObserverError> {
        let store = &self.inner.store;
        let removed = self
            .inner
            .timed(async { store.delete(name).await.map_err(ObserverError::from) })
            .await?;

        info!(removed, "Removed plant");
        Ok(removed)
    }

    pub async fn plant(&self, plant_id: i32) -> Result<PlantDao, ObserverError> {
        let store = &self.inner.store;
        self.inner
            .timed(async { store.get(plant_id).await.map_err(ObserverError::from) })
            .await
    }

    pub async fn plants(&self) -> Result<Vec<PlantDao>, ObserverError> {
        let store = &self.inner.store;
        let plants = self
            .inner
            .timed(async { store.read().await.map_err(ObserverError::from) })
            .await?;
        debug!(count = plants.len(), "Fetched plants");
        Ok(plants)
    }

    pub async fn names(&self) -> Result<Vec<String>, ObserverError> {
        let store = &self.inner.store;
        self.inner
            .timed(async { store.names().await.map_err(ObserverError::from) })
            .await
    }

    pub async fn thresholds(&self) -> Result<Vec<String>, ObserverError> {
        let store = &self.inner.store;
        self.inner
            .timed(async { store.thresholds().await.map_err(ObserverError::from) })
            .await
    }
}
