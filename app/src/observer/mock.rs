use crate::error::DBError;
use crate::models::{MemoryPlantStore, PlantDao, PlantStore};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory store that can break single lookups or stall
#[derive(Default)]
pub struct FlakyStore {
    pub plants: MemoryPlantStore,
    pub failing_ids: Vec<i32>,
    pub delay: Option<Duration>,
    pub lookups: AtomicUsize,
    /// Yields before name lookups and inserts, like a database round trip
    pub round_trips: bool,
}

impl FlakyStore {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    async fn round_trip(&self) {
        if self.round_trips {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl PlantStore for FlakyStore {
    async fn create(
        &self,
        name: &str,
        watered_soil_moisture: i32,
        pos_x: i32,
        pos_y: i32,
    ) -> Result<PlantDao, DBError> {
        self.round_trip().await;
        self.plants
            .create(name, watered_soil_moisture, pos_x, pos_y)
            .await
    }

    async fn update_threshold(
        &self,
        name: &str,
        watered_soil_moisture: i32,
    ) -> Result<(), DBError> {
        self.plants
            .update_threshold(name, watered_soil_moisture)
            .await
    }

    async fn threshold_by_name(&self, name: &str) -> Result<i32, DBError> {
        self.round_trip().await;
        self.plants.threshold_by_name(name).await
    }

    async fn threshold_by_id(&self, plant_id: i32) -> Result<i32, DBError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing_ids.contains(&plant_id) {
            return Err(DBError::SQLError(sqlx::Error::PoolTimedOut));
        }
        self.plants.threshold_by_id(plant_id).await
    }

    async fn name_by_id(&self, plant_id: i32) -> Result<String, DBError> {
        self.plants.name_by_id(plant_id).await
    }

    async fn id_by_threshold(&self, watered_soil_moisture: i32) -> Result<i32, DBError> {
        self.plants.id_by_threshold(watered_soil_moisture).await
    }

    async fn position_x_by_id(&self, plant_id: i32) -> Result<i32, DBError> {
        self.plants.position_x_by_id(plant_id).await
    }

    async fn position_y_by_id(&self, plant_id: i32) -> Result<i32, DBError> {
        self.plants.position_y_by_id(plant_id).await
    }

    async fn get(&self, plant_id: i32) -> Result<PlantDao, DBError> {
        self.plants.get(plant_id).await
    }

    async fn read(&self) -> Result<Vec<PlantDao>, DBError> {
        self.plants.read().await
    }

    async fn names(&self) -> Result<Vec<String>, DBError> {
        self.plants.names().await
    }

    async fn thresholds(&self) -> Result<Vec<String>, DBError> {
        self.plants.thresholds().await
    }

    async fn ids(&self) -> Result<Vec<i32>, DBError> {
        self.plants.ids().await
    }

    async fn count(&self) -> Result<i64, DBError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.plants.count().await
    }

    async fn delete(&self, name: &str) -> Result<u64, DBError> {
        self.plants.delete(name).await
    }

    async fn check_schema(&self) -> Result<(), DBError> {
        self.plants.check_schema().await
    }
}
