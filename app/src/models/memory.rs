use super::{PlantDao, PlantStore};
use crate::error::{DBError, PlantKey};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Keeps plants in process memory.
///
/// Mirrors the table semantics: ids count up from 1 and are never
/// reused, listings come back in id order.
pub struct MemoryPlantStore {
    inner: Mutex<InnerStore>,
}

struct InnerStore {
    last_id: i32,
    plants: Vec<PlantDao>,
}

impl Default for MemoryPlantStore {
    fn default() -> Self {
        MemoryPlantStore::new()
    }
}

impl MemoryPlantStore {
    pub fn new() -> Self {
        MemoryPlantStore {
            inner: Mutex::new(InnerStore {
                last_id: 0,
                plants: Vec::new(),
            }),
        }
    }

    fn find<T>(&self, key: PlantKey, map: impl Fn(&PlantDao) -> T) -> Result<T, DBError> {
        let inner = self.inner.lock();
        let found = inner.plants.iter().find(|p| match &key {
            PlantKey::Id(id) => p.plant_id == *id,
            PlantKey::Name(name) => &p.name == name,
            PlantKey::Threshold(threshold) => p.watered_soil_moisture == *threshold,
        });
        match found {
            Some(plant) => Ok(map(plant)),
            None => Err(DBError::PlantNotFound(key)),
        }
    }

    fn column<T>(&self, map: impl Fn(&PlantDao) -> T) -> Vec<T> {
        self.inner.lock().plants.iter().map(map).collect()
    }
}

#[async_trait]
impl PlantStore for MemoryPlantStore {
    async fn create(
        &self,
        name: &str,
        watered_soil_moisture: i32,
        pos_x: i32,
        pos_y: i32,
    ) -> Result<PlantDao, DBError> {
        let mut inner = self.inner.lock();
        inner.last_id += 1;
        let plant = PlantDao {
            plant_id: inner.last_id,
            name: name.to_owned(),
            watered_soil_moisture,
            pos_x,
            pos_y,
        };
        inner.plants.push(plant.clone());
        Ok(plant)
    }

    async fn update_threshold(
        &self,
        name: &str,
        watered_soil_moisture: i32,
    ) -> Result<(), DBError> {
        let mut inner = self.inner.lock();
        let matched = inner.plants.iter().filter(|p| p.name == name).count() as u64;
        match matched {
            0 => Err(DBError::PlantNotFound(PlantKey::Name(name.to_owned()))),
            1 => {
                for plant in inner.plants.iter_mut().filter(|p| p.name == name) {
                    plant.watered_soil_moisture = watered_soil_moisture;
                }
                Ok(())
            }
            _ => Err(DBError::AmbiguousMatch(name.to_owned(), matched)),
        }
    }

    async fn threshold_by_name(&self, name: &str) -> Result<i32, DBError> {
        self.find(PlantKey::Name(name.to_owned()), |p| p.watered_soil_moisture)
    }

    async fn threshold_by_id(&self, plant_id: i32) -> Result<i32, DBError> {
        self.find(PlantKey::Id(plant_id), |p| p.watered_soil_moisture)
    }

    async fn name_by_id(&self, plant_id: i32) -> Result<String, DBError> {
        self.find(PlantKey::Id(plant_id), |p| p.name.clone())
    }

    async fn id_by_threshold(&self, watered_soil_moisture: i32) -> Result<i32, DBError> {
        self.find(PlantKey::Threshold(watered_soil_moisture), |p| p.plant_id)
    }

    async fn position_x_by_id(&self, plant_id: i32) -> Result<i32, DBError> {
        self.find(PlantKey::Id(plant_id), |p| p.pos_x)
    }

    async fn position_y_by_id(&self, plant_id: i32) -> Result<i32, DBError> {
        self.find(PlantKey::Id(plant_id), |p| p.pos_y)
    }

    async fn get(&self, plant_id: i32) -> Result<PlantDao, DBError> {
        self.find(PlantKey::Id(plant_id), |p| p.clone())
    }

    async fn read(&self) -> Result<Vec<PlantDao>, DBError> {
        Ok(self.column(|p| p.clone()))
    }

    async fn names(&self) -> Result<Vec<String>, DBError> {
        Ok(self.column(|p| p.name.clone()))
    }

    async fn thresholds(&self) -> Result<Vec<String>, DBError> {
        Ok(self.column(|p| p.watered_soil_moisture.to_string()))
    }

    async fn ids(&self) -> Result<Vec<i32>, DBError> {
        Ok(self.column(|p| p.plant_id))
    }

    async fn count(&self) -> Result<i64, DBError> {
        Ok(self.inner.lock().plants.len() as i64)
    }

    async fn delete(&self, name: &str) -> Result<u64, DBError> {
        let mut inner = self.inner.lock();
        let before = inner.plants.len();
        inner.plants.retain(|p| p.name != name);
        match (before - inner.plants.len()) as u64 {
            0 => Err(DBError::PlantNotFound(PlantKey::Name(name.to_owned()))),
            removed => Ok(removed),
        }
    }

    async fn check_schema(&self) -> Result<(), DBError> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_create_then_lookup() {
        let store = MemoryPlantStore::new();
        let basil = store.create("Basil", 40, 1, 2).await.unwrap();
        let mint = store.create("Mint", 55, 3, 4).await.unwrap();

        assert_eq!(1, basil.id());
        assert_eq!(2, mint.id());
        assert_eq!(40, store.threshold_by_name("Basil").await.unwrap());
        assert_eq!(55, store.threshold_by_id(2).await.unwrap());
        assert_eq!("Mint", store.name_by_id(2).await.unwrap());
        assert_eq!(1, store.id_by_threshold(40).await.unwrap());
        assert_eq!(3, store.position_x_by_id(2).await.unwrap());
        assert_eq!(4, store.position_y_by_id(2).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_threshold() {
        let store = MemoryPlantStore::new();
        store.create("Basil", 40, 0, 0).await.unwrap();

        store.update_threshold("Basil", 25).await.unwrap();
        assert_eq!(25, store.threshold_by_name("Basil").await.unwrap());

        let missing = store.update_threshold("Thyme", 25).await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_ambiguous_update_changes_nothing() {
        let store = MemoryPlantStore::new();
        store.create("Basil", 40, 0, 0).await.unwrap();
        store.create("Basil", 45, 0, 0).await.unwrap();

        let err = store.update_threshold("Basil", 10).await.unwrap_err();
        assert!(matches!(err, DBError::AmbiguousMatch(_, 2)));
        assert_eq!(vec!["40", "45"], store.thresholds().await.unwrap());
        // lowest id wins on lookups
        assert_eq!(40, store.threshold_by_name("Basil").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let store = MemoryPlantStore::new();
        for name in ["Basil", "Mint", "Sage"] {
            store.create(name, 40, 0, 0).await.unwrap();
        }
        assert_eq!(3, store.count().await.unwrap());

        assert_eq!(1, store.delete("Mint").await.unwrap());
        assert_eq!(2, store.count().await.unwrap());
        assert!(store
            .threshold_by_name("Mint")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store.delete("Mint").await.unwrap_err().is_not_found());

        // ids are never reused
        let chive = store.create("Chive", 30, 0, 0).await.unwrap();
        assert_eq!(4, chive.id());
        assert_eq!(vec![1, 3, 4], store.ids().await.unwrap());
        assert_eq!(
            vec!["Basil", "Sage", "Chive"],
            store.names().await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_delete_removes_every_match() {
        let store = MemoryPlantStore::new();
        store.create("Basil", 40, 0, 0).await.unwrap();
        store.create("Basil", 45, 0, 0).await.unwrap();

        assert_eq!(2, store.delete("Basil").await.unwrap());
        assert_eq!(0, store.count().await.unwrap());
    }

    #[tokio::test]
    async fn test_lookup_missing_id() {
        let store = MemoryPlantStore::new();
        let err = store.threshold_by_id(7).await.unwrap_err();
        assert!(matches!(err, DBError::PlantNotFound(PlantKey::Id(7))));
    }
}
