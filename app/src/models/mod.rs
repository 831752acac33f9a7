use crate::config::CONFIG;
use crate::error::DBError;
use async_trait::async_trait;

// Statements are bound at runtime, so building never needs a live database
macro_rules! sql_stmnt {
    ($ret:ident, $stmt:expr) => {
        sqlx::query_as::<_, $ret>($stmt)
    };
    ($stmt:expr) => {
        sqlx::query($stmt)
    };
    ($ret:ident, $stmt:expr, $($bind:expr),*) => {
        sqlx::query_as::<_, $ret>($stmt)$(.bind($bind))*
    };
    ($stmt:expr, $($bind:expr),*) => {
        sqlx::query($stmt)$(.bind($bind))*
    };
}

pub async fn establish_db_connection(database_url: &str) -> Result<sqlx::PgPool, DBError> {
    Ok(sqlx::postgres::PgPoolOptions::new()
        .max_connections(CONFIG.db_max_connections())
        .acquire_timeout(CONFIG.request_timeout())
        .connect(database_url)
        .await?)
}

pub async fn migrate(conn: &sqlx::PgPool) -> Result<(), DBError> {
    sqlx::migrate!("./migrations").run(conn).await?;
    Ok(())
}

pub async fn check_schema(conn: &sqlx::PgPool) -> Result<(), DBError> {
    sql_stmnt!(CountRecord, "SELECT count(*) as count FROM plants_data")
        .fetch_one(conn)
        .await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
pub(crate) struct CountRecord {
    pub count: Option<i64>,
}

impl CountRecord {
    pub fn count(self) -> i64 {
        self.count.unwrap_or(0)
    }
}

/// Persisted plant records.
///
/// Name keyed writes are multi-row aware: an update that would touch
/// more than one plant is rejected, a delete removes every match.
/// Single-row lookups resolve duplicates to the lowest plant id.
#[async_trait]
pub trait PlantStore: Send + Sync {
    async fn create(
        &self,
        name: &str,
        watered_soil_moisture: i32,
        pos_x: i32,
        pos_y: i32,
    ) -> Result<PlantDao, DBError>;

    async fn update_threshold(&self, name: &str, watered_soil_moisture: i32)
        -> Result<(), DBError>;

    async fn threshold_by_name(&self, name: &str) -> Result<i32, DBError>;

    async fn threshold_by_id(&self, plant_id: i32) -> Result<i32, DBError>;

    async fn name_by_id(&self, plant_id: i32) -> Result<String, DBError>;

    async fn id_by_threshold(&self, watered_soil_moisture: i32) -> Result<i32, DBError>;

    async fn position_x_by_id(&self, plant_id: i32) -> Result<i32, DBError>;

    async fn position_y_by_id(&self, plant_id: i32) -> Result<i32, DBError>;

    async fn get(&self, plant_id: i32) -> Result<PlantDao, DBError>;

    /// All plants ordered by id
    async fn read(&self) -> Result<Vec<PlantDao>, DBError>;

    async fn names(&self) -> Result<Vec<String>, DBError>;

    async fn thresholds(&self) -> Result<Vec<String>, DBError>;

    async fn ids(&self) -> Result<Vec<i32>, DBError>;

    async fn count(&self) -> Result<i64, DBError>;

    /// Returns how many plants were removed
    async fn delete(&self, name: &str) -> Result<u64, DBError>;

    async fn check_schema(&self) -> Result<(), DBError>;
}

pub mod memory;
pub mod plant;

pub use memory::MemoryPlantStore;
pub use plant::{PgPlantStore, PlantDao};

#[cfg(test)]
mod test;
