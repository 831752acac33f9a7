use super::{CountRecord, PlantStore};
use crate::error::{DBError, PlantKey};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlantDao {
    pub(crate) plant_id: i32,
    pub(crate) name: String,
    pub(crate) watered_soil_moisture: i32,
    pub(crate) pos_x: i32,
    pub(crate) pos_y: i32,
}

impl PlantDao {
    pub fn id(&self) -> i32 {
        self.plant_id
    }

    pub fn name(&self) -> &String {
        &self.name
    }

    pub fn watered_soil_moisture(&self) -> i32 {
        self.watered_soil_moisture
    }

    pub fn pos_x(&self) -> i32 {
        self.pos_x
    }

    pub fn pos_y(&self) -> i32 {
        self.pos_y
    }
}

pub async fn insert(
    conn: &sqlx::PgPool,
    name: &str,
    watered_soil_moisture: i32,
    pos_x: i32,
    pos_y: i32,
) -> Result<PlantDao, DBError> {
    Ok(sql_stmnt!(
        PlantDao,
        r#"INSERT INTO plants_data (name, watered_soil_moisture, pos_x, pos_y)
            VALUES ($1, $2, $3, $4) RETURNING *"#,
        name,
        watered_soil_moisture,
        pos_x,
        pos_y
    )
    .fetch_one(conn)
    .await?)
}

// UPDATE plants_data, rolled back unless exactly one row matched
pub async fn update_threshold(
    conn: &sqlx::PgPool,
    name: &str,
    watered_soil_moisture: i32,
) -> Result<(), DBError> {
    let mut tx = conn.begin().await?;
    let result = sql_stmnt!(
        "UPDATE plants_data SET watered_soil_moisture = $1 WHERE name = $2",
        watered_soil_moisture,
        name
    )
    .execute(&mut *tx)
    .await?;

    match result.rows_affected() {
        1 => {
            tx.commit().await?;
            Ok(())
        }
        0 => {
            tx.rollback().await?;
            Err(DBError::PlantNotFound(PlantKey::Name(name.to_owned())))
        }
        matched => {
            tx.rollback().await?;
            Err(DBError::AmbiguousMatch(name.to_owned(), matched))
        }
    }
}

/// READ plants_data
pub async fn read(conn: &sqlx::PgPool) -> Result<Vec<PlantDao>, DBError> {
    Ok(
        sql_stmnt!(PlantDao, "SELECT * FROM plants_data ORDER BY plant_id ASC")
            .fetch_all(conn)
            .await?,
    )
}

pub async fn get(conn: &sqlx::PgPool, plant_id: i32) -> Result<PlantDao, DBError> {
    sql_stmnt!(
        PlantDao,
        "SELECT * FROM plants_data WHERE plant_id = $1",
        plant_id
    )
    .fetch_optional(conn)
    .await?
    .ok_or(DBError::PlantNotFound(PlantKey::Id(plant_id)))
}

pub async fn get_by_name(conn: &sqlx::PgPool, name: &str) -> Result<PlantDao, DBError> {
    sql_stmnt!(
        PlantDao,
        "SELECT * FROM plants_data WHERE name = $1 ORDER BY plant_id ASC LIMIT 1",
        name
    )
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| DBError::PlantNotFound(PlantKey::Name(name.to_owned())))
}

pub async fn get_by_threshold(
    conn: &sqlx::PgPool,
    watered_soil_moisture: i32,
) -> Result<PlantDao, DBError> {
    sql_stmnt!(
        PlantDao,
        r#"SELECT * FROM plants_data WHERE watered_soil_moisture = $1
            ORDER BY plant_id ASC LIMIT 1"#,
        watered_soil_moisture
    )
    .fetch_optional(conn)
    .await?
    .ok_or(DBError::PlantNotFound(PlantKey::Threshold(
        watered_soil_moisture,
    )))
}

pub async fn ids(conn: &sqlx::PgPool) -> Result<Vec<i32>, DBError> {
    Ok(
        sqlx::query_scalar::<_, i32>("SELECT plant_id FROM plants_data ORDER BY plant_id ASC")
            .fetch_all(conn)
            .await?,
    )
}

pub async fn count(conn: &sqlx::PgPool) -> Result<i64, DBError> {
    let rows = sql_stmnt!(CountRecord, "SELECT count(*) as count FROM plants_data")
        .fetch_one(conn)
        .await?;
    Ok(rows.count())
}

/// DELETE plants_data
pub async fn delete(conn: &sqlx::PgPool, name: &str) -> Result<u64, DBError> {
    let result = sql_stmnt!("DELETE FROM plants_data WHERE name = $1", name)
        .execute(conn)
        .await?;
    match result.rows_affected() {
        0 => Err(DBError::PlantNotFound(PlantKey::Name(name.to_owned()))),
        removed => Ok(removed),
    }
}

#[derive(Clone)]
pub struct PgPlantStore {
    conn: sqlx::PgPool,
}

impl PgPlantStore {
    pub fn new(conn: sqlx::PgPool) -> Self {
        PgPlantStore { conn }
    }
}

#[async_trait]
impl PlantStore for PgPlantStore {
    async fn create(
        &self,
        name: &str,
        watered_soil_moisture: i32,
        pos_x: i32,
        pos_y: i32,
    ) -> Result<PlantDao, DBError> {
        insert(&self.conn, name, watered_soil_moisture, pos_x, pos_y).await
    }

    async fn update_threshold(
        &self,
        name: &str,
        watered_soil_moisture: i32,
    ) -> Result<(), DBError> {
        update_threshold(&self.conn, name, watered_soil_moisture).await
    }

    async fn threshold_by_name(&self, name: &str) -> Result<i32, DBError> {
        Ok(get_by_name(&self.conn, name).await?.watered_soil_moisture)
    }

    async fn threshold_by_id(&self, plant_id: i32) -> Result<i32, DBError> {
        Ok(get(&self.conn, plant_id).await?.watered_soil_moisture)
    }

    async fn name_by_id(&self, plant_id: i32) -> Result<String, DBError> {
        Ok(get(&self.conn, plant_id).await?.name)
    }

    async fn id_by_threshold(&self, watered_soil_moisture: i32) -> Result<i32, DBError> {
        Ok(get_by_threshold(&self.conn, watered_soil_moisture)
            .await?
            .plant_id)
    }

    async fn position_x_by_id(&self, plant_id: i32) -> Result<i32, DBError> {
        Ok(get(&self.conn, plant_id).await?.pos_x)
    }

    async fn position_y_by_id(&self, plant_id: i32) -> Result<i32, DBError> {
        Ok(get(&self.conn, plant_id).await?.pos_y)
    }

    async fn get(&self, plant_id: i32) -> Result<PlantDao, DBError> {
        get(&self.conn, plant_id).await
    }

    async fn read(&self) -> Result<Vec<PlantDao>, DBError> {
        read(&self.conn).await
    }

    async fn names(&self) -> Result<Vec<String>, DBError> {
        Ok(sqlx::query_scalar::<_, String>(
            "SELECT name FROM plants_data ORDER BY plant_id ASC",
        )
        .fetch_all(&self.conn)
        .await?)
    }

    async fn thresholds(&self) -> Result<Vec<String>, DBError> {
        let mut thresholds = sqlx::query_scalar::<_, i32>(
            "SELECT watered_soil_moisture FROM plants_data ORDER BY plant_id ASC",
        )
        .fetch_all(&self.conn)
        .await?;
        Ok(thresholds.drain(..).map(|t| t.to_string()).collect())
    }

    async fn ids(&self) -> Result<Vec<i32>, DBError> {
        ids(&self.conn).await
    }

    async fn count(&self) -> Result<i64, DBError> {
        count(&self.conn).await
    }

    async fn delete(&self, name: &str) -> Result<u64, DBError> {
        delete(&self.conn, name).await
    }

    async fn check_schema(&self) -> Result<(), DBError> {
        super::check_schema(&self.conn).await
    }
}
