//! Runs against the database in DATABASE_URL:
//! `cargo test -- --ignored`
use super::*;
use crate::error::PlantKey;

async fn build_store() -> PgPlantStore {
    let database_url = CONFIG.database_url().expect("DATABASE_URL must be set");
    let conn = establish_db_connection(&database_url).await.unwrap();
    migrate(&conn).await.unwrap();
    PgPlantStore::new(conn)
}

fn unique_name(prefix: &str) -> String {
    format!(
        "{}-{}",
        prefix,
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

#[tokio::test]
#[ignore = "needs postgres"]
async fn test_db_connection() {
    let store = build_store().await;
    store.check_schema().await.unwrap();
}

#[tokio::test]
#[ignore = "needs postgres"]
async fn crud_plants() {
    let store = build_store().await;
    let name = unique_name("Basil");
    let count_before = store.count().await.unwrap();

    // create
    let plant = store.create(&name, 40, 3, 7).await.unwrap();
    assert_eq!(count_before + 1, store.count().await.unwrap());

    // read
    assert_eq!(40, store.threshold_by_name(&name).await.unwrap());
    assert_eq!(40, store.threshold_by_id(plant.id()).await.unwrap());
    assert_eq!(&name, &store.name_by_id(plant.id()).await.unwrap());
    assert_eq!(3, store.position_x_by_id(plant.id()).await.unwrap());
    assert_eq!(7, store.position_y_by_id(plant.id()).await.unwrap());
    assert!(store.ids().await.unwrap().contains(&plant.id()));
    assert!(store.names().await.unwrap().contains(&name));

    // update
    store.update_threshold(&name, 25).await.unwrap();
    assert_eq!(25, store.threshold_by_name(&name).await.unwrap());

    // delete
    assert_eq!(1, store.delete(&name).await.unwrap());
    assert_eq!(count_before, store.count().await.unwrap());
    let err = store.threshold_by_name(&name).await.unwrap_err();
    assert!(matches!(err, DBError::PlantNotFound(PlantKey::Name(_))));
}

#[tokio::test]
#[ignore = "needs postgres"]
async fn ambiguous_plant_update() {
    let store = build_store().await;
    let name = unique_name("Mint");
    let first = store.create(&name, 40, 0, 0).await.unwrap();
    store.create(&name, 45, 0, 0).await.unwrap();

    let err = store.update_threshold(&name, 10).await.unwrap_err();
    assert!(matches!(err, DBError::AmbiguousMatch(_, 2)));
    assert_eq!(40, store.threshold_by_id(first.id()).await.unwrap());

    assert_eq!(2, store.delete(&name).await.unwrap());
}

#[tokio::test]
#[ignore = "needs postgres"]
async fn missing_plant() {
    let store = build_store().await;
    let err = store.threshold_by_id(-1).await.unwrap_err();
    assert!(err.is_not_found());
    let err = store.update_threshold(&unique_name("Nope"), 1).await.unwrap_err();
    assert!(err.is_not_found());
}
