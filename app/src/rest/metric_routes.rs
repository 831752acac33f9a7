use super::build_response;
use crate::observer::ConcurrentObserver;
use std::sync::Arc;
use utoipa::OpenApi;
use warp::Filter;

#[derive(OpenApi)]
#[openapi(
    paths(health),
    components(schemas(dto::HealthyDto)),
    tags((name = "health", description = "Service state"))
)]
pub struct HealthApi;

pub fn routes(
    observer: &Arc<ConcurrentObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    health(observer.clone())
}

/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, description = "Service state", body = HealthyDto))
)]
fn health(
    observer: Arc<ConcurrentObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::path!("api" / "health"))
        .and(warp::get())
        .and_then(|observer: Arc<ConcurrentObserver>| async move {
            let ret = dto::HealthyDto {
                healthy: true,
                database_state: observer.check_db().await,
                plant_count: observer.plant_count().await,
                version: greenhouse_core::CORE_VERSION.to_owned(),
            };
            build_response(Ok(ret))
        })
        .boxed()
}

pub mod dto {
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct HealthyDto {
        pub healthy: bool,
        pub database_state: String,
        pub plant_count: Option<i64>,
        pub version: String,
    }
}
