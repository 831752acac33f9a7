use super::dto::ErrorResponseDto;
use super::{build_response, BODY_LIMIT};
use crate::models::PlantDao;
use crate::observer::PlantObserver;
use dto::{NameDto, PlantDto, RemovedDto, ThresholdDto};
use utoipa::OpenApi;
use warp::Filter;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_plants,
        plant,
        plant_names,
        plant_thresholds,
        add_plant,
        update_threshold,
        remove_plant
    ),
    components(schemas(
        PlantDao,
        PlantDto,
        ThresholdDto,
        NameDto,
        RemovedDto,
        ErrorResponseDto
    )),
    tags((name = "plant", description = "Plant management"))
)]
pub struct PlantApi;

pub fn routes(
    observer: &PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    list_plants(observer.clone())
        .or(plant(observer.clone()))
        .or(plant_names(observer.clone()))
        .or(plant_thresholds(observer.clone()))
        .or(add_plant(observer.clone()))
        .or(update_threshold(observer.clone()))
        .or(remove_plant(observer.clone()))
}

/// GET /api/plant
///
/// Returns all plants ordered by their id
#[utoipa::path(
    get,
    path = "/api/plant",
    tag = "plant",
    responses((status = 200, description = "All stored plants", body = [PlantDao]))
)]
fn list_plants(
    observer: PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::path!("api" / "plant"))
        .and(warp::get())
        .and_then(|observer: PlantObserver| async move {
            let resp = observer.plants().await;
            build_response(resp)
        })
        .boxed()
}

/// GET /api/plant/:id
#[utoipa::path(
    get,
    path = "/api/plant/{id}",
    tag = "plant",
    params(("id" = i32, Path, description = "Plant id")),
    responses(
        (status = 200, description = "The plant", body = PlantDao),
        (status = 400, description = "No plant with this id", body = ErrorResponseDto)
    )
)]
fn plant(
    observer: PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::path!("api" / "plant" / i32))
        .and(warp::get())
        .and_then(|observer: PlantObserver, plant_id: i32| async move {
            let resp = observer.plant(plant_id).await;
            build_response(resp)
        })
        .boxed()
}

/// GET /api/plant/names
#[utoipa::path(
    get,
    path = "/api/plant/names",
    tag = "plant",
    responses((status = 200, description = "Names of all plants", body = [String]))
)]
fn plant_names(
    observer: PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::path!("api" / "plant" / "names"))
        .and(warp::get())
        .and_then(|observer: PlantObserver| async move {
            let resp = observer.names().await;
            build_response(resp)
        })
        .boxed()
}

/// GET /api/plant/thresholds
///
/// The watered soil moisture of every plant, rendered as text
#[utoipa::path(
    get,
    path = "/api/plant/thresholds",
    tag = "plant",
    responses((status = 200, description = "Thresholds of all plants", body = [String]))
)]
fn plant_thresholds(
    observer: PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::path!("api" / "plant" / "thresholds"))
        .and(warp::get())
        .and_then(|observer: PlantObserver| async move {
            let resp = observer.thresholds().await;
            build_response(resp)
        })
        .boxed()
}

/// POST /api/plant
///
/// Adds a plant, fails if the name is already taken
#[utoipa::path(
    post,
    path = "/api/plant",
    tag = "plant",
    request_body = PlantDto,
    responses(
        (status = 200, description = "The stored plant", body = PlantDao),
        (status = 400, description = "Invalid or duplicate plant", body = ErrorResponseDto)
    )
)]
fn add_plant(
    observer: PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::path!("api" / "plant"))
        .and(warp::post())
        .and(warp::body::content_length_limit(BODY_LIMIT))
        .and(warp::body::json())
        .and_then(|observer: PlantObserver, body: PlantDto| async move {
            let resp = match body.validate() {
                Ok(plant) => observer.add(plant).await,
                Err(e) => Err(e.into()),
            };
            build_response(resp)
        })
        .boxed()
}

/// PUT /api/plant
///
/// Changes the watered soil moisture of the plant with the given name
#[utoipa::path(
    put,
    path = "/api/plant",
    tag = "plant",
    request_body = ThresholdDto,
    responses(
        (status = 200, description = "Threshold updated"),
        (status = 400, description = "Unknown or ambiguous plant", body = ErrorResponseDto)
    )
)]
fn update_threshold(
    observer: PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::path!("api" / "plant"))
        .and(warp::put())
        .and(warp::body::content_length_limit(BODY_LIMIT))
        .and(warp::body::json())
        .and_then(|observer: PlantObserver, body: ThresholdDto| async move {
            let resp = observer
                .update_threshold(body.name.trim(), body.watered_soil_moisture)
                .await;
            build_response(resp)
        })
        .boxed()
}

/// DELETE /api/plant
///
/// Removes every plant with the given name
#[utoipa::path(
    delete,
    path = "/api/plant",
    tag = "plant",
    request_body = NameDto,
    responses(
        (status = 200, description = "Number of removed plants", body = RemovedDto),
        (status = 400, description = "Unknown plant", body = ErrorResponseDto)
    )
)]
fn remove_plant(
    observer: PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::path!("api" / "plant"))
        .and(warp::delete())
        .and(warp::body::content_length_limit(BODY_LIMIT))
        .and(warp::body::json())
        .and_then(|observer: PlantObserver, body: NameDto| async move {
            let resp = observer
                .remove(body.name.trim())
                .await
                .map(|removed| RemovedDto { removed });
            build_response(resp)
        })
        .boxed()
}

///
/// DTO
///
pub mod dto {
    use crate::error::ApiError;
    use crate::observer::plant::NewPlant;
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct PlantDto {
        pub name: String,
        pub watered_soil_moisture: i32,
        #[serde(default)]
        pub pos_x: i32,
        #[serde(default)]
        pub pos_y: i32,
    }

    impl PlantDto {
        pub fn validate(self) -> Result<NewPlant, ApiError> {
            let name = self.name.trim();
            if name.is_empty() {
                return Err(ApiError::InvalidField("name", self.name));
            }
            Ok(NewPlant {
                name: name.to_owned(),
                watered_soil_moisture: self.watered_soil_moisture,
                pos_x: self.pos_x,
                pos_y: self.pos_y,
            })
        }
    }

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct ThresholdDto {
        pub name: String,
        pub watered_soil_moisture: i32,
    }

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct NameDto {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct RemovedDto {
        pub removed: u64,
    }
}
