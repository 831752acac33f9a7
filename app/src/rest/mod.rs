use crate::error::ObserverError;
use crate::observer::{ConcurrentObserver, PlantObserver, WateringObserver};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

mod doc_routes;
mod metric_routes;
mod page_routes;
mod plant_routes;
mod reading_routes;


const BODY_LIMIT: u64 = 4096;

pub fn routes(
    observer: &Arc<ConcurrentObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    let plant_observer = PlantObserver::new(observer.clone());
    let watering_observer = WateringObserver::new(observer.clone());

    page_routes::routes(&plant_observer, &watering_observer)
        .or(reading_routes::routes(&watering_observer))
        .or(plant_routes::routes(&plant_observer))
        .or(metric_routes::routes(observer))
        .or(doc_routes::routes())
        .recover(handle_rejection)
        .with(warp::trace::request())
}

/// Serves until ctrl-c is received
pub async fn dispatch_server(
    observer: Arc<ConcurrentObserver>,
    port: u16,
) -> Result<(), warp::Error> {
    let bind_addr = SocketAddr::from(([0, 0, 0, 0], port));
    let (addr, server) = warp::serve(routes(&observer)).try_bind_with_graceful_shutdown(
        bind_addr,
        async {
            if tokio::signal::ctrl_c().await.is_err() {
                error!("Failed listening for ctrl-c");
            }
            info!("Shutting down webserver");
        },
    )?;

    info!("Starting webserver at: {}", addr);
    server.await;
    Ok(())
}

pub(crate) fn build_response<T: serde::Serialize>(
    resp: Result<T, ObserverError>,
) -> Result<Box<dyn Reply>, Rejection> {
    match resp {
        Ok(data) => Ok(Box::new(warp::reply::json(&data))),
        Err(ObserverError::User(err)) => {
            warn!("{}", err);
            Ok(error_reply(err.to_string(), StatusCode::BAD_REQUEST))
        }
        Err(ObserverError::Internal(err)) => {
            error!("{}", err);
            Ok(Box::new(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

fn error_reply(error: String, status: StatusCode) -> Box<dyn Reply> {
    Box::new(warp::reply::with_status(
        warp::reply::json(&dto::ErrorResponseDto { error }),
        status,
    ))
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_owned())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported media type".to_owned(),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large".to_owned())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_owned(),
        )
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_owned(),
        )
    };

    debug!(status = status.as_u16(), "Rejected request: {}", message);
    Ok(error_reply(message, status))
}

///
/// DTO
///
pub mod dto {
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct ErrorResponseDto {
        pub error: String,
    }
}
