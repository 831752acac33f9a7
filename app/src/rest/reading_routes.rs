use super::dto::ErrorResponseDto;
use super::{build_response, BODY_LIMIT};
use crate::observer::{LatestStatus, WateringObserver};
use greenhouse_core::{
    Evaluation, EvaluationFailure, ReceivedReading, SensorReading, SoilConditions,
    WateringDecision,
};
use utoipa::OpenApi;
use warp::Filter;

#[derive(OpenApi)]
#[openapi(
    paths(data_logger_data, latest_evaluation),
    components(schemas(
        SensorReading,
        ReceivedReading,
        SoilConditions,
        WateringDecision,
        EvaluationFailure,
        Evaluation,
        LatestStatus,
        ErrorResponseDto
    )),
    tags((name = "reading", description = "Data logger readings"))
)]
pub struct ReadingApi;

pub fn routes(
    observer: &WateringObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    data_logger_data(observer.clone()).or(latest_evaluation(observer.clone()))
}

/// POST /dataLoggerData
///
/// Entry point of the data logger. Every reading is judged against all
/// plants right away.
///
/// Returns the `Evaluation`, a 400 if the soil values are no numbers
#[utoipa::path(
    post,
    path = "/dataLoggerData",
    tag = "reading",
    request_body = SensorReading,
    responses(
        (status = 200, description = "Watering decision per plant", body = Evaluation),
        (status = 400, description = "Malformed reading", body = ErrorResponseDto)
    )
)]
fn data_logger_data(
    observer: WateringObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::path!("dataLoggerData"))
        .and(warp::post())
        .and(warp::body::content_length_limit(BODY_LIMIT))
        .and(warp::body::json())
        .and_then(
            |observer: WateringObserver, reading: SensorReading| async move {
                let resp = observer.evaluate(reading).await;
                build_response(resp)
            },
        )
        .boxed()
}

/// GET /api/evaluation
///
/// The last reading and its evaluation, `null` before the first reading
#[utoipa::path(
    get,
    path = "/api/evaluation",
    tag = "reading",
    responses(
        (
            status = 200,
            description = "Latest reading, null before the first one",
            body = LatestStatus
        )
    )
)]
fn latest_evaluation(
    observer: WateringObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::path!("api" / "evaluation"))
        .and(warp::get())
        .and_then(|observer: WateringObserver| async move {
            let latest = observer.latest().await;
            build_response(Ok(latest))
        })
        .boxed()
}
