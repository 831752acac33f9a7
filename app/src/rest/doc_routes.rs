use super::metric_routes::HealthApi;
use super::plant_routes::PlantApi;
use super::reading_routes::ReadingApi;
use utoipa::openapi::path::PathsBuilder;
use utoipa::openapi::schema::ComponentsBuilder;
use utoipa::openapi::tag::Tag;
use utoipa::openapi::{InfoBuilder, OpenApi as OpenApiSpec, OpenApiBuilder};
use utoipa::OpenApi;
use warp::Filter;

/// All route groups as one document
pub fn api_doc() -> OpenApiSpec {
    let specs = vec![PlantApi::openapi(), ReadingApi::openapi(), HealthApi::openapi()];

    let mut tags: Vec<Tag> = Vec::new();
    let mut paths = PathsBuilder::new();
    let mut components = ComponentsBuilder::new();
    for spec in specs {
        if let Some(spec_tags) = spec.tags {
            tags.extend(spec_tags);
        }
        for (key, value) in spec.paths.paths {
            paths = paths.path(key, value);
        }
        if let Some(spec_components) = spec.components {
            for (key, value) in spec_components.schemas {
                components = components.schema(key, value);
            }
            for (key, value) in spec_components.responses {
                components = components.response(key, value);
            }
        }
    }

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("greenhouse")
                .version(env!("CARGO_PKG_VERSION"))
                .build(),
        )
        .tags(Some(tags))
        .paths(paths.build())
        .components(Some(components.build()))
        .build()
}

/// GET /api/doc/api.json
pub fn routes() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let merged_api = api_doc();
    warp::path!("api" / "doc" / "api.json")
        .and(warp::get())
        .map(move || warp::reply::json(&merged_api))
}
