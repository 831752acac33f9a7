use super::BODY_LIMIT;
use crate::error::ObserverError;
use crate::observer::{PlantObserver, WateringObserver};
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

pub fn routes(
    plants: &PlantObserver,
    watering: &WateringObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    index(plants.clone(), watering.clone())
        .or(add_plant_form())
        .or(edit_plant_form(plants.clone()))
        .or(remove_plant_form(plants.clone()))
        .or(add_plant(plants.clone()))
        .or(edit_plant(plants.clone()))
        .or(remove_plant(plants.clone()))
}

/// GET /
///
/// Overview of the latest reading and all plants
fn index(
    plants: PlantObserver,
    watering: WateringObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || plants.clone())
        .and(warp::any().map(move || watering.clone()))
        .and(warp::path::end())
        .and(warp::get())
        .and_then(
            |plants: PlantObserver, watering: WateringObserver| async move {
                let latest = watering.latest().await;
                let resp = plants
                    .plants()
                    .await
                    .map(|all| view::index(latest.as_ref(), &all));
                build_page("Overview", resp)
            },
        )
        .boxed()
}

/// GET /addPlant
fn add_plant_form() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("addPlant")
        .and(warp::get())
        .map(|| warp::reply::html(view::page("Add plant", view::ADD_PLANT_FORM)))
        .boxed()
}

/// GET /editPlant
///
/// Form to change the watered soil moisture of a plant
fn edit_plant_form(
    plants: PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || plants.clone())
        .and(warp::path!("editPlant"))
        .and(warp::get())
        .and_then(|plants: PlantObserver| async move {
            let resp = plants.names().await.map(|names| view::edit_plant_form(&names));
            build_page("Edit plant", resp)
        })
        .boxed()
}

/// GET /removePlant
fn remove_plant_form(
    plants: PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || plants.clone())
        .and(warp::path!("removePlant"))
        .and(warp::get())
        .and_then(|plants: PlantObserver| async move {
            let resp = plants
                .names()
                .await
                .map(|names| view::remove_plant_form(&names));
            build_page("Remove plant", resp)
        })
        .boxed()
}

/// POST /addPlantDb
///
/// Redirects to the overview once the plant got stored
fn add_plant(
    plants: PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || plants.clone())
        .and(warp::path!("addPlantDb"))
        .and(warp::post())
        .and(warp::body::content_length_limit(BODY_LIMIT))
        .and(warp::body::form())
        .and_then(|plants: PlantObserver, form: dto::PlantForm| async move {
            let resp = match form.parse() {
                Ok(plant) => plants.add(plant).await.map(|_| ()),
                Err(e) => Err(e.into()),
            };
            build_redirect(resp)
        })
        .boxed()
}

/// POST /editPlantDb
fn edit_plant(
    plants: PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || plants.clone())
        .and(
            warp::path("editPlantDb")
                .or(warp::path("editPlantDB"))
                .unify(),
        )
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(BODY_LIMIT))
        .and(warp::body::form())
        .and_then(|plants: PlantObserver, form: dto::ThresholdForm| async move {
            let resp = match form.parse() {
                Ok((name, threshold)) => plants.update_threshold(&name, threshold).await,
                Err(e) => Err(e.into()),
            };
            build_redirect(resp)
        })
        .boxed()
}

/// POST /removePlantDb
fn remove_plant(
    plants: PlantObserver,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || plants.clone())
        .and(warp::path!("removePlantDb"))
        .and(warp::post())
        .and(warp::body::content_length_limit(BODY_LIMIT))
        .and(warp::body::form())
        .and_then(|plants: PlantObserver, form: dto::NameForm| async move {
            let resp = match form.parse() {
                Ok(name) => plants.remove(&name).await.map(|_| ()),
                Err(e) => Err(e.into()),
            };
            build_redirect(resp)
        })
        .boxed()
}

fn build_page(
    title: &str,
    resp: Result<String, ObserverError>,
) -> Result<Box<dyn Reply>, Rejection> {
    match resp {
        Ok(content) => Ok(Box::new(warp::reply::html(view::page(title, &content)))),
        Err(err) => Ok(error_page(err)),
    }
}

fn build_redirect(resp: Result<(), ObserverError>) -> Result<Box<dyn Reply>, Rejection> {
    match resp {
        Ok(()) => Ok(Box::new(warp::reply::with_header(
            StatusCode::SEE_OTHER,
            "location",
            "/",
        ))),
        Err(err) => Ok(error_page(err)),
    }
}

fn error_page(err: ObserverError) -> Box<dyn Reply> {
    let (status, message) = match err {
        ObserverError::User(err) => {
            warn!("{}", err);
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        ObserverError::Internal(err) => {
            error!("{}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong, please try again later".to_owned(),
            )
        }
    };
    Box::new(warp::reply::with_status(
        warp::reply::html(view::page("Error", &view::message(&message))),
        status,
    ))
}

///
/// HTML rendering
///
mod view {
    use crate::models::PlantDao;
    use crate::observer::LatestStatus;
    use std::collections::HashMap;

    const LAYOUT: &str = include_str!("../../templates/layout.html");
    const INDEX: &str = include_str!("../../templates/index.html");
    pub const ADD_PLANT_FORM: &str = include_str!("../../templates/add_plant_form.html");
    const EDIT_PLANT_FORM: &str = include_str!("../../templates/edit_plant_form.html");
    const REMOVE_PLANT_FORM: &str = include_str!("../../templates/remove_plant_form.html");

    pub fn escape(raw: &str) -> String {
        let mut escaped = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                _ => escaped.push(c),
            }
        }
        escaped
    }

    /// Replaces `{{key}}` placeholders in a single pass,
    /// inserted values are never expanded again
    fn fill(template: &str, values: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match values.iter().find(|(k, _)| *k == key) {
                        Some((_, value)) => out.push_str(value),
                        None => out.push_str(&rest[start..start + end + 4]),
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    pub fn page(title: &str, content: &str) -> String {
        fill(LAYOUT, &[("title", &escape(title)), ("content", content)])
    }

    pub fn message(text: &str) -> String {
        format!("    <p>{}</p>\n", escape(text))
    }

    pub fn options(names: &[String]) -> String {
        names
            .iter()
            .map(|name| {
                let name = escape(name);
                format!("<option value=\"{}\">{}</option>", name, name)
            })
            .collect()
    }

    pub fn edit_plant_form(names: &[String]) -> String {
        fill(EDIT_PLANT_FORM, &[("options", &options(names))])
    }

    pub fn remove_plant_form(names: &[String]) -> String {
        fill(REMOVE_PLANT_FORM, &[("options", &options(names))])
    }

    pub fn index(latest: Option<&LatestStatus>, plants: &[PlantDao]) -> String {
        let reading = match latest {
            Some(status) => reading_table(status),
            None => message("No reading received yet."),
        };
        fill(
            INDEX,
            &[("reading", &reading), ("plants", &plant_table(latest, plants))],
        )
    }

    fn reading_table(status: &LatestStatus) -> String {
        let reading = &status.reading.reading;
        let rows = [
            (
                "Received",
                status
                    .reading
                    .received_at
                    .format("%Y-%m-%d %H:%M:%S UTC")
                    .to_string(),
            ),
            ("Air temperature", reading.air_temperature.clone()),
            ("Air humidity", reading.air_humidity.clone()),
            ("Soil moisture", reading.soil_moisture.clone()),
            ("Soil temperature", reading.soil_temperature.clone()),
        ];

        let mut table = String::from("    <table>\n");
        for (label, value) in rows.iter() {
            table.push_str(&format!(
                "        <tr><th>{}</th><td>{}</td></tr>\n",
                label,
                escape(value)
            ));
        }
        table.push_str("    </table>\n");
        if status.evaluation.is_none() {
            table.push_str(&message("The reading could not be evaluated."));
        }
        table
    }

    fn plant_table(latest: Option<&LatestStatus>, plants: &[PlantDao]) -> String {
        if plants.is_empty() {
            return message("No plants yet.");
        }

        let mut decisions = HashMap::new();
        if let Some(evaluation) = latest.and_then(|status| status.evaluation.as_ref()) {
            for decision in evaluation.decisions.iter() {
                let text = if decision.needs_water { "yes" } else { "no" };
                decisions.insert(decision.plant_id, text);
            }
            for failure in evaluation.failures.iter() {
                decisions.insert(failure.plant_id, "unknown");
            }
        }

        let mut table = String::from(concat!(
            "    <table>\n",
            "        <tr><th>Name</th><th>Watered soil moisture</th>",
            "<th>Position</th><th>Needs water</th></tr>\n",
        ));
        for plant in plants {
            table.push_str(&format!(
                "        <tr><td>{}</td><td>{}</td><td>{}, {}</td><td>{}</td></tr>\n",
                escape(plant.name()),
                plant.watered_soil_moisture(),
                plant.pos_x(),
                plant.pos_y(),
                decisions.get(&plant.id()).copied().unwrap_or("-")
            ));
        }
        table.push_str("    </table>\n");
        table
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn test_escape() {
            assert_eq!(
                "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&#39;s&lt;/b&gt;",
                escape("<b>Tom & \"Jerry\"'s</b>")
            );
        }

        #[test]
        fn test_fill_single_pass() {
            let filled = fill(
                "a {{first}} b {{second}} {{unknown}}",
                &[("first", "{{second}}"), ("second", "2")],
            );
            assert_eq!("a {{second}} b 2 {{unknown}}", filled);
        }

        #[test]
        fn test_unclosed_placeholder() {
            assert_eq!("open {{ end", fill("open {{ end", &[]));
        }

        #[test]
        fn test_options() {
            let names = vec!["Basil".to_owned(), "<Mint>".to_owned()];
            assert_eq!(
                concat!(
                    "<option value=\"Basil\">Basil</option>",
                    "<option value=\"&lt;Mint&gt;\">&lt;Mint&gt;</option>"
                ),
                options(&names)
            );
        }
    }
}

///
/// DTO
///
pub mod dto {
    use crate::error::ApiError;
    use crate::observer::plant::NewPlant;
    use serde::{Deserialize, Serialize};

    // Missing fields deserialize empty so `parse` can report them
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct PlantForm {
        pub plant_name: String,
        pub watered_soil_moisture: String,
        pub position_x: Option<String>,
        pub position_y: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct ThresholdForm {
        pub plant_name: String,
        pub watered_soil_moisture: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct NameForm {
        pub plant_name: String,
    }

    fn parse_name(raw: &str) -> Result<String, ApiError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidField("plantName", raw.to_owned()));
        }
        Ok(name.to_owned())
    }

    fn parse_number(field: &'static str, raw: &str) -> Result<i32, ApiError> {
        raw.trim()
            .parse()
            .map_err(|_| ApiError::InvalidField(field, raw.to_owned()))
    }

    // empty position fields default to 0
    fn parse_position(field: &'static str, raw: &Option<String>) -> Result<i32, ApiError> {
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(0),
            Some(value) => parse_number(field, value),
        }
    }

    impl PlantForm {
        pub fn parse(&self) -> Result<NewPlant, ApiError> {
            Ok(NewPlant {
                name: parse_name(&self.plant_name)?,
                watered_soil_moisture: parse_number(
                    "wateredSoilMoisture",
                    &self.watered_soil_moisture,
                )?,
                pos_x: parse_position("positionX", &self.position_x)?,
                pos_y: parse_position("positionY", &self.position_y)?,
            })
        }
    }

    impl ThresholdForm {
        pub fn parse(&self) -> Result<(String, i32), ApiError> {
            Ok((
                parse_name(&self.plant_name)?,
                parse_number("wateredSoilMoisture", &self.watered_soil_moisture)?,
            ))
        }
    }

    impl NameForm {
        pub fn parse(&self) -> Result<String, ApiError> {
            parse_name(&self.plant_name)
        }
    }

}
