use crate::reading::SoilConditions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_MAX_SOIL_TEMPERATURE: i32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WateringPolicy {
    max_soil_temperature: i32,
}

impl Default for WateringPolicy {
    fn default() -> Self {
        WateringPolicy::new(DEFAULT_MAX_SOIL_TEMPERATURE)
    }
}

impl WateringPolicy {
    pub fn new(max_soil_temperature: i32) -> Self {
        WateringPolicy {
            max_soil_temperature,
        }
    }

    pub fn max_soil_temperature(&self) -> i32 {
        self.max_soil_temperature
    }

    /// A plant is dry below its threshold, but is never watered
    /// once the soil reached the temperature ceiling.
    pub fn needs_water(&self, soil: &SoilConditions, threshold: i32) -> bool {
        soil.moisture < threshold && soil.temperature < self.max_soil_temperature
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WateringDecision {
    pub plant_id: i32,
    pub needs_water: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationFailure {
    pub plant_id: i32,
    pub reason: String,
}

/// Outcome of one pass over all known plants, ordered by plant id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub evaluated_at: DateTime<Utc>,
    pub soil: Option<SoilConditions>,
    pub decisions: Vec<WateringDecision>,
    pub failures: Vec<EvaluationFailure>,
}

impl Evaluation {
    pub fn new(soil: SoilConditions) -> Self {
        Evaluation {
            evaluated_at: Utc::now(),
            soil: Some(soil),
            decisions: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn decide(&mut self, plant_id: i32, needs_water: bool) {
        self.decisions.push(WateringDecision {
            plant_id,
            needs_water,
        });
    }

    pub fn fail(&mut self, plant_id: i32, reason: String) {
        self.failures.push(EvaluationFailure { plant_id, reason });
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn plants_to_water(&self) -> impl Iterator<Item = i32> + '_ {
        self.decisions
            .iter()
            .filter(|d| d.needs_water)
            .map(|d| d.plant_id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn soil(moisture: i32, temperature: i32) -> SoilConditions {
        SoilConditions {
            moisture,
            temperature,
        }
    }

    #[test]
    fn test_dry_and_cool_soil() {
        let policy = WateringPolicy::default();
        assert!(policy.needs_water(&soil(30, 20), 40));
    }

    #[test]
    fn test_moist_soil() {
        let policy = WateringPolicy::default();
        assert!(!policy.needs_water(&soil(50, 20), 40));
        assert!(!policy.needs_water(&soil(40, 20), 40));
    }

    #[test]
    fn test_temperature_ceiling() {
        let policy = WateringPolicy::default();
        assert!(!policy.needs_water(&soil(30, 30), 40));
        assert!(!policy.needs_water(&soil(30, 25), 40));
        assert!(policy.needs_water(&soil(30, 24), 40));
    }

    #[test]
    fn test_custom_ceiling() {
        let policy = WateringPolicy::new(35);
        assert_eq!(35, policy.max_soil_temperature());
        assert!(policy.needs_water(&soil(30, 30), 40));
    }

    #[test]
    fn test_evaluation_bookkeeping() {
        let mut evaluation = Evaluation::new(soil(30, 20));
        evaluation.decide(1, true);
        evaluation.decide(3, false);
        assert!(!evaluation.is_partial());

        evaluation.fail(2, "gone".to_owned());
        assert!(evaluation.is_partial());
        assert_eq!(vec![1], evaluation.plants_to_water().collect::<Vec<_>>());
    }

    #[test]
    fn test_serialized_shape() {
        let mut evaluation = Evaluation::new(soil(30, 20));
        evaluation.decide(1, true);
        let json = serde_json::to_value(&evaluation).unwrap();
        assert_eq!(true, json["decisions"][0]["needsWater"]);
        assert_eq!(1, json["decisions"][0]["plantId"]);
        assert!(json["failures"].as_array().unwrap().is_empty());
    }
}
