use crate::error::ReadingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Payload posted by the data logger.
///
/// All values arrive as strings, only the soil values take part in the
/// watering decision and get parsed by [`SensorReading::soil`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    #[serde(default)]
    pub air_temperature: String,
    #[serde(default)]
    pub air_humidity: String,
    pub soil_moisture: String,
    pub soil_temperature: String,
}

/// Parsed soil values of a single reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SoilConditions {
    pub moisture: i32,
    pub temperature: i32,
}

impl SensorReading {
    pub fn soil(&self) -> Result<SoilConditions, ReadingError> {
        Ok(SoilConditions {
            moisture: parse_field("soilMoisture", &self.soil_moisture)?,
            temperature: parse_field("soilTemperature", &self.soil_temperature)?,
        })
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<i32, ReadingError> {
    value.parse().map_err(|_| ReadingError::InvalidNumber {
        field,
        value: value.to_owned(),
    })
}

/// The last reading the service got, kept for display only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReceivedReading {
    pub received_at: DateTime<Utc>,
    pub reading: SensorReading,
}

impl ReceivedReading {
    pub fn now(reading: SensorReading) -> Self {
        ReceivedReading {
            received_at: Utc::now(),
            reading,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn reading(moisture: &str, temperature: &str) -> SensorReading {
        SensorReading {
            soil_moisture: moisture.to_owned(),
            soil_temperature: temperature.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_soil() {
        let soil = reading("30", "-4").soil().unwrap();
        assert_eq!(30, soil.moisture);
        assert_eq!(-4, soil.temperature);
    }

    #[test]
    fn test_invalid_moisture() {
        let err = reading("abc", "20").soil().unwrap_err();
        assert_eq!(
            ReadingError::InvalidNumber {
                field: "soilMoisture",
                value: "abc".to_owned()
            },
            err
        );
    }

    #[test]
    fn test_invalid_temperature() {
        let err = reading("30", "20.5").soil().unwrap_err();
        match err {
            ReadingError::InvalidNumber { field, .. } => assert_eq!("soilTemperature", field),
        }
    }

    #[test]
    fn test_whitespace_is_rejected() {
        assert!(reading(" 30", "20").soil().is_err());
    }

    #[test]
    fn test_deserialize_logger_payload() {
        let json = r#"{
            "airTemperature": "21",
            "airHumidity": "60",
            "soilMoisture": "30",
            "soilTemperature": "20"
        }"#;
        let parsed: SensorReading = serde_json::from_str(json).unwrap();
        assert_eq!("21", parsed.air_temperature);
        assert_eq!("60", parsed.air_humidity);
        assert_eq!(reading("30", "20").soil(), parsed.soil());
    }

    #[test]
    fn test_air_values_are_optional() {
        let json = r#"{"soilMoisture": "30", "soilTemperature": "20"}"#;
        let parsed: SensorReading = serde_json::from_str(json).unwrap();
        assert!(parsed.air_temperature.is_empty());
    }
}
