use crate::{BroadbandLight, Reading, Scalars, Series, Spectral, SpectralBand, Timestamp};
use serde_json::{Map, Value};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadingError {
    #[error("timestamp key '{0}' is not an integer")]
    MalformedTimestamp(String),
    #[error("entry at '{0}' is not an object")]
    MalformedValueBag(String),
}

/// Result of one normalization pass. Entries that could not be parsed are
/// reported in `dropped` and are absent from `series`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub series: Series,
    pub dropped: Vec<ReadingError>,
}

impl Normalized {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }
}

pub fn parse_timestamp(key: &str) -> Result<Timestamp, ReadingError> {
    key.trim()
        .parse::<Timestamp>()
        .map_err(|_| ReadingError::MalformedTimestamp(key.to_string()))
}

pub fn parse_reading(timestamp: Timestamp, bag: &Value) -> Result<Reading, ReadingError> {
    let Value::Object(fields) = bag else {
        return Err(ReadingError::MalformedValueBag(timestamp.to_string()));
    };
    Ok(Reading {
        timestamp,
        scalars: Scalars {
            temperature: number(fields.get("temperature")),
            humidity: number(fields.get("humidity")),
            light_level: first_number(fields, &["light_level", "light"]),
            soil_moisture: first_number(fields, &["soil_moisture", "moisture"]),
        },
        broadband: fields.get("tsl2591").and_then(parse_broadband),
        spectral: fields.get("as7341").and_then(parse_spectral),
    })
}

/// Rebuilds a sensor's series from a full snapshot (`timestamp -> entry`).
///
/// Never fails: malformed entries are dropped and logged, the remainder is
/// kept. A missing snapshot (`null`) or a non-container value yields an
/// empty series. Arrays are read with the element index as the timestamp
/// key, `null` elements being holes.
pub fn normalize_snapshot(snapshot: &Value) -> Normalized {
    let mut readings = Vec::new();
    let mut dropped = Vec::new();
    let mut accept = |key: &str, bag: &Value| {
        let parsed = parse_timestamp(key).and_then(|ts| parse_reading(ts, bag));
        match parsed {
            Ok(reading) => readings.push(reading),
            Err(err) => {
                log::warn!("dropping snapshot entry: {err}");
                dropped.push(err);
            }
        }
    };

    match snapshot {
        Value::Object(entries) => {
            for (key, bag) in entries {
                accept(key, bag);
            }
        }
        Value::Array(entries) => {
            for (idx, bag) in entries.iter().enumerate() {
                if !bag.is_null() {
                    accept(&idx.to_string(), bag);
                }
            }
        }
        Value::Null => {}
        other => {
            log::warn!("ignoring snapshot that is not an object: {other}");
        }
    }

    Normalized {
        series: Series::from_readings(readings),
        dropped,
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    value
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
}

fn first_number(fields: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| number(fields.get(*key)))
}

fn parse_broadband(value: &Value) -> Option<BroadbandLight> {
    let fields = value.as_object()?;
    let light = BroadbandLight {
        lux: number(fields.get("lux")),
        visible: number(fields.get("visible")),
        ir: number(fields.get("ir")),
    };
    if light == BroadbandLight::default() {
        None
    } else {
        Some(light)
    }
}

fn parse_spectral(value: &Value) -> Option<Spectral> {
    let fields = value.as_object()?;
    let mut spectral = Spectral::default();
    for (name, value) in fields {
        if let Some(band) = SpectralBand::from_name(name) {
            spectral.set(band, number(Some(value)));
        }
    }
    if spectral.is_empty() {
        None
    } else {
        Some(spectral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn light_and_moisture_aliases_are_accepted() {
        let reading = parse_reading(10, &json!({"light": 40.0, "moisture": 12.5})).unwrap();
        assert_eq!(reading.scalars.light_level, Some(40.0));
        assert_eq!(reading.scalars.soil_moisture, Some(12.5));
    }

    #[test]
    fn canonical_field_wins_over_alias() {
        let reading = parse_reading(10, &json!({"light_level": 1.0, "light": 2.0})).unwrap();
        assert_eq!(reading.scalars.light_level, Some(1.0));
    }

    #[test]
    fn non_numeric_field_is_absent_not_zero() {
        let reading = parse_reading(10, &json!({"temperature": "warm", "humidity": 50})).unwrap();
        assert_eq!(reading.scalars.temperature, None);
        assert_eq!(reading.scalars.humidity, Some(50.0));
    }

    #[test]
    fn spectral_band_names_are_case_insensitive() {
        let reading =
            parse_reading(10, &json!({"as7341": {"NIR": 3.0, "415NM": 1.0, "uv": 9.0}})).unwrap();
        let spectral = reading.spectral.unwrap();
        assert_eq!(spectral.get(SpectralBand::Nir), Some(3.0));
        assert_eq!(spectral.get(SpectralBand::Nm415), Some(1.0));
        assert_eq!(spectral.get(SpectralBand::Clear), None);
    }

    #[test]
    fn empty_sensor_objects_collapse_to_absent() {
        let reading = parse_reading(10, &json!({"tsl2591": {}, "as7341": {"uv": 1}})).unwrap();
        assert!(reading.broadband.is_none());
        assert!(reading.spectral.is_none());
    }

    #[test]
    fn timestamp_keys_are_trimmed() {
        assert_eq!(parse_timestamp(" 1700000000 "), Ok(1_700_000_000));
        assert!(parse_timestamp("17e8").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn array_snapshot_uses_index_keys() {
        let normalized = normalize_snapshot(&json!([null, {"temperature": 1.0}]));
        assert_eq!(normalized.series.len(), 1);
        assert_eq!(normalized.series[0].timestamp, 1);
    }
}
