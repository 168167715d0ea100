use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::ops::Deref;
use std::path::Path;

pub mod normalize;
pub use normalize::{normalize_snapshot, parse_reading, parse_timestamp, Normalized, ReadingError};

/// Epoch seconds.
pub type Timestamp = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpectralBand {
    #[serde(rename = "415nm")]
    Nm415,
    #[serde(rename = "445nm")]
    Nm445,
    #[serde(rename = "480nm")]
    Nm480,
    #[serde(rename = "515nm")]
    Nm515,
    #[serde(rename = "555nm")]
    Nm555,
    #[serde(rename = "590nm")]
    Nm590,
    #[serde(rename = "630nm")]
    Nm630,
    #[serde(rename = "680nm")]
    Nm680,
    #[serde(rename = "clear")]
    Clear,
    #[serde(rename = "nir")]
    Nir,
}

impl SpectralBand {
    pub const ALL: [SpectralBand; 10] = [
        SpectralBand::Nm415,
        SpectralBand::Nm445,
        SpectralBand::Nm480,
        SpectralBand::Nm515,
        SpectralBand::Nm555,
        SpectralBand::Nm590,
        SpectralBand::Nm630,
        SpectralBand::Nm680,
        SpectralBand::Clear,
        SpectralBand::Nir,
    ];

    /// Key used by the feed for this band.
    pub fn name(self) -> &'static str {
        match self {
            SpectralBand::Nm415 => "415nm",
            SpectralBand::Nm445 => "445nm",
            SpectralBand::Nm480 => "480nm",
            SpectralBand::Nm515 => "515nm",
            SpectralBand::Nm555 => "555nm",
            SpectralBand::Nm590 => "590nm",
            SpectralBand::Nm630 => "630nm",
            SpectralBand::Nm680 => "680nm",
            SpectralBand::Clear => "clear",
            SpectralBand::Nir => "nir",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|band| band.name().eq_ignore_ascii_case(name))
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scalars {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub light_level: Option<f64>,
    pub soil_moisture: Option<f64>,
}

/// TSL2591 broadband light sensor values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BroadbandLight {
    pub lux: Option<f64>,
    pub visible: Option<f64>,
    pub ir: Option<f64>,
}

/// AS7341 spectral values indexed by [`SpectralBand`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spectral {
    values: [Option<f64>; 10],
}

impl Spectral {
    pub fn get(&self, band: SpectralBand) -> Option<f64> {
        self.values[band.index()]
    }

    pub fn set(&mut self, band: SpectralBand, value: Option<f64>) {
        self.values[band.index()] = value;
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// Projection of a [`Reading`] onto one plotted quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadingField {
    Temperature,
    Humidity,
    LightLevel,
    SoilMoisture,
    Lux,
    Visible,
    Ir,
    Band(SpectralBand),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: Timestamp,
    #[serde(default)]
    pub scalars: Scalars,
    #[serde(default)]
    pub broadband: Option<BroadbandLight>,
    #[serde(default)]
    pub spectral: Option<Spectral>,
}

impl Reading {
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    /// Value of `field`, `None` when the reading did not carry it.
    pub fn value(&self, field: ReadingField) -> Option<f64> {
        match field {
            ReadingField::Temperature => self.scalars.temperature,
            ReadingField::Humidity => self.scalars.humidity,
            ReadingField::LightLevel => self.scalars.light_level,
            ReadingField::SoilMoisture => self.scalars.soil_moisture,
            ReadingField::Lux => self.broadband.and_then(|b| b.lux),
            ReadingField::Visible => self.broadband.and_then(|b| b.visible),
            ReadingField::Ir => self.broadband.and_then(|b| b.ir),
            ReadingField::Band(band) => self.spectral.and_then(|s| s.get(band)),
        }
    }
}

/// Readings of one sensor, ascending by timestamp with unique timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series(Vec<Reading>);

impl Series {
    /// Sorts by timestamp. On duplicate timestamps the later reading wins.
    pub fn from_readings(mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|reading| reading.timestamp);
        let mut deduped: Vec<Reading> = Vec::with_capacity(readings.len());
        for reading in readings {
            match deduped.last_mut() {
                Some(last) if last.timestamp == reading.timestamp => *last = reading,
                _ => deduped.push(reading),
            }
        }
        Self(deduped)
    }

    pub fn as_slice(&self) -> &[Reading] {
        &self.0
    }

    pub fn timestamps(&self) -> BTreeSet<Timestamp> {
        self.0.iter().map(|reading| reading.timestamp).collect()
    }
}

impl Deref for Series {
    type Target = [Reading];

    fn deref(&self) -> &[Reading] {
        &self.0
    }
}

/// Whole feed document as pushed at the feed root: sensor id -> snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedDocument(Map<String, Value>);

#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feed document root must be a JSON object")]
    NotAnObject,
}

impl FeedDocument {
    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            _ => Err(SnapshotError::NotAnObject),
        }
    }

    pub fn sensor_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn insert(&mut self, id: impl Into<String>, snapshot: Value) {
        self.0.insert(id.into(), snapshot);
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let data = fs::read(path)?;
        let value: Value = serde_json::from_slice(&data)?;
        Self::from_value(value)
    }
}
