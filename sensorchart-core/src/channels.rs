use readings::{Reading, ReadingField, SpectralBand};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Value axis a channel is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AxisId {
    #[serde(rename = "y")]
    Primary,
    #[serde(rename = "y1")]
    Secondary,
    #[serde(rename = "y2")]
    Tertiary,
}

impl AxisId {
    pub fn key(self) -> &'static str {
        match self {
            AxisId::Primary => "y",
            AxisId::Secondary => "y1",
            AxisId::Tertiary => "y2",
        }
    }
}

/// Channels toggled together. Base channels have no group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelGroup {
    /// TSL2591 lux / visible / IR
    Broadband,
    /// AS7341 bands
    Spectral,
}

impl ChannelGroup {
    pub fn id(self) -> &'static str {
        match self {
            ChannelGroup::Broadband => "broadband",
            ChannelGroup::Spectral => "spectral",
        }
    }

    /// Accepts group ids and sensor-model aliases, ignoring case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "broadband" | "tsl2591" => Some(ChannelGroup::Broadband),
            "spectral" | "as7341" => Some(ChannelGroup::Spectral),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Rgb(u8, u8, u8),
    Hsl {
        hue: u16,
        saturation: u8,
        lightness: u8,
    },
}

impl Color {
    pub fn css(&self) -> String {
        match *self {
            Color::Rgb(r, g, b) => format!("rgb({r}, {g}, {b})"),
            Color::Hsl {
                hue,
                saturation,
                lightness,
            } => format!("hsl({hue}, {saturation}%, {lightness}%)"),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.css())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDefinition {
    pub label: String,
    pub axis: AxisId,
    pub color: Color,
    pub group: Option<ChannelGroup>,
    pub field: ReadingField,
}

impl ChannelDefinition {
    fn new(
        label: impl Into<String>,
        field: ReadingField,
        axis: AxisId,
        color: Color,
        group: Option<ChannelGroup>,
    ) -> Self {
        Self {
            label: label.into(),
            axis,
            color,
            group,
            field,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate channel label '{0}'")]
    DuplicateLabel(String),
}

/// Ordered channel list with labels unique ignoring case.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelCatalog {
    channels: Vec<ChannelDefinition>,
}

impl ChannelCatalog {
    pub fn new(channels: Vec<ChannelDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for channel in &channels {
            if !seen.insert(channel.label.to_uppercase()) {
                return Err(CatalogError::DuplicateLabel(channel.label.clone()));
            }
        }
        Ok(Self { channels })
    }

    /// Four base channels, three broadband channels, ten spectral bands.
    pub fn standard() -> Self {
        let mut channels = base_channels();
        channels.extend([
            ChannelDefinition::new(
                "TSL2591 Lux",
                ReadingField::Lux,
                AxisId::Secondary,
                Color::Rgb(255, 99, 132),
                Some(ChannelGroup::Broadband),
            ),
            ChannelDefinition::new(
                "TSL2591 Visible",
                ReadingField::Visible,
                AxisId::Secondary,
                Color::Rgb(255, 159, 64),
                Some(ChannelGroup::Broadband),
            ),
            ChannelDefinition::new(
                "TSL2591 IR",
                ReadingField::Ir,
                AxisId::Secondary,
                Color::Rgb(201, 203, 207),
                Some(ChannelGroup::Broadband),
            ),
        ]);
        channels.extend(SpectralBand::ALL.into_iter().enumerate().map(|(idx, band)| {
            ChannelDefinition::new(
                format!("AS7341 {}", band.name().to_uppercase()),
                ReadingField::Band(band),
                AxisId::Tertiary,
                Color::Hsl {
                    hue: idx as u16 * 36,
                    saturation: 100,
                    lightness: 50,
                },
                Some(ChannelGroup::Spectral),
            )
        }));
        Self { channels }
    }

    /// Base channels only, as drawn by the multi-sensor overview.
    pub fn base_only() -> Self {
        Self {
            channels: base_channels(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelDefinition> {
        self.channels.iter()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn find(&self, label: &str) -> Option<&ChannelDefinition> {
        let label = label.trim();
        self.channels
            .iter()
            .find(|channel| channel.label.eq_ignore_ascii_case(label))
    }

    pub fn labels_in(&self, group: ChannelGroup) -> Vec<&str> {
        self.channels
            .iter()
            .filter(|channel| channel.group == Some(group))
            .map(|channel| channel.label.as_str())
            .collect()
    }
}

impl Default for ChannelCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn base_channels() -> Vec<ChannelDefinition> {
    vec![
        ChannelDefinition::new(
            "Temperature (°C)",
            ReadingField::Temperature,
            AxisId::Primary,
            Color::Rgb(75, 192, 192),
            None,
        ),
        ChannelDefinition::new(
            "Humidity (%)",
            ReadingField::Humidity,
            AxisId::Primary,
            Color::Rgb(153, 102, 255),
            None,
        ),
        ChannelDefinition::new(
            "Light Level (%)",
            ReadingField::LightLevel,
            AxisId::Primary,
            Color::Rgb(255, 206, 86),
            None,
        ),
        ChannelDefinition::new(
            "Soil Moisture (%)",
            ReadingField::SoilMoisture,
            AxisId::Primary,
            Color::Rgb(54, 162, 235),
            None,
        ),
    ]
}

/// `y` is `None` where the reading lacks the value; renderers draw a gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelPoint {
    /// Epoch milliseconds.
    pub x: i64,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSeries {
    pub label: String,
    pub axis: AxisId,
    pub color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<ChannelGroup>,
    pub points: Vec<ChannelPoint>,
    pub hidden: bool,
}

impl ChannelSeries {
    pub fn present_values(&self) -> usize {
        self.points.iter().filter(|p| p.y.is_some()).count()
    }
}

/// One channel series per catalog entry, in catalog order. Grouped
/// channels start hidden.
pub fn transform(series: &[Reading], catalog: &ChannelCatalog) -> Vec<ChannelSeries> {
    catalog
        .iter()
        .map(|channel| ChannelSeries {
            label: channel.label.clone(),
            axis: channel.axis,
            color: channel.color,
            group: channel.group,
            points: series
                .iter()
                .map(|reading| ChannelPoint {
                    x: reading.timestamp.saturating_mul(1000),
                    y: reading.value(channel.field),
                })
                .collect(),
            hidden: channel.group.is_some(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorBundle {
    pub sensor_id: String,
    pub has_data: bool,
    pub channels: Vec<ChannelSeries>,
}

/// Multi-sensor variant of [`transform`]: one bundle per sensor, ordered by
/// sensor id. Sensors without readings are kept with `has_data == false`.
pub fn transform_sensors<'a, I>(sensors: I, catalog: &ChannelCatalog) -> Vec<SensorBundle>
where
    I: IntoIterator<Item = (&'a str, &'a [Reading])>,
{
    let mut bundles: Vec<SensorBundle> = sensors
        .into_iter()
        .map(|(sensor_id, series)| SensorBundle {
            sensor_id: sensor_id.to_string(),
            has_data: !series.is_empty(),
            channels: transform(series, catalog),
        })
        .collect();
    bundles.sort_by(|a, b| a.sensor_id.cmp(&b.sensor_id));
    bundles
}
