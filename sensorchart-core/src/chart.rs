use crate::channels::{
    transform, transform_sensors, AxisId, ChannelCatalog, ChannelSeries, SensorBundle,
};
use crate::registry::SelectionStatus;
use crate::visibility::{GroupState, VisibilityController};
use crate::window::{filter, WindowSelector};
use readings::{Reading, Timestamp};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisPosition {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisConfig {
    pub position: AxisPosition,
    /// Whether this axis draws its grid lines over the chart area.
    pub overlay_grid: bool,
    pub begin_at_zero: bool,
    pub title: String,
}

pub fn axis_config(axis: AxisId) -> AxisConfig {
    let (position, overlay_grid, title) = match axis {
        AxisId::Primary => (
            AxisPosition::Left,
            true,
            "Temperature / Humidity / Soil / Light Level",
        ),
        AxisId::Secondary => (AxisPosition::Right, false, "TSL2591"),
        AxisId::Tertiary => (AxisPosition::Right, false, "AS7341"),
    };
    AxisConfig {
        position,
        overlay_grid,
        begin_at_zero: true,
        title: title.to_string(),
    }
}

/// Axes referenced by `channels`.
pub fn axis_layout(channels: &[ChannelSeries]) -> BTreeMap<AxisId, AxisConfig> {
    channels
        .iter()
        .map(|channel| (channel.axis, axis_config(channel.axis)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    /// No feed event has arrived yet.
    NoFeed,
    /// Feed is up but there is no sensor to show.
    NoSelection,
    /// Nothing inside the window.
    Empty,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowInfo {
    pub ordinal: usize,
    pub label: String,
    pub seconds: u64,
}

impl From<&WindowSelector> for WindowInfo {
    fn from(selector: &WindowSelector) -> Self {
        Self {
            ordinal: selector.ordinal(),
            label: selector.label().to_string(),
            seconds: selector.seconds(),
        }
    }
}

/// Everything a renderer needs for the single-sensor chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub sensor_id: Option<String>,
    pub selection: SelectionStatus,
    pub status: FrameStatus,
    pub now: Timestamp,
    pub window: WindowInfo,
    pub datasets: Vec<ChannelSeries>,
    pub axes: BTreeMap<AxisId, AxisConfig>,
    pub groups: Vec<GroupState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewFrame {
    pub status: FrameStatus,
    pub now: Timestamp,
    pub window: WindowInfo,
    pub sensors: Vec<SensorBundle>,
    pub axes: BTreeMap<AxisId, AxisConfig>,
}

pub struct ChartInputs<'a> {
    pub sensor_id: Option<&'a str>,
    pub selection: SelectionStatus,
    pub series: &'a [Reading],
    pub feed_seen: bool,
}

pub fn chart_frame(
    inputs: ChartInputs<'_>,
    window: &WindowSelector,
    now: Timestamp,
    catalog: &ChannelCatalog,
    visibility: &VisibilityController,
) -> ChartFrame {
    let visible = filter(inputs.series, window.seconds(), now);
    let status = if !inputs.feed_seen {
        FrameStatus::NoFeed
    } else if inputs.sensor_id.is_none() {
        FrameStatus::NoSelection
    } else if visible.is_empty() {
        FrameStatus::Empty
    } else {
        FrameStatus::Data
    };
    let datasets = visibility.apply_visibility(transform(visible, catalog));
    let axes = axis_layout(&datasets);
    ChartFrame {
        sensor_id: inputs.sensor_id.map(str::to_string),
        selection: inputs.selection,
        status,
        now,
        window: WindowInfo::from(window),
        datasets,
        axes,
        groups: visibility.states(),
    }
}

pub fn overview_frame<'a, I>(
    sensors: I,
    feed_seen: bool,
    window: &WindowSelector,
    now: Timestamp,
    catalog: &ChannelCatalog,
) -> OverviewFrame
where
    I: IntoIterator<Item = (&'a str, &'a [Reading])>,
{
    let seconds = window.seconds();
    let bundles = transform_sensors(
        sensors
            .into_iter()
            .map(|(id, series)| (id, filter(series, seconds, now))),
        catalog,
    );
    let status = if !feed_seen {
        FrameStatus::NoFeed
    } else if bundles.iter().any(|bundle| bundle.has_data) {
        FrameStatus::Data
    } else {
        FrameStatus::Empty
    };
    let axes = catalog
        .iter()
        .map(|channel| (channel.axis, axis_config(channel.axis)))
        .collect();
    OverviewFrame {
        status,
        now,
        window: WindowInfo::from(window),
        sensors: bundles,
        axes,
    }
}
