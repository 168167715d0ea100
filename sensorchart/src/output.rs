use sensorchart_core::{ChartFrame, FrameStatus, OverviewFrame, SelectionStatus};
use serde::Serialize;

pub fn print_info(message: &str) {
    println!("[sensorchart][INFO] {message}");
}

pub fn print_error(message: &str) {
    eprintln!("[sensorchart][ERROR]: {message}");
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(data) => println!("{data}"),
        Err(err) => print_error(&format!("Failed to encode output: {err}")),
    }
}

pub struct SensorLine<'a> {
    pub id: &'a str,
    pub readings: usize,
    pub selected: bool,
}

pub fn print_sensor_list(sensors: &[SensorLine<'_>]) {
    if sensors.is_empty() {
        print_info("No sensors found");
        return;
    }
    print_info("List of sensors:");
    for sensor in sensors {
        let marker = if sensor.selected { "*" } else { " " };
        let noun = if sensor.readings == 1 { "reading" } else { "readings" };
        println!("{marker} {} - {} {noun}", sensor.id, sensor.readings);
    }
}

fn status_text(status: FrameStatus) -> &'static str {
    match status {
        FrameStatus::NoFeed => "waiting for feed",
        FrameStatus::NoSelection => "no sensor selected",
        FrameStatus::Empty => "no readings in window",
        FrameStatus::Data => "ok",
    }
}

pub fn print_chart(frame: &ChartFrame) {
    let sensor = frame.sensor_id.as_deref().unwrap_or("(none)");
    print_info(&format!(
        "Sensor {sensor} - window {} - {}",
        frame.window.label,
        status_text(frame.status)
    ));
    if frame.selection == SelectionStatus::Stale {
        print_info("Sensor is no longer listed by the feed, showing last known readings");
    }
    for dataset in &frame.datasets {
        if dataset.hidden {
            continue;
        }
        let latest = dataset
            .points
            .iter()
            .rev()
            .find_map(|point| point.y)
            .map(|value| format!("{value}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} [{}] {} point(s), latest {latest}",
            dataset.label,
            dataset.axis.key(),
            dataset.present_values()
        );
    }
    for group in &frame.groups {
        let state = if group.hidden { "hidden" } else { "shown" };
        println!("group {} ({} channels): {state}", group.group, group.channels);
    }
}

pub fn print_overview(frame: &OverviewFrame) {
    print_info(&format!(
        "Overview - window {} - {}",
        frame.window.label,
        status_text(frame.status)
    ));
    for bundle in &frame.sensors {
        if !bundle.has_data {
            println!("{}: no data", bundle.sensor_id);
            continue;
        }
        let points = bundle
            .channels
            .first()
            .map(|channel| channel.points.len())
            .unwrap_or(0);
        println!("{}: {points} reading(s)", bundle.sensor_id);
    }
}
