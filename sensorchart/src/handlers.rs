use crate::commands::Commands;
use crate::output::*;
use feed::InProcessFeed;
use readings::FeedDocument;
use sensorchart_core::{
    ChannelGroup, ChartConfig, ChartSession, Clock, FileSelectionStore, SessionOptions,
    SystemClock,
};
use std::path::Path;

type Session = ChartSession<InProcessFeed, FileSelectionStore>;

pub fn handle_command(
    command: Commands,
    config: &ChartConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Sensors {
            snapshot,
            json_query,
        } => {
            let session = open_session(&snapshot, config)?;
            let registry = session.registry();
            if json_query {
                let sensors: Vec<serde_json::Value> = registry
                    .all_series()
                    .map(|(id, series)| {
                        serde_json::json!({
                            "id": id,
                            "readings": series.len(),
                            "selected": registry.selected() == Some(id),
                        })
                    })
                    .collect();
                print_json(&sensors);
            } else {
                let lines: Vec<SensorLine<'_>> = registry
                    .all_series()
                    .map(|(id, series)| SensorLine {
                        id,
                        readings: series.len(),
                        selected: registry.selected() == Some(id),
                    })
                    .collect();
                print_sensor_list(&lines);
            }
        }
        Commands::Render {
            snapshot,
            sensor,
            window,
            show,
            now,
            json_query,
        } => {
            let mut session = open_session(&snapshot, config)?;
            if let Some(id) = sensor {
                session.select(&id)?;
                session.pump()?;
            }
            if let Some(ordinal) = window {
                if !session.set_window(ordinal) {
                    print_error(&format!(
                        "Unknown window {ordinal}, keeping {}",
                        session.window().label()
                    ));
                }
            }
            for name in &show {
                match ChannelGroup::parse(name) {
                    Some(group) => {
                        session.set_group_hidden(group, false);
                    }
                    None => print_error(&format!("Unknown channel group '{name}'")),
                }
            }
            let frame = session.frame(now.unwrap_or_else(|| SystemClock.now()));
            if json_query {
                print_json(&frame);
            } else {
                print_chart(&frame);
            }
        }
        Commands::Overview {
            snapshot,
            window,
            now,
            json_query,
        } => {
            let mut session = open_session(&snapshot, config)?;
            if let Some(ordinal) = window {
                if !session.set_overview_window(ordinal) {
                    print_error(&format!(
                        "Unknown window {ordinal}, keeping {}",
                        session.overview_window().label()
                    ));
                }
            }
            let frame = session.overview(now.unwrap_or_else(|| SystemClock.now()));
            if json_query {
                print_json(&frame);
            } else {
                print_overview(&frame);
            }
        }
    }
    Ok(())
}

/// Publishes the snapshot file into an in-process feed and lets a fresh
/// session consume it.
fn open_session(
    snapshot: &Path,
    config: &ChartConfig,
) -> Result<Session, Box<dyn std::error::Error>> {
    let document = FeedDocument::load_from_file(snapshot)?;
    let options = SessionOptions::from_config(config)?;
    let feed = InProcessFeed::new();
    feed.publish(&options.feed_root, document.into_value())?;

    let store = FileSelectionStore::new(&config.store.path);
    let mut session = ChartSession::new(feed, store, options);
    session.start()?;
    session.pump()?;
    Ok(session)
}
