use readings::{
    normalize_snapshot, FeedDocument, ReadingError, ReadingField, Series, SpectralBand,
};
use serde_json::json;
use std::collections::BTreeSet;

#[test]
fn normalizes_snapshot_in_timestamp_order() {
    let snapshot = json!({
        "1100": {"temperature": 21.0},
        "1000": {"temperature": 20.0},
        "1050": {"temperature": 20.5, "humidity": 40.0},
    });
    let normalized = normalize_snapshot(&snapshot);

    assert!(normalized.is_clean());
    let timestamps: Vec<i64> = normalized.series.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![1000, 1050, 1100]);
    assert_eq!(normalized.series[1].scalars.humidity, Some(40.0));
}

#[test]
fn malformed_entries_are_dropped_and_reported() {
    let snapshot = json!({
        "1000": {"temperature": 20.0},
        "yesterday": {"temperature": 19.0},
        "1100": 42,
        "1200": {"humidity": 55.0},
    });
    let normalized = normalize_snapshot(&snapshot);

    let timestamps: Vec<i64> = normalized.series.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![1000, 1200]);
    assert_eq!(normalized.dropped.len(), 2);
    assert!(normalized
        .dropped
        .contains(&ReadingError::MalformedTimestamp("yesterday".to_string())));
    assert!(normalized
        .dropped
        .contains(&ReadingError::MalformedValueBag("1100".to_string())));
}

#[test]
fn timestamp_key_set_round_trips() {
    let snapshot = json!({
        "1700000000": {"temperature": 1.0},
        "1700000060": {},
        "1700000120": {"as7341": {"clear": 3.0}},
        "bogus": {"temperature": 2.0},
    });
    let normalized = normalize_snapshot(&snapshot);

    let expected: BTreeSet<i64> = snapshot
        .as_object()
        .unwrap()
        .keys()
        .filter_map(|k| k.parse().ok())
        .collect();
    assert_eq!(normalized.series.timestamps(), expected);
}

#[test]
fn missing_fields_stay_absent() {
    let snapshot = json!({"1000": {"temperature": 20.0}});
    let normalized = normalize_snapshot(&snapshot);
    let reading = &normalized.series[0];

    assert_eq!(reading.value(ReadingField::Temperature), Some(20.0));
    assert_eq!(reading.value(ReadingField::Humidity), None);
    assert_eq!(reading.value(ReadingField::Lux), None);
    assert_eq!(reading.value(ReadingField::Band(SpectralBand::Nir)), None);
}

#[test]
fn broadband_fields_are_individually_optional() {
    let snapshot = json!({"1000": {"tsl2591": {"lux": 120.5, "ir": 3}}});
    let reading = &normalize_snapshot(&snapshot).series[0];

    assert_eq!(reading.value(ReadingField::Lux), Some(120.5));
    assert_eq!(reading.value(ReadingField::Visible), None);
    assert_eq!(reading.value(ReadingField::Ir), Some(3.0));
}

#[test]
fn resnapshot_prunes_vanished_timestamps() {
    let first = normalize_snapshot(&json!({"1000": {}, "1100": {}}));
    let second = normalize_snapshot(&json!({"1100": {}, "1200": {}}));

    assert_eq!(first.series.timestamps(), BTreeSet::from([1000, 1100]));
    assert_eq!(second.series.timestamps(), BTreeSet::from([1100, 1200]));
}

#[test]
fn null_and_scalar_snapshots_are_empty() {
    assert!(normalize_snapshot(&serde_json::Value::Null).series.is_empty());
    assert!(normalize_snapshot(&json!("offline")).series.is_empty());
    assert!(normalize_snapshot(&json!([])).series.is_empty());
}

#[test]
fn series_keeps_last_duplicate() {
    let mut early = readings::Reading::new(5);
    early.scalars.temperature = Some(1.0);
    let mut late = readings::Reading::new(5);
    late.scalars.temperature = Some(2.0);

    let series = Series::from_readings(vec![early, late]);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].scalars.temperature, Some(2.0));
}

#[test]
fn save_and_load_feed_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.json");

    let mut document = FeedDocument::default();
    document.insert("greenhouse", json!({"1000": {"temperature": 20.0}}));
    document.insert("porch", json!({}));
    document.save_to_file(&path).unwrap();

    let loaded = FeedDocument::load_from_file(&path).unwrap();
    assert_eq!(loaded, document);
    let ids: Vec<&str> = loaded.sensor_ids().collect();
    assert_eq!(ids, vec!["greenhouse", "porch"]);
}

#[test]
fn feed_document_rejects_non_object_root() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    assert!(matches!(
        FeedDocument::load_from_file(&path),
        Err(readings::SnapshotError::NotAnObject)
    ));
}
