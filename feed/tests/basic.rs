use feed::{Feed, FeedError, FeedPath, InProcessFeed};
use serde_json::json;

fn path(raw: &str) -> FeedPath {
    FeedPath::parse(raw).unwrap()
}

#[test]
fn subscribe_on_empty_path_delivers_nothing() {
    let feed = InProcessFeed::new();
    let sub = feed.subscribe(&path("sensors")).unwrap();
    assert!(sub.try_recv().unwrap().is_none());
}

#[test]
fn subscribe_delivers_current_value() {
    let feed = InProcessFeed::new();
    feed.publish(&path("sensors/a"), json!({"1000": {"temperature": 20.0}}))
        .unwrap();

    let sub = feed.subscribe(&path("sensors/a")).unwrap();
    let event = sub.try_recv().unwrap().expect("initial snapshot");
    assert_eq!(event.path, path("sensors/a"));
    assert_eq!(event.snapshot, json!({"1000": {"temperature": 20.0}}));
    assert!(sub.try_recv().unwrap().is_none());
}

#[test]
fn publish_reaches_ancestors_and_descendants() {
    let feed = InProcessFeed::new();
    let root = feed.subscribe(&path("sensors")).unwrap();
    let a = feed.subscribe(&path("sensors/a")).unwrap();
    let b = feed.subscribe(&path("sensors/b")).unwrap();

    let delivered = feed
        .publish(&path("sensors"), json!({"a": {"1": {}}, "b": {"2": {}}}))
        .unwrap();
    assert_eq!(delivered, 3);
    assert_eq!(a.try_recv().unwrap().unwrap().snapshot, json!({"1": {}}));
    assert_eq!(b.try_recv().unwrap().unwrap().snapshot, json!({"2": {}}));
    root.try_recv().unwrap().unwrap();

    let delivered = feed.publish(&path("sensors/a"), json!({"3": {}})).unwrap();
    assert_eq!(delivered, 2);
    assert!(b.try_recv().unwrap().is_none());
    assert_eq!(
        root.try_recv().unwrap().unwrap().snapshot,
        json!({"a": {"3": {}}, "b": {"2": {}}})
    );
}

#[test]
fn events_carry_whole_snapshot_not_delta() {
    let feed = InProcessFeed::new();
    let sub = feed.subscribe(&path("sensors/a")).unwrap();
    feed.publish(&path("sensors/a/1000"), json!({"temperature": 1.0}))
        .unwrap();
    feed.publish(&path("sensors/a/1100"), json!({"temperature": 2.0}))
        .unwrap();

    sub.try_recv().unwrap().unwrap();
    let second = sub.try_recv().unwrap().unwrap();
    assert_eq!(
        second.snapshot,
        json!({"1000": {"temperature": 1.0}, "1100": {"temperature": 2.0}})
    );
}

#[test]
fn latest_coalesces_pending_events() {
    let feed = InProcessFeed::new();
    let sub = feed.subscribe(&path("s")).unwrap();
    feed.publish(&path("s"), json!(1)).unwrap();
    feed.publish(&path("s"), json!(2)).unwrap();
    feed.publish(&path("s"), json!(3)).unwrap();

    assert_eq!(sub.latest().unwrap().unwrap().snapshot, json!(3));
    assert!(sub.latest().unwrap().is_none());
}

#[test]
fn dropping_subscription_unsubscribes() {
    let feed = InProcessFeed::new();
    let sub = feed.subscribe(&path("sensors/a")).unwrap();
    assert_eq!(feed.subscriber_count(), 1);
    drop(sub);
    assert_eq!(feed.subscriber_count(), 0);
    assert_eq!(feed.publish(&path("sensors/a"), json!({})).unwrap(), 0);
}

#[test]
fn publishing_null_deletes_node() {
    let feed = InProcessFeed::new();
    feed.publish(&path("sensors/a"), json!({"1": {}})).unwrap();
    let sub = feed.subscribe(&path("sensors/a")).unwrap();
    sub.try_recv().unwrap();

    feed.publish(&path("sensors/a"), serde_json::Value::Null)
        .unwrap();
    assert!(sub.try_recv().unwrap().unwrap().snapshot.is_null());
    assert_eq!(feed.value(&path("sensors/a")).unwrap(), None);
}

#[test]
fn closed_feed_reports_error() {
    let feed = InProcessFeed::new();
    let sub = feed.subscribe(&path("sensors")).unwrap();
    drop(feed);
    assert_eq!(sub.try_recv().unwrap_err(), FeedError::Closed);
}

#[test]
fn child_path_validation() {
    let root = path("sensors");
    assert_eq!(root.child("a").unwrap(), path("sensors/a"));
    assert!(root.child("a/b").is_err());
    assert!(root.child("  ").is_err());
    assert_eq!(root.to_string(), "/sensors");
}
