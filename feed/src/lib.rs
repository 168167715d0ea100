use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, Weak};

/// `/`-separated location in the feed tree. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FeedPath(Vec<String>);

impl FeedPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn parse(path: &str) -> Result<Self, FeedError> {
        let trimmed = path.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(FeedError::InvalidPath(path.to_string()));
            }
            segments.push(segment.to_string());
        }
        Ok(Self(segments))
    }

    pub fn child(&self, segment: &str) -> Result<Self, FeedError> {
        if segment.trim().is_empty() || segment.contains('/') {
            return Err(FeedError::InvalidPath(format!("{self}/{segment}")));
        }
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True when one path is a prefix of the other, so a write at either
    /// changes the value seen at the other.
    pub fn overlaps(&self, other: &FeedPath) -> bool {
        let shared = self.0.len().min(other.0.len());
        self.0[..shared] == other.0[..shared]
    }
}

impl fmt::Display for FeedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

/// Full value at a subscribed path. Each event replaces the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent {
    pub path: FeedPath,
    pub snapshot: Value,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("invalid feed path '{0}'")]
    InvalidPath(String),
    #[error("feed closed")]
    Closed,
    #[error("feed state poisoned")]
    Poisoned,
}

pub trait Feed {
    fn subscribe(&self, path: &FeedPath) -> Result<Subscription, FeedError>;
}

struct Subscriber {
    path: FeedPath,
    sender: Sender<FeedEvent>,
}

#[derive(Default)]
struct HubState {
    root: Value,
    subscribers: HashMap<u64, Subscriber>,
    next_id: u64,
}

impl HubState {
    fn notify(&mut self, written: &FeedPath) -> usize {
        let mut delivered = 0;
        let mut gone = Vec::new();
        for (id, subscriber) in &self.subscribers {
            if !subscriber.path.overlaps(written) {
                continue;
            }
            let event = FeedEvent {
                path: subscriber.path.clone(),
                snapshot: value_at(&self.root, subscriber.path.segments())
                    .cloned()
                    .unwrap_or(Value::Null),
            };
            if subscriber.sender.send(event).is_ok() {
                delivered += 1;
            } else {
                gone.push(*id);
            }
        }
        for id in gone {
            self.subscribers.remove(&id);
        }
        delivered
    }
}

/// Push feed living in this process. Cloning shares the same tree.
#[derive(Clone, Default)]
pub struct InProcessFeed {
    state: Arc<Mutex<HubState>>,
}

impl InProcessFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the value at `path` and notifies every overlapping
    /// subscription. Publishing `null` deletes the node. Returns the number
    /// of events delivered.
    pub fn publish(&self, path: &FeedPath, value: Value) -> Result<usize, FeedError> {
        let mut state = self.state.lock().map_err(|_| FeedError::Poisoned)?;
        set_at(&mut state.root, path.segments(), value);
        let delivered = state.notify(path);
        log::debug!("published {path} to {delivered} subscription(s)");
        Ok(delivered)
    }

    pub fn value(&self, path: &FeedPath) -> Result<Option<Value>, FeedError> {
        let state = self.state.lock().map_err(|_| FeedError::Poisoned)?;
        Ok(value_at(&state.root, path.segments()).cloned())
    }

    pub fn subscriber_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.subscribers.len())
            .unwrap_or(0)
    }
}

impl Feed for InProcessFeed {
    /// The current value, when one exists, is delivered right away.
    fn subscribe(&self, path: &FeedPath) -> Result<Subscription, FeedError> {
        let mut state = self.state.lock().map_err(|_| FeedError::Poisoned)?;
        let (sender, receiver) = mpsc::channel();
        if let Some(current) = value_at(&state.root, path.segments()) {
            let _ = sender.send(FeedEvent {
                path: path.clone(),
                snapshot: current.clone(),
            });
        }
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.insert(
            id,
            Subscriber {
                path: path.clone(),
                sender,
            },
        );
        log::debug!("subscription {id} opened on {path}");
        Ok(Subscription {
            id,
            path: path.clone(),
            receiver,
            hub: Arc::downgrade(&self.state),
        })
    }
}

/// Owned handle on one feed path. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    path: FeedPath,
    receiver: Receiver<FeedEvent>,
    hub: Weak<Mutex<HubState>>,
}

impl Subscription {
    pub fn path(&self) -> &FeedPath {
        &self.path
    }

    pub fn try_recv(&self) -> Result<Option<FeedEvent>, FeedError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(FeedError::Closed),
        }
    }

    /// Drains pending events and keeps only the newest one.
    pub fn latest(&self) -> Result<Option<FeedEvent>, FeedError> {
        let mut latest = None;
        loop {
            match self.try_recv() {
                Ok(Some(event)) => latest = Some(event),
                Ok(None) => return Ok(latest),
                Err(err) if latest.is_none() => return Err(err),
                Err(_) => return Ok(latest),
            }
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.hub.upgrade() {
            if let Ok(mut state) = state.lock() {
                state.subscribers.remove(&self.id);
                log::debug!("subscription {} on {} released", self.id, self.path);
            }
        }
    }
}

fn value_at<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

fn set_at(node: &mut Value, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };
    if value.is_null() {
        if rest.is_empty() {
            map.remove(first);
            return;
        }
        if !map.contains_key(first) {
            return;
        }
    }
    let child = map.entry(first.clone()).or_insert(Value::Null);
    set_at(child, rest, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paths_overlap_along_one_branch() {
        let root = FeedPath::parse("sensors").unwrap();
        let child = FeedPath::parse("sensors/a").unwrap();
        let sibling = FeedPath::parse("sensors/b").unwrap();
        assert!(root.overlaps(&child));
        assert!(child.overlaps(&root));
        assert!(!child.overlaps(&sibling));
        assert!(FeedPath::root().overlaps(&sibling));
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(FeedPath::parse("sensors//a").is_err());
        assert_eq!(FeedPath::parse("/sensors/").unwrap().segments(), ["sensors"]);
    }

    #[test]
    fn set_at_creates_and_deletes_nodes() {
        let mut root = Value::Null;
        let path = FeedPath::parse("a/b").unwrap();
        set_at(&mut root, path.segments(), json!(1));
        assert_eq!(root, json!({"a": {"b": 1}}));
        set_at(&mut root, path.segments(), Value::Null);
        assert_eq!(root, json!({"a": {}}));
        assert!(value_at(&root, path.segments()).is_none());
    }
}
