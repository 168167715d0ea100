use crate::channels::{ChannelCatalog, ChannelGroup};
use crate::chart::{chart_frame, overview_frame, ChartFrame, ChartInputs, OverviewFrame};
use crate::config::{ChartConfig, ConfigError};
use crate::registry::{SelectionChange, SensorRegistry};
use crate::store::SelectionStore;
use crate::visibility::VisibilityController;
use crate::window::{Clock, RefreshSchedule, WindowSelector, WindowTable};
use feed::{Feed, FeedError, FeedEvent, FeedPath, Subscription};
use readings::{normalize_snapshot, Reading, Timestamp};
use serde_json::Value;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub feed_root: FeedPath,
    pub window: WindowSelector,
    pub overview_window: WindowSelector,
    pub refresh: Duration,
}

impl SessionOptions {
    pub fn from_config(config: &ChartConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            feed_root: config.feed_root()?,
            window: config.single_window(),
            overview_window: config.overview_window(),
            refresh: config.refresh_cadence(),
        })
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            feed_root: FeedPath::root()
                .child(crate::config::DEFAULT_FEED_ROOT)
                .unwrap_or_default(),
            window: WindowSelector::new(WindowTable::Compact, 0),
            overview_window: WindowSelector::new(WindowTable::Full, 1),
            refresh: Duration::from_secs(crate::config::DEFAULT_REFRESH_SECONDS),
        }
    }
}

/// One chart view: owns the feed subscriptions, the sensor registry and
/// the group visibility state.
///
/// All mutation happens through `&mut self`; feed events queue up in the
/// subscriptions until [`ChartSession::pump`] handles them one by one.
pub struct ChartSession<F: Feed, S: SelectionStore> {
    feed: F,
    store: S,
    root: FeedPath,
    registry: SensorRegistry,
    catalog: ChannelCatalog,
    overview_catalog: ChannelCatalog,
    visibility: VisibilityController,
    window: WindowSelector,
    overview_window: WindowSelector,
    schedule: RefreshSchedule,
    identities: Option<Subscription>,
    readings: Option<Subscription>,
    feed_seen: bool,
}

impl<F: Feed, S: SelectionStore> ChartSession<F, S> {
    pub fn new(feed: F, store: S, options: SessionOptions) -> Self {
        let persisted = store.load();
        if let Some(id) = &persisted {
            log::debug!("persisted selection '{id}'");
        }
        let catalog = ChannelCatalog::standard();
        let visibility = VisibilityController::new(&catalog);
        Self {
            feed,
            store,
            root: options.feed_root,
            registry: SensorRegistry::new(persisted),
            catalog,
            overview_catalog: ChannelCatalog::base_only(),
            visibility,
            window: options.window,
            overview_window: options.overview_window,
            schedule: RefreshSchedule::new(options.refresh),
            identities: None,
            readings: None,
            feed_seen: false,
        }
    }

    /// Subscribes to the sensor list. Calling it again is a no-op.
    pub fn start(&mut self) -> Result<(), FeedError> {
        if self.identities.is_none() {
            self.identities = Some(self.feed.subscribe(&self.root)?);
        }
        Ok(())
    }

    /// Releases every subscription held by this view.
    pub fn stop(&mut self) {
        self.readings = None;
        self.identities = None;
    }

    /// Handles every queued feed event, one at a time, and returns how many
    /// were processed. A closed feed simply stops producing events.
    pub fn pump(&mut self) -> Result<usize, FeedError> {
        let mut handled = 0;
        while let Some(event) = next_event(self.identities.as_ref()) {
            self.handle_identities(event)?;
            handled += 1;
        }
        while let Some(event) = next_event(self.readings.as_ref()) {
            self.handle_readings(event);
            handled += 1;
        }
        if handled > 0 {
            log::debug!("processed {handled} feed event(s)");
        }
        Ok(handled)
    }

    fn handle_identities(&mut self, event: FeedEvent) -> Result<(), FeedError> {
        self.feed_seen = true;
        let entries = match event.snapshot {
            Value::Object(entries) => entries,
            Value::Null => Default::default(),
            other => {
                log::warn!("sensor list at {} is not an object: {other}", event.path);
                return Ok(());
            }
        };
        let mut sensors = Vec::with_capacity(entries.len());
        for (id, snapshot) in entries {
            match self.root.child(&id) {
                Ok(_) => sensors.push((id, snapshot)),
                Err(err) => log::warn!("skipping sensor '{id}': {err}"),
            }
        }
        let auto = self
            .registry
            .observe_identities(sensors.iter().map(|(id, _)| id.clone()));
        for (id, snapshot) in &sensors {
            let normalized = normalize_snapshot(snapshot);
            self.registry.replace_series(id, normalized.series);
        }
        if let Some(id) = auto {
            self.follow(&id)?;
            self.persist(&id);
        }
        Ok(())
    }

    fn handle_readings(&mut self, event: FeedEvent) {
        self.feed_seen = true;
        let Some(id) = event.path.segments().last() else {
            return;
        };
        if self.registry.selected() != Some(id.as_str()) {
            log::debug!("ignoring readings for unselected sensor '{id}'");
            return;
        }
        if event.snapshot.is_null() {
            log::info!("sensor '{id}' left the feed, keeping its last readings");
            return;
        }
        let normalized = normalize_snapshot(&event.snapshot);
        self.registry.replace_series(id, normalized.series);
    }

    /// Selects `sensor_id`, swapping the readings subscription when the
    /// selection actually changes. Ids that cannot name a feed path are
    /// rejected before anything changes.
    pub fn select(&mut self, sensor_id: &str) -> Result<SelectionChange, FeedError> {
        let path = self.root.child(sensor_id)?;
        let change = self.registry.select(sensor_id);
        if change.is_changed() {
            self.subscribe_readings(path)?;
            self.persist(sensor_id);
        }
        Ok(change)
    }

    fn follow(&mut self, sensor_id: &str) -> Result<(), FeedError> {
        let path = self.root.child(sensor_id)?;
        self.subscribe_readings(path)
    }

    fn subscribe_readings(&mut self, path: FeedPath) -> Result<(), FeedError> {
        // The old subscription must be gone before the new one exists.
        self.readings = None;
        self.readings = Some(self.feed.subscribe(&path)?);
        Ok(())
    }

    fn persist(&mut self, sensor_id: &str) {
        if let Err(err) = self.store.store(sensor_id) {
            log::warn!("failed to persist selection '{sensor_id}': {err}");
        }
    }

    pub fn set_window(&mut self, ordinal: usize) -> bool {
        self.window.select(ordinal)
    }

    pub fn set_overview_window(&mut self, ordinal: usize) -> bool {
        self.overview_window.select(ordinal)
    }

    pub fn toggle_group(&mut self, group_id: &str) -> bool {
        self.visibility.toggle_group(group_id)
    }

    pub fn set_group_hidden(&mut self, group: ChannelGroup, hidden: bool) -> bool {
        self.visibility.set_hidden(group, hidden)
    }

    pub fn frame(&self, now: Timestamp) -> ChartFrame {
        let sensor_id = self.registry.selected();
        let series: &[Reading] = sensor_id
            .map(|id| self.registry.series_for(id))
            .unwrap_or(&[]);
        chart_frame(
            ChartInputs {
                sensor_id,
                selection: self.registry.selection_status(),
                series,
                feed_seen: self.feed_seen,
            },
            &self.window,
            now,
            &self.catalog,
            &self.visibility,
        )
    }

    pub fn overview(&self, now: Timestamp) -> OverviewFrame {
        overview_frame(
            self.registry.all_series(),
            self.feed_seen,
            &self.overview_window,
            now,
            &self.overview_catalog,
        )
    }

    /// Drives the view from a timer: handles pending events and returns a
    /// fresh frame when something changed or the refresh cadence elapsed.
    pub fn tick<C: Clock>(
        &mut self,
        at: Instant,
        clock: &C,
    ) -> Result<Option<ChartFrame>, FeedError> {
        let handled = self.pump()?;
        let due = self.schedule.due(at);
        if handled > 0 || due {
            if !due {
                self.schedule.mark(at);
            }
            return Ok(Some(self.frame(clock.now())));
        }
        Ok(None)
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn visibility(&self) -> &VisibilityController {
        &self.visibility
    }

    pub fn window(&self) -> &WindowSelector {
        &self.window
    }

    pub fn overview_window(&self) -> &WindowSelector {
        &self.overview_window
    }

    pub fn catalog(&self) -> &ChannelCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn readings_path(&self) -> Option<&FeedPath> {
        self.readings.as_ref().map(Subscription::path)
    }
}

fn next_event(subscription: Option<&Subscription>) -> Option<FeedEvent> {
    let subscription = subscription?;
    match subscription.try_recv() {
        Ok(event) => event,
        Err(err) => {
            log::warn!("feed at {} unavailable: {err}", subscription.path());
            None
        }
    }
}
