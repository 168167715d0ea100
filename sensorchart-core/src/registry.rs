use readings::{Reading, Series};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    /// Nothing selected yet.
    None,
    /// Selected sensor is present in the latest identity snapshot.
    Live,
    /// Selected explicitly before the feed ever listed it.
    Pending,
    /// Listed earlier, missing from the latest snapshot. The last known
    /// series is still served.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Unchanged,
    Changed { previous: Option<String> },
}

impl SelectionChange {
    pub fn is_changed(&self) -> bool {
        matches!(self, SelectionChange::Changed { .. })
    }
}

#[derive(Debug, Default)]
pub struct SensorRegistry {
    series: HashMap<String, Series>,
    known: BTreeSet<String>,
    last_observed: BTreeSet<String>,
    selected: Option<String>,
    persisted: Option<String>,
}

impl SensorRegistry {
    /// `persisted` is the selection remembered from an earlier session.
    pub fn new(persisted: Option<String>) -> Self {
        Self {
            persisted,
            ..Self::default()
        }
    }

    /// Records the identities listed by a feed snapshot.
    ///
    /// The first observation with at least one identity picks the
    /// selection: the persisted identity when listed, otherwise the
    /// lexicographically first one. Returns the identity chosen here, if
    /// any. An existing selection is never overridden.
    pub fn observe_identities<I, S>(&mut self, ids: I) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let observed: BTreeSet<String> = ids
            .into_iter()
            .map(Into::into)
            .filter(|id| !id.trim().is_empty())
            .collect();
        for id in &observed {
            if self.known.insert(id.clone()) {
                log::debug!("sensor '{id}' observed");
            }
        }
        self.last_observed = observed;

        if self.selected.is_some() {
            return None;
        }
        let choice = self
            .persisted
            .as_ref()
            .filter(|persisted| self.last_observed.contains(*persisted))
            .or_else(|| self.last_observed.iter().next())
            .cloned()?;
        log::info!("selected sensor '{choice}'");
        self.selected = Some(choice.clone());
        Some(choice)
    }

    /// Selects `id` even when it is not known yet; it may show up in a
    /// later snapshot.
    pub fn select(&mut self, id: &str) -> SelectionChange {
        if self.selected.as_deref() == Some(id) {
            return SelectionChange::Unchanged;
        }
        if !self.known.contains(id) {
            log::debug!("sensor '{id}' selected before being observed");
        }
        let previous = self.selected.replace(id.to_string());
        log::info!("selected sensor '{id}'");
        SelectionChange::Changed { previous }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selection_status(&self) -> SelectionStatus {
        match self.selected.as_ref() {
            None => SelectionStatus::None,
            Some(id) if self.last_observed.contains(id) => SelectionStatus::Live,
            Some(id) if self.known.contains(id) => SelectionStatus::Stale,
            Some(_) => SelectionStatus::Pending,
        }
    }

    /// Empty for sensors without data.
    pub fn series_for(&self, id: &str) -> &[Reading] {
        self.series.get(id).map(Series::as_slice).unwrap_or(&[])
    }

    pub fn replace_series(&mut self, id: &str, series: Series) {
        log::debug!("sensor '{id}' now holds {} reading(s)", series.len());
        self.series.insert(id.to_string(), series);
    }

    pub fn known(&self) -> &BTreeSet<String> {
        &self.known
    }

    pub fn last_observed(&self) -> &BTreeSet<String> {
        &self.last_observed
    }

    /// Every known sensor with its series, ordered by id.
    pub fn all_series(&self) -> impl Iterator<Item = (&str, &[Reading])> {
        self.known
            .iter()
            .map(|id| (id.as_str(), self.series_for(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_identity_wins_when_listed() {
        let mut registry = SensorRegistry::new(Some("sensorB".to_string()));
        let chosen = registry.observe_identities(["sensorA", "sensorB"]);
        assert_eq!(chosen.as_deref(), Some("sensorB"));
        assert_eq!(registry.selected(), Some("sensorB"));
    }

    #[test]
    fn unknown_persisted_identity_falls_back_to_first() {
        let mut registry = SensorRegistry::new(Some("sensorC".to_string()));
        registry.observe_identities(["sensorB", "sensorA"]);
        assert_eq!(registry.selected(), Some("sensorA"));
    }

    #[test]
    fn empty_snapshot_selects_nothing() {
        let mut registry = SensorRegistry::new(None);
        assert_eq!(registry.observe_identities(Vec::<String>::new()), None);
        assert_eq!(registry.selection_status(), SelectionStatus::None);
        registry.observe_identities(["b"]);
        assert_eq!(registry.selected(), Some("b"));
    }

    #[test]
    fn feed_updates_never_override_selection() {
        let mut registry = SensorRegistry::new(None);
        registry.observe_identities(["a", "b"]);
        registry.select("b");
        assert_eq!(registry.observe_identities(["a"]), None);
        assert_eq!(registry.selected(), Some("b"));
        assert_eq!(registry.selection_status(), SelectionStatus::Stale);
        registry.observe_identities(["a", "b"]);
        assert_eq!(registry.selection_status(), SelectionStatus::Live);
    }

    #[test]
    fn identities_are_never_removed() {
        let mut registry = SensorRegistry::new(None);
        registry.observe_identities(["a", "b"]);
        registry.observe_identities(["c"]);
        let known: Vec<&str> = registry.known().iter().map(String::as_str).collect();
        assert_eq!(known, vec!["a", "b", "c"]);
        assert_eq!(registry.last_observed().len(), 1);
    }

    #[test]
    fn selection_is_idempotent_and_optimistic() {
        let mut registry = SensorRegistry::new(None);
        assert_eq!(
            registry.select("ghost"),
            SelectionChange::Changed { previous: None }
        );
        assert_eq!(registry.selection_status(), SelectionStatus::Pending);
        assert_eq!(registry.select("ghost"), SelectionChange::Unchanged);
        assert_eq!(registry.observe_identities(["a"]), None);
        assert_eq!(registry.selected(), Some("ghost"));
    }

    #[test]
    fn unknown_series_is_empty() {
        let registry = SensorRegistry::new(None);
        assert!(registry.series_for("nope").is_empty());
    }
}
