use crate::channels::{ChannelCatalog, ChannelGroup, ChannelSeries};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupState {
    pub group: ChannelGroup,
    pub hidden: bool,
    pub channels: usize,
}

/// Shown/hidden state per channel group, owned by a chart session and kept
/// across dataset rebuilds.
#[derive(Debug, Clone)]
pub struct VisibilityController {
    hidden: BTreeMap<ChannelGroup, bool>,
    membership: HashMap<String, ChannelGroup>,
}

impl VisibilityController {
    /// Every group present in `catalog` starts hidden.
    pub fn new(catalog: &ChannelCatalog) -> Self {
        let mut hidden = BTreeMap::new();
        let mut membership = HashMap::new();
        for channel in catalog.iter() {
            if let Some(group) = channel.group {
                hidden.insert(group, true);
                membership.insert(channel.label.to_uppercase(), group);
            }
        }
        Self { hidden, membership }
    }

    /// Flips the group named by `group_id`. Unknown ids are ignored and
    /// return false.
    pub fn toggle_group(&mut self, group_id: &str) -> bool {
        match ChannelGroup::parse(group_id) {
            Some(group) => self.toggle(group),
            None => {
                log::debug!("ignoring toggle for unknown group '{group_id}'");
                false
            }
        }
    }

    pub fn toggle(&mut self, group: ChannelGroup) -> bool {
        match self.hidden.get_mut(&group) {
            Some(hidden) => {
                *hidden = !*hidden;
                log::debug!("group {group} hidden={}", *hidden);
                true
            }
            None => false,
        }
    }

    pub fn set_hidden(&mut self, group: ChannelGroup, hidden: bool) -> bool {
        match self.hidden.get_mut(&group) {
            Some(state) => {
                *state = hidden;
                true
            }
            None => false,
        }
    }

    pub fn is_hidden(&self, group: ChannelGroup) -> Option<bool> {
        self.hidden.get(&group).copied()
    }

    /// Resolves the channel's group by label, ignoring case. Base channels
    /// are never hidden.
    pub fn is_channel_hidden(&self, label: &str, fallback_group: Option<ChannelGroup>) -> bool {
        let group = self
            .membership
            .get(&label.trim().to_uppercase())
            .copied()
            .or(fallback_group);
        match group {
            None => false,
            Some(group) => self.hidden.get(&group).copied().unwrap_or(true),
        }
    }

    pub fn apply_visibility(&self, mut channels: Vec<ChannelSeries>) -> Vec<ChannelSeries> {
        for channel in &mut channels {
            channel.hidden = self.is_channel_hidden(&channel.label, channel.group);
        }
        channels
    }

    pub fn states(&self) -> Vec<GroupState> {
        self.hidden
            .iter()
            .map(|(group, hidden)| GroupState {
                group: *group,
                hidden: *hidden,
                channels: self.membership.values().filter(|g| *g == group).count(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_start_hidden() {
        let controller = VisibilityController::new(&ChannelCatalog::standard());
        assert_eq!(controller.is_hidden(ChannelGroup::Broadband), Some(true));
        assert_eq!(controller.is_hidden(ChannelGroup::Spectral), Some(true));
        assert!(!controller.is_channel_hidden("Humidity (%)", None));
    }

    #[test]
    fn label_lookup_ignores_case() {
        let mut controller = VisibilityController::new(&ChannelCatalog::standard());
        controller.toggle(ChannelGroup::Broadband);
        assert!(!controller.is_channel_hidden("tsl2591 lux", None));
        assert!(controller.is_channel_hidden("as7341 clear", None));
    }

    #[test]
    fn base_only_catalog_has_no_toggles() {
        let mut controller = VisibilityController::new(&ChannelCatalog::base_only());
        assert!(!controller.toggle_group("spectral"));
        assert!(controller.states().is_empty());
    }

    #[test]
    fn states_count_members() {
        let controller = VisibilityController::new(&ChannelCatalog::standard());
        let states = controller.states();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].group, ChannelGroup::Broadband);
        assert_eq!(states[0].channels, 3);
        assert_eq!(states[1].channels, 10);
    }
}
