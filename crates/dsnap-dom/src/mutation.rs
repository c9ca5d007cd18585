use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Classification of recorded mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// A child node was inserted or removed.
    ChildList,
    /// An attribute was set, changed, or removed.
    Attributes,
    /// A text node's content changed.
    CharacterData,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MutationKind::ChildList => "childList",
            MutationKind::Attributes => "attributes",
            MutationKind::CharacterData => "characterData",
        };
        f.write_str(s)
    }
}

/// One observed mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub kind: MutationKind,
    /// Path of the mutated node (the parent, for child-list mutations) at
    /// the time of the mutation.
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl MutationRecord {
    pub fn new(kind: MutationKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            attribute_name: None,
            old_value: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.attribute_name = Some(name.into());
        self
    }

    pub fn with_old_value(mut self, old: Option<String>) -> Self {
        self.old_value = old;
        self
    }
}

/// Bounds for a [`MutationLog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationLogConfig {
    /// Once the log holds more than this many records it is trimmed.
    pub max_records: usize,
    /// Number of most recent records kept by a trim.
    pub retain_records: usize,
}

impl Default for MutationLogConfig {
    fn default() -> Self {
        Self {
            max_records: 1000,
            retain_records: 500,
        }
    }
}

/// Capped history of observed mutations, oldest first.
#[derive(Clone, Debug)]
pub struct MutationLog {
    config: MutationLogConfig,
    records: Vec<MutationRecord>,
    total_recorded: u64,
    total_trimmed: u64,
}

impl MutationLog {
    /// Create an empty log. `retain_records` is clamped to `max_records`,
    /// so a trim always brings the log back under its cap.
    pub fn new(config: MutationLogConfig) -> Self {
        let config = MutationLogConfig {
            retain_records: config.retain_records.min(config.max_records),
            ..config
        };
        Self {
            config,
            records: Vec::new(),
            total_recorded: 0,
            total_trimmed: 0,
        }
    }

    /// Append a record, trimming to the most recent `retain_records` once
    /// the log exceeds `max_records`.
    pub fn record(&mut self, record: MutationRecord) {
        self.records.push(record);
        self.total_recorded += 1;
        if self.records.len() > self.config.max_records {
            let excess = self.records.len() - self.config.retain_records.min(self.records.len());
            self.records.drain(..excess);
            self.total_trimmed += excess as u64;
            debug!(dropped = excess, kept = self.records.len(), "mutation log trimmed");
        }
    }

    /// Records currently retained, oldest first.
    pub fn records(&self) -> &[MutationRecord] {
        &self.records
    }

    /// Retained records matching a filter.
    pub fn filter<'a>(
        &'a self,
        filter: &'a MutationFilter,
    ) -> impl Iterator<Item = &'a MutationRecord> + 'a {
        self.records.iter().filter(move |r| filter.matches(r))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records observed since creation, including trimmed ones.
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    /// Records discarded by trimming.
    pub fn total_trimmed(&self) -> u64 {
        self.total_trimmed
    }

    pub fn config(&self) -> &MutationLogConfig {
        &self.config
    }

    /// Drop all retained records. Counters are kept.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for MutationLog {
    fn default() -> Self {
        Self::new(MutationLogConfig::default())
    }
}

/// Selects a subset of mutation records.
#[derive(Clone, Debug, Default)]
pub struct MutationFilter {
    /// If set, only records of these kinds match.
    pub kinds: Option<Vec<MutationKind>>,
    /// If set, only attribute records for these names match.
    pub attribute_names: Option<Vec<String>>,
    /// If set, only records whose target is this path or below it match.
    pub target_prefix: Option<String>,
}

impl MutationFilter {
    /// Returns `true` if the given record matches this filter.
    pub fn matches(&self, record: &MutationRecord) -> bool {
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&record.kind) {
                return false;
            }
        }
        if let Some(ref names) = self.attribute_names {
            match &record.attribute_name {
                Some(name) if names.contains(name) => {}
                _ => return false,
            }
        }
        if let Some(ref prefix) = self.target_prefix {
            let below = record.target == *prefix
                || record
                    .target
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'));
            if !below {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr_record(target: &str, name: &str) -> MutationRecord {
        MutationRecord::new(MutationKind::Attributes, target).with_attribute(name)
    }

    #[test]
    fn default_bounds() {
        let c = MutationLogConfig::default();
        assert_eq!(c.max_records, 1000);
        assert_eq!(c.retain_records, 500);
    }

    #[test]
    fn log_keeps_everything_up_to_cap() {
        let mut log = MutationLog::default();
        for i in 0..1000 {
            log.record(MutationRecord::new(MutationKind::ChildList, format!("/{i}")));
        }
        assert_eq!(log.len(), 1000);
        assert_eq!(log.total_trimmed(), 0);
    }

    #[test]
    fn exceeding_cap_trims_to_most_recent() {
        let mut log = MutationLog::default();
        for i in 0..1001 {
            log.record(MutationRecord::new(MutationKind::ChildList, format!("/{i}")));
        }
        assert_eq!(log.len(), 500);
        assert_eq!(log.total_recorded(), 1001);
        assert_eq!(log.total_trimmed(), 501);
        assert_eq!(log.records()[0].target, "/501");
        assert_eq!(log.records()[499].target, "/1000");
    }

    #[test]
    fn small_custom_bounds() {
        let mut log = MutationLog::new(MutationLogConfig {
            max_records: 3,
            retain_records: 1,
        });
        for i in 0..4 {
            log.record(MutationRecord::new(MutationKind::CharacterData, format!("/{i}")));
        }
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].target, "/3");
    }

    #[test]
    fn retain_above_max_is_clamped() {
        let mut log = MutationLog::new(MutationLogConfig {
            max_records: 2,
            retain_records: 10,
        });
        assert_eq!(log.config().retain_records, 2);
        for i in 0..20 {
            log.record(MutationRecord::new(MutationKind::ChildList, format!("/{i}")));
            assert!(log.len() <= 2);
        }
        assert_eq!(log.records()[1].target, "/19");
        assert_eq!(log.total_recorded(), 20);
    }

    #[test]
    fn filter_by_kind() {
        let mut log = MutationLog::default();
        log.record(MutationRecord::new(MutationKind::ChildList, ""));
        log.record(attr_record("/0", "class"));
        let filter = MutationFilter {
            kinds: Some(vec![MutationKind::Attributes]),
            ..Default::default()
        };
        assert_eq!(log.filter(&filter).count(), 1);
    }

    #[test]
    fn filter_by_attribute_name_excludes_non_attribute_records() {
        let filter = MutationFilter {
            attribute_names: Some(vec!["class".into()]),
            ..Default::default()
        };
        assert!(filter.matches(&attr_record("/0", "class")));
        assert!(!filter.matches(&attr_record("/0", "id")));
        assert!(!filter.matches(&MutationRecord::new(MutationKind::ChildList, "/0")));
    }

    #[test]
    fn filter_by_target_prefix_respects_segments() {
        let filter = MutationFilter {
            target_prefix: Some("/1".into()),
            ..Default::default()
        };
        assert!(filter.matches(&attr_record("/1", "x")));
        assert!(filter.matches(&attr_record("/1/0", "x")));
        assert!(!filter.matches(&attr_record("/10", "x")));
    }

    #[test]
    fn kind_display_matches_dom_names() {
        assert_eq!(MutationKind::ChildList.to_string(), "childList");
        assert_eq!(MutationKind::CharacterData.to_string(), "characterData");
    }
}
