//! Rule collection: ordered working set of rules plus a positional selection.
//!
//! Insertion order is the display and export order. The selection is a set of
//! positions; any operation that shifts positions clears it in the same step,
//! so it never points at a stale record.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::rule::RuleRecord;
use crate::services::{fingerprint, serializer};

/// Lowest sid the duplicate allocator will hand out is one above this floor.
pub const SID_ALLOCATION_FLOOR: u32 = 1_000_000;

/// Suffix appended to the message of every duplicate.
pub const COPY_SUFFIX: &str = " (copy)";

/// Errors raised by collection operations. Every error leaves the collection unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollectionError {
    /// Operator mistake: empty selection, wrong selection size, acceptance gate.
    #[error("Input error: {0}")]
    Input(String),

    /// A position outside `[0, len)`.
    #[error("Index {index} out of range for collection of {len} rules")]
    Index { index: usize, len: usize },
}

/// Whether the `msg` acceptance gate applies to an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Manual add from the builder form.
    Enforced,
    /// Template and import paths.
    Trusted,
}

/// Display-only report of identifier and signature collisions.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CollisionReport {
    /// sid -> positions sharing it, for sids used more than once.
    pub duplicate_sids: BTreeMap<u32, Vec<usize>>,
    /// Groups of positions with identical detection logic.
    pub duplicate_signatures: Vec<Vec<usize>>,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.duplicate_sids.is_empty() && self.duplicate_signatures.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleCollection {
    rules: Vec<RuleRecord>,
    selection: BTreeSet<usize>,
    preview: Option<usize>,
}

impl RuleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[RuleRecord] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&RuleRecord, CollectionError> {
        self.rules.get(index).ok_or(CollectionError::Index {
            index,
            len: self.rules.len(),
        })
    }

    /// Selected positions in ascending order.
    pub fn selection(&self) -> Vec<usize> {
        self.selection.iter().copied().collect()
    }

    /// Position of the record whose preview is cached, if any.
    pub fn preview_index(&self) -> Option<usize> {
        self.preview
    }

    /// Append one record and return its position.
    pub fn append(&mut self, record: RuleRecord, gate: Gate) -> Result<usize, CollectionError> {
        if gate == Gate::Enforced && record.msg.trim().is_empty() {
            return Err(CollectionError::Input(
                crate::models::form::MSG_REQUIRED.to_string(),
            ));
        }
        self.rules.push(record);
        Ok(self.rules.len() - 1)
    }

    /// Append trusted records (imports) verbatim. Returns how many were added.
    pub fn extend(&mut self, records: Vec<RuleRecord>) -> usize {
        let count = records.len();
        self.rules.extend(records);
        count
    }

    fn check_index(&self, index: usize) -> Result<(), CollectionError> {
        if index >= self.rules.len() {
            return Err(CollectionError::Index {
                index,
                len: self.rules.len(),
            });
        }
        Ok(())
    }

    /// Replace the selection. Rejects the whole request if any index is out of range.
    pub fn select(&mut self, indices: &[usize]) -> Result<(), CollectionError> {
        for &index in indices {
            self.check_index(index)?;
        }
        self.selection = indices.iter().copied().collect();
        Ok(())
    }

    /// Flip one position in or out of the selection.
    pub fn toggle(&mut self, index: usize) -> Result<bool, CollectionError> {
        self.check_index(index)?;
        if self.selection.remove(&index) {
            Ok(false)
        } else {
            self.selection.insert(index);
            Ok(true)
        }
    }

    /// Select-all checkbox: always starts from an empty selection.
    pub fn select_all(&mut self, checked: bool) {
        self.selection.clear();
        if checked {
            self.selection.extend(0..self.rules.len());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Next sid the duplicate allocator would hand out, or `None` once the id space is exhausted.
    pub fn next_sid(&self) -> Option<u32> {
        self.rules
            .iter()
            .map(|r| r.sid)
            .max()
            .unwrap_or(0)
            .max(SID_ALLOCATION_FLOOR)
            .checked_add(1)
    }

    /// Clone every selected record with fresh sids and a `" (copy)"` message suffix.
    ///
    /// Clones are appended in ascending selection order and receive consecutive
    /// sids starting at [`Self::next_sid`]. Returns the assigned sids.
    pub fn duplicate(&mut self) -> Result<Vec<u32>, CollectionError> {
        if self.selection.is_empty() {
            return Err(CollectionError::Input("No rules selected".to_string()));
        }

        let count = self.selection.len() as u32;
        let first = self.next_sid();
        let last = first.and_then(|sid| sid.checked_add(count - 1));
        let (Some(first), Some(last)) = (first, last) else {
            return Err(CollectionError::Input(
                "No sids left above the current maximum".to_string(),
            ));
        };

        let clones: Vec<RuleRecord> = self
            .selection
            .iter()
            .zip(first..=last)
            .map(|(&index, sid)| {
                let source = &self.rules[index];
                RuleRecord {
                    sid,
                    msg: format!("{}{COPY_SUFFIX}", source.msg),
                    ..source.clone()
                }
            })
            .collect();

        let sids = clones.iter().map(|r| r.sid).collect();
        self.rules.extend(clones);
        self.selection.clear();
        tracing::debug!(count, first_sid = first, "Duplicated selected rules");
        Ok(sids)
    }

    /// Remove every selected record. Returns the number removed.
    pub fn delete_selected(&mut self) -> Result<usize, CollectionError> {
        if self.selection.is_empty() {
            return Err(CollectionError::Input("No rules selected".to_string()));
        }

        let removed = self.selection.len();
        // Highest position first so earlier removals don't shift later ones.
        for &index in self.selection.iter().rev() {
            self.rules.remove(index);
        }
        self.selection.clear();
        self.preview = None;
        tracing::debug!(removed, remaining = self.rules.len(), "Deleted selected rules");
        Ok(removed)
    }

    /// The single selected record, for loading back into the builder.
    pub fn edit_target(&self) -> Result<&RuleRecord, CollectionError> {
        let mut selected = self.selection.iter();
        match (selected.next(), selected.next()) {
            (Some(&index), None) => self.get(index),
            _ => Err(CollectionError::Input(format!(
                "Select exactly one rule to edit ({} selected)",
                self.selection.len()
            ))),
        }
    }

    /// Canonical text of one record; remembers it as the current preview.
    pub fn preview(&mut self, index: usize) -> Result<String, CollectionError> {
        let text = serializer::encode(self.get(index)?);
        self.preview = Some(index);
        Ok(text)
    }

    /// Report sids and detection logic shared by more than one record.
    pub fn collisions(&self) -> CollisionReport {
        let mut by_sid: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        let mut by_fingerprint: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (index, rule) in self.rules.iter().enumerate() {
            by_sid.entry(rule.sid).or_default().push(index);
            by_fingerprint
                .entry(fingerprint::compute(rule))
                .or_default()
                .push(index);
        }

        let mut duplicate_signatures: Vec<Vec<usize>> = by_fingerprint
            .into_values()
            .filter(|positions| positions.len() > 1)
            .collect();
        duplicate_signatures.sort();

        CollisionReport {
            duplicate_sids: by_sid
                .into_iter()
                .filter(|(_, positions)| positions.len() > 1)
                .collect(),
            duplicate_signatures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(msg: &str, sid: u32) -> RuleRecord {
        RuleRecord {
            msg: msg.to_string(),
            sid,
            ..Default::default()
        }
    }

    fn collection(rules: &[(&str, u32)]) -> RuleCollection {
        let mut c = RuleCollection::new();
        for (msg, sid) in rules {
            c.append(rule(msg, *sid), Gate::Trusted).unwrap();
        }
        c
    }

    fn msgs(c: &RuleCollection) -> Vec<&str> {
        c.rules().iter().map(|r| r.msg.as_str()).collect()
    }

    #[test]
    fn append_enforced_gate_rejects_empty_msg() {
        let mut c = RuleCollection::new();
        let err = c.append(rule("", 5), Gate::Enforced).unwrap_err();
        assert!(matches!(err, CollectionError::Input(_)));
        assert!(c.is_empty());
    }

    #[test]
    fn append_trusted_skips_gate() {
        let mut c = RuleCollection::new();
        assert_eq!(c.append(rule("", 5), Gate::Trusted).unwrap(), 0);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn append_allows_sid_collision() {
        let c = collection(&[("A", 7), ("B", 7)]);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn select_rejects_out_of_range() {
        let mut c = collection(&[("A", 1), ("B", 2)]);
        c.select(&[0]).unwrap();
        let err = c.select(&[1, 2]).unwrap_err();
        assert_eq!(err, CollectionError::Index { index: 2, len: 2 });
        assert_eq!(c.selection(), vec![0]);
    }

    #[test]
    fn toggle_flips_membership() {
        let mut c = collection(&[("A", 1), ("B", 2)]);
        assert!(c.toggle(1).unwrap());
        assert!(!c.toggle(1).unwrap());
        assert!(c.selection().is_empty());
        assert!(c.toggle(5).is_err());
    }

    #[test]
    fn select_all_toggle() {
        let mut c = collection(&[("A", 1), ("B", 2), ("C", 3)]);
        c.select(&[1]).unwrap();
        c.select_all(true);
        assert_eq!(c.selection(), vec![0, 1, 2]);
        c.select_all(false);
        assert!(c.selection().is_empty());
    }

    #[test]
    fn duplicate_allocates_above_floor() {
        let mut c = collection(&[("A", 5), ("B", 9)]);
        c.select(&[1, 0]).unwrap();
        let sids = c.duplicate().unwrap();
        assert_eq!(sids, vec![1_000_001, 1_000_002]);
        assert_eq!(msgs(&c), vec!["A", "B", "A (copy)", "B (copy)"]);
        assert!(c.selection().is_empty());
    }

    #[test]
    fn duplicate_allocates_above_max_sid() {
        let mut c = collection(&[("A", 2_000_000), ("B", 1_000_005), ("C", 3)]);
        c.select(&[0, 1, 2]).unwrap();
        let sids = c.duplicate().unwrap();
        assert_eq!(sids, vec![2_000_001, 2_000_002, 2_000_003]);
        let existing: Vec<u32> = c.rules()[..3].iter().map(|r| r.sid).collect();
        assert!(sids.iter().all(|s| !existing.contains(s)));
    }

    #[test]
    fn duplicate_twice_stacks_suffix() {
        let mut c = collection(&[("A", 1)]);
        c.select(&[0]).unwrap();
        c.duplicate().unwrap();
        c.select(&[1]).unwrap();
        c.duplicate().unwrap();
        assert_eq!(c.rules()[2].msg, "A (copy) (copy)");
        assert_eq!(c.rules()[2].sid, 1_000_002);
    }

    #[test]
    fn duplicate_keeps_other_fields() {
        let mut c = RuleCollection::new();
        c.append(
            RuleRecord {
                msg: "A".to_string(),
                content: "GET".to_string(),
                rev: 4,
                ..Default::default()
            },
            Gate::Trusted,
        )
        .unwrap();
        c.select(&[0]).unwrap();
        c.duplicate().unwrap();
        assert_eq!(c.rules()[1].content, "GET");
        assert_eq!(c.rules()[1].rev, 4);
    }

    #[test]
    fn duplicate_empty_selection_is_noop() {
        let mut c = collection(&[("A", 1)]);
        assert!(matches!(c.duplicate(), Err(CollectionError::Input(_))));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn next_sid_exhausted_at_max() {
        let c = collection(&[("A", u32::MAX)]);
        assert_eq!(c.next_sid(), None);
        assert_eq!(RuleCollection::new().next_sid(), Some(1_000_001));
    }

    #[test]
    fn duplicate_refuses_sid_overflow() {
        let mut c = collection(&[("A", u32::MAX - 1), ("B", 1)]);
        c.select(&[0, 1]).unwrap();
        assert!(matches!(c.duplicate(), Err(CollectionError::Input(_))));
        assert_eq!(c.len(), 2);
        assert_eq!(c.selection(), vec![0, 1]);
    }

    #[test]
    fn delete_first_and_last_of_three() {
        let mut c = collection(&[("A", 1), ("B", 2), ("C", 3)]);
        c.select(&[0, 2]).unwrap();
        assert_eq!(c.delete_selected().unwrap(), 2);
        assert_eq!(msgs(&c), vec!["B"]);
        assert!(c.selection().is_empty());
    }

    #[test]
    fn delete_clears_preview() {
        let mut c = collection(&[("A", 1), ("B", 2)]);
        c.preview(1).unwrap();
        assert_eq!(c.preview_index(), Some(1));
        c.select(&[0]).unwrap();
        c.delete_selected().unwrap();
        assert_eq!(c.preview_index(), None);
    }

    #[test]
    fn delete_empty_selection_is_noop() {
        let mut c = collection(&[("A", 1)]);
        assert!(matches!(c.delete_selected(), Err(CollectionError::Input(_))));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn edit_target_requires_exactly_one() {
        let mut c = collection(&[("A", 1), ("B", 2)]);
        assert!(c.edit_target().is_err());
        c.select(&[0, 1]).unwrap();
        assert!(c.edit_target().is_err());
        c.select(&[1]).unwrap();
        assert_eq!(c.edit_target().unwrap().msg, "B");
    }

    #[test]
    fn preview_out_of_range() {
        let mut c = collection(&[("A", 1)]);
        assert_eq!(
            c.preview(3).unwrap_err(),
            CollectionError::Index { index: 3, len: 1 }
        );
        assert_eq!(c.preview_index(), None);
    }

    #[test]
    fn extend_keeps_selection() {
        let mut c = collection(&[("A", 1)]);
        c.select(&[0]).unwrap();
        assert_eq!(c.extend(vec![rule("", 2), rule("C", 3)]), 2);
        assert_eq!(c.selection(), vec![0]);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn collisions_reports_shared_sids_and_signatures() {
        let mut c = collection(&[("A", 1), ("B", 1), ("C", 2)]);
        c.select(&[2]).unwrap();
        c.duplicate().unwrap();
        let report = c.collisions();
        assert_eq!(report.duplicate_sids.get(&1), Some(&vec![0, 1]));
        assert_eq!(report.duplicate_sids.len(), 1);
        // All four rules share header and options apart from msg/sid.
        assert_eq!(report.duplicate_signatures, vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn collisions_empty_for_distinct_rules() {
        let mut c = RuleCollection::new();
        c.append(
            RuleRecord {
                content: "a".to_string(),
                sid: 1,
                ..Default::default()
            },
            Gate::Trusted,
        )
        .unwrap();
        c.append(
            RuleRecord {
                content: "b".to_string(),
                sid: 2,
                ..Default::default()
            },
            Gate::Trusted,
        )
        .unwrap();
        assert!(c.collisions().is_empty());
    }
}
