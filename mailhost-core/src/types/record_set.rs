//! Host-record set value type

use std::collections::HashMap;

use mailhost_provider::{DnsHostRecord, RecordKey};
use serde::{Deserialize, Serialize};

use crate::reconciler::{self, PreservePolicy};

/// Multiset difference between two record sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDiff {
    /// Present in the other set only
    pub added: Vec<DnsHostRecord>,
    /// Present in this set only
    pub removed: Vec<DnsHostRecord>,
}

impl RecordDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Current host records of a domain. Comparisons are by content (TTL ignored).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DnsRecordSet {
    records: Vec<DnsHostRecord>,
}

impl DnsRecordSet {
    pub fn new(records: Vec<DnsHostRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DnsHostRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<DnsHostRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a content-equal record is present
    pub fn contains(&self, record: &DnsHostRecord) -> bool {
        self.records.iter().any(|r| r.content_eq(record))
    }

    /// Number of records matching `predicate`
    pub fn count(&self, predicate: impl Fn(&DnsHostRecord) -> bool) -> usize {
        self.records.iter().filter(|r| predicate(r)).count()
    }

    /// Reconcile `additions` into this set under `policy`
    #[must_use]
    pub fn merge(&self, additions: &[DnsHostRecord], policy: &PreservePolicy) -> Self {
        Self::new(reconciler::reconcile(&self.records, additions, policy).records)
    }

    /// Records added and removed going from `self` to `other`
    pub fn diff(&self, other: &Self) -> RecordDiff {
        let mut remaining = self.histogram();
        let mut added = Vec::new();
        for record in &other.records {
            match remaining.get_mut(&record.key()) {
                Some(n) if *n > 0 => *n -= 1,
                _ => added.push(record.clone()),
            }
        }

        let mut removed = Vec::new();
        for record in self.records.iter().rev() {
            if let Some(n) = remaining.get_mut(&record.key())
                && *n > 0
            {
                *n -= 1;
                removed.push(record.clone());
            }
        }
        removed.reverse();

        RecordDiff { added, removed }
    }

    /// Same multiset of records by content, order ignored
    pub fn content_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.histogram() == other.histogram()
    }

    fn histogram(&self) -> HashMap<RecordKey, usize> {
        let mut counts = HashMap::new();
        for record in &self.records {
            *counts.entry(record.key()).or_insert(0) += 1;
        }
        counts
    }
}

impl From<Vec<DnsHostRecord>> for DnsRecordSet {
    fn from(records: Vec<DnsHostRecord>) -> Self {
        Self::new(records)
    }
}

impl IntoIterator for DnsRecordSet {
    type Item = DnsHostRecord;
    type IntoIter = std::vec::IntoIter<DnsHostRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
