//! DNS state reconciliation
//!
//! Decides which of a domain's current host records survive a provisioning write and
//! folds in the records a step requires, without duplicating anything the step re-asserts.
//! Everything here is pure; no adapter is called.

use mailhost_provider::{DnsHostRecord, DnsRecordType};
use serde::{Deserialize, Serialize};

/// Why an existing record is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreserveReason {
    /// Any MX record
    MailExchanger,
    /// TXT carrying SPF, DKIM, DMARC, ACME, an ownership token or a host-guard marker
    MarkedTxt,
    /// CNAME away from the forwarding hosts
    AliasedHost,
    /// A/AAAA away from the forwarding hosts
    AddressedHost,
    /// NS, SRV or CAA
    Infrastructure,
}

/// Classification of one existing record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Preserve(PreserveReason),
    Discard,
}

impl Disposition {
    pub fn is_preserve(self) -> bool {
        matches!(self, Self::Preserve(_))
    }
}

/// Markers and hosts the classification rules are evaluated against.
///
/// All matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreservePolicy {
    /// Substrings of a TXT host that mark it as preserved
    pub txt_host_markers: Vec<String>,
    /// Substrings of a TXT value that mark it as preserved
    pub txt_value_markers: Vec<String>,
    /// Hosts used for web forwarding and parking
    pub forwarding_hosts: Vec<String>,
}

impl Default for PreservePolicy {
    fn default() -> Self {
        Self {
            txt_host_markers: strings(&["_dmarc", "_acme-challenge"]),
            txt_value_markers: strings(&[
                "v=spf1",
                "v=dkim1",
                "-verification=",
                "domain-verification",
                "zmverify",
                "whoisguard",
                "host-guard",
            ]),
            forwarding_hosts: strings(&["@", "www"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl PreservePolicy {
    /// Classify an existing record; first matching rule wins
    pub fn classify(&self, record: &DnsHostRecord) -> Disposition {
        match record.record_type {
            DnsRecordType::Mx => Disposition::Preserve(PreserveReason::MailExchanger),
            DnsRecordType::Txt if self.is_marked_txt(record) => {
                Disposition::Preserve(PreserveReason::MarkedTxt)
            }
            DnsRecordType::Cname if !self.is_forwarding_host(record) => {
                Disposition::Preserve(PreserveReason::AliasedHost)
            }
            DnsRecordType::A | DnsRecordType::Aaaa if !self.is_forwarding_host(record) => {
                Disposition::Preserve(PreserveReason::AddressedHost)
            }
            DnsRecordType::Ns | DnsRecordType::Srv | DnsRecordType::Caa => {
                Disposition::Preserve(PreserveReason::Infrastructure)
            }
            _ => Disposition::Discard,
        }
    }

    fn is_marked_txt(&self, record: &DnsHostRecord) -> bool {
        let host = record.normalized_name();
        let value = record.value.to_lowercase();
        contains_any(&host, &self.txt_host_markers) || contains_any(&value, &self.txt_value_markers)
    }

    fn is_forwarding_host(&self, record: &DnsHostRecord) -> bool {
        let host = record.normalized_name();
        self.forwarding_hosts
            .iter()
            .any(|h| h.eq_ignore_ascii_case(&host))
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| !n.is_empty() && haystack.contains(&n.to_lowercase()))
}

/// Whether `addition` takes the slot of `existing`, so `existing` must not be written back
pub fn supersedes(addition: &DnsHostRecord, existing: &DnsHostRecord) -> bool {
    use DnsRecordType::{A, Aaaa, Cname, Mx, Txt, Url};

    if addition.content_eq(existing) {
        return true;
    }
    if !addition.same_host(existing) {
        return false;
    }
    match (addition.record_type, existing.record_type) {
        (Cname, Cname) => true,
        (Mx, Mx) => addition.normalized_value() == existing.normalized_value(),
        (Txt, Txt) => {
            (addition.is_spf() && existing.is_spf())
                || addition
                    .txt_tag()
                    .is_some_and(|tag| existing.txt_tag().as_deref() == Some(tag.as_str()))
        }
        (A | Aaaa | Url, A | Aaaa | Url) => true,
        _ => false,
    }
}

/// Result of a reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Record set to write back
    pub records: Vec<DnsHostRecord>,
    /// Existing records that will no longer be present
    pub discarded: Vec<DnsHostRecord>,
}

/// Merge `additions` into `current` under `policy`.
///
/// Returns the preserved, non-superseded current records followed by the additions with
/// content duplicates removed. Applying the same additions again yields the same set.
pub fn reconcile(
    current: &[DnsHostRecord],
    additions: &[DnsHostRecord],
    policy: &PreservePolicy,
) -> Reconciliation {
    let additions = dedup(additions);

    let mut records: Vec<DnsHostRecord> = current
        .iter()
        .filter(|r| policy.classify(r).is_preserve())
        .filter(|r| !additions.iter().any(|a| supersedes(a, r)))
        .cloned()
        .collect();
    records.extend(additions);

    let discarded = current
        .iter()
        .filter(|r| !records.iter().any(|kept| kept.content_eq(r)))
        .cloned()
        .collect();

    Reconciliation { records, discarded }
}

/// Drop later content duplicates, keeping first-seen order
fn dedup(records: &[DnsHostRecord]) -> Vec<DnsHostRecord> {
    let mut out: Vec<DnsHostRecord> = Vec::with_capacity(records.len());
    for record in records {
        if !out.iter().any(|r| r.content_eq(record)) {
            out.push(record.clone());
        }
    }
    out
}
