use std::fmt;

use quicksfv_digest::{AlgorithmId, DigestValue};
use quicksfv_manifest::ManifestEntry;

/// Terminal state of one manifest entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Match,
    Mismatch,
    /// The resolver reported no such path.
    Missing,
    /// Any other I/O failure, before or during streaming.
    ReadError,
    UnsupportedAlgorithm,
}

impl Outcome {
    pub fn is_match(self) -> bool { self == Outcome::Match }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Match => "OK",
            Outcome::Mismatch => "MISMATCH",
            Outcome::Missing => "MISSING",
            Outcome::ReadError => "READ ERROR",
            Outcome::UnsupportedAlgorithm => "UNSUPPORTED",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub path:      String,
    pub algorithm: AlgorithmId,
    pub outcome:   Outcome,
    pub expected:  DigestValue,
    /// Present for `Match` and `Mismatch` only.
    pub computed:  Option<DigestValue>,
    pub error:     Option<String>,
}

impl VerificationResult {
    fn from_entry(entry: &ManifestEntry, outcome: Outcome) -> Self {
        Self {
            path: entry.path().to_string(),
            algorithm: entry.algorithm().clone(),
            outcome,
            expected: entry.expected().clone(),
            computed: None,
            error: None,
        }
    }

    pub(crate) fn compared(entry: &ManifestEntry, computed: DigestValue) -> Self {
        let outcome = if &computed == entry.expected() {
            Outcome::Match
        } else {
            Outcome::Mismatch
        };
        Self {
            computed: Some(computed),
            ..Self::from_entry(entry, outcome)
        }
    }

    pub(crate) fn missing(entry: &ManifestEntry) -> Self {
        Self::from_entry(entry, Outcome::Missing)
    }

    pub(crate) fn read_error(entry: &ManifestEntry, error: impl fmt::Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::from_entry(entry, Outcome::ReadError)
        }
    }

    pub(crate) fn unsupported(entry: &ManifestEntry) -> Self {
        Self::from_entry(entry, Outcome::UnsupportedAlgorithm)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub matched:     usize,
    pub mismatched:  usize,
    pub missing:     usize,
    pub errored:     usize,
    pub unsupported: usize,
}

impl Counters {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Match => self.matched += 1,
            Outcome::Mismatch => self.mismatched += 1,
            Outcome::Missing => self.missing += 1,
            Outcome::ReadError => self.errored += 1,
            Outcome::UnsupportedAlgorithm => self.unsupported += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.matched + self.mismatched + self.missing + self.errored + self.unsupported
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// Cancelled before every entry finished; results cover a subset.
    Cancelled,
}

/// Results in manifest order plus run-level counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationReport {
    pub results:  Vec<VerificationResult>,
    pub counters: Counters,
    pub status:   RunStatus,
}

impl VerificationReport {
    /// True when the run completed and every entry matched.
    pub fn all_matched(&self) -> bool {
        self.status == RunStatus::Completed && self.counters.matched == self.results.len()
    }

    pub fn is_cancelled(&self) -> bool { self.status == RunStatus::Cancelled }

    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|result| !result.outcome.is_match())
    }
}

/// Collects results in completion order and hands them back in manifest order.
pub(crate) struct ReportBuilder {
    slots: Vec<Option<VerificationResult>>,
}

impl ReportBuilder {
    pub(crate) fn new(entries: usize) -> Self {
        Self {
            slots: vec![None; entries],
        }
    }

    pub(crate) fn record(&mut self, index: usize, result: VerificationResult) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(result);
        }
    }

    pub(crate) fn finish(self) -> VerificationReport {
        let expected = self.slots.len();
        let results: Vec<VerificationResult> = self.slots.into_iter().flatten().collect();
        let mut counters = Counters::default();
        for result in &results {
            counters.record(result.outcome);
        }
        let status = if results.len() == expected {
            RunStatus::Completed
        } else {
            RunStatus::Cancelled
        };
        VerificationReport {
            results,
            counters,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, crc: u32) -> ManifestEntry {
        ManifestEntry::new(path, DigestValue::from(crc), AlgorithmId::CRC32)
    }

    #[test]
    fn compared_sets_outcome() {
        let e = entry("a", 0xCBF4_3926);
        let hit = VerificationResult::compared(&e, DigestValue::from(0xCBF4_3926));
        assert_eq!(hit.outcome, Outcome::Match);
        let miss = VerificationResult::compared(&e, DigestValue::from(1));
        assert_eq!(miss.outcome, Outcome::Mismatch);
        assert_eq!(miss.computed, Some(DigestValue::from(1)));
        assert_eq!(miss.expected, DigestValue::from(0xCBF4_3926));
    }

    #[test]
    fn missing_has_no_digest() {
        let result = VerificationResult::missing(&entry("a", 0));
        assert_eq!(result.computed, None);
        assert_eq!(result.error, None);
    }

    #[test]
    fn builder_restores_manifest_order() {
        let entries = [entry("a", 0), entry("b", 0), entry("c", 0)];
        let mut builder = ReportBuilder::new(entries.len());
        builder.record(2, VerificationResult::missing(&entries[2]));
        builder.record(0, VerificationResult::compared(&entries[0], DigestValue::from(0)));
        builder.record(1, VerificationResult::unsupported(&entries[1]));

        let report = builder.finish();
        let paths: Vec<&str> = report.results.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["a", "b", "c"]);
        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.counters.matched, 1);
        assert_eq!(report.counters.missing, 1);
        assert_eq!(report.counters.unsupported, 1);
        assert_eq!(report.counters.total(), 3);
        assert!(!report.all_matched());
        assert_eq!(report.failures().count(), 2);
    }

    #[test]
    fn gaps_mean_cancelled() {
        let entries = [entry("a", 0), entry("b", 0)];
        let mut builder = ReportBuilder::new(entries.len());
        builder.record(1, VerificationResult::compared(&entries[1], DigestValue::from(0)));

        let report = builder.finish();
        assert!(report.is_cancelled());
        assert_eq!(report.results.len(), 1);
        assert!(!report.all_matched());
    }

    #[test]
    fn empty_run_is_all_matched() {
        let report = ReportBuilder::new(0).finish();
        assert_eq!(report.status, RunStatus::Completed);
        assert!(report.all_matched());
    }
}
