//! Cross-file aggregation of summary records into per-person totals.

use std::collections::BTreeMap;

use tally_core::error::AggregateError;
use tally_core::models::{AggregatedRecord, IdentityKey, SummaryRecord};

// ── SummaryAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that groups summary records by identity key.
pub struct SummaryAggregator;

impl SummaryAggregator {
    /// One record per distinct identity key, sorted by key.
    ///
    /// Undefined signals contribute nothing; a person whose every signal is
    /// undefined still appears with a total of 0. The result does not depend
    /// on the order of `records`.
    pub fn aggregate(records: &[SummaryRecord]) -> Result<Vec<AggregatedRecord>, AggregateError> {
        if records.is_empty() {
            return Err(AggregateError::NoSummaryData);
        }

        let mut groups: BTreeMap<IdentityKey, u32> = BTreeMap::new();
        for record in records {
            let total = groups.entry(record.identity_key()).or_insert(0);
            *total += record.attendance_signal.value().unwrap_or(0);
        }

        Ok(groups
            .into_iter()
            .map(|(key, total_signal)| AggregatedRecord { key, total_signal })
            .collect())
    }

    /// Grand total over aggregated rows.
    pub fn calculate_total(records: &[AggregatedRecord]) -> u32 {
        records.iter().map(|r| r.total_signal).sum()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
