//! Batch ingestion, sequential or grouped by fact key across rayon workers.
//!
//! Failures are recorded per fact and never stop the batch. Cancellation is
//! observed between facts; whatever was committed before stays committed.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use factgraph_core::models::{CandidateFact, Classification, FactKey};
use factgraph_core::CancellationToken;

use crate::engine::FactEngine;
use crate::outcome::IngestOutcome;

#[derive(Debug, Clone)]
pub struct BatchItem {
    pub candidate: CandidateFact,
    pub classification: Option<Classification>,
}

impl BatchItem {
    pub fn new(candidate: CandidateFact, classification: Option<Classification>) -> Self {
        Self {
            candidate,
            classification,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    /// Position of the item in the submitted batch.
    pub index: usize,
    pub error: String,
    pub retryable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub ingested: usize,
    /// Stored, but invalidated on arrival because an existing fact outranked it.
    pub retained_as_history: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub invalidations: usize,
    pub failures: Vec<BatchFailure>,
    /// Items never attempted because the batch was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.ingested + self.retained_as_history + self.duplicates + self.rejected + self.failures.len()
    }

    fn record(&mut self, index: usize, result: factgraph_core::FactGraphResult<IngestOutcome>) {
        match result {
            Ok(outcome @ IngestOutcome::Ingested { .. }) => {
                self.invalidations += outcome.invalidated().len();
                if outcome.is_active_ingest() {
                    self.ingested += 1;
                } else {
                    self.retained_as_history += 1;
                }
            }
            Ok(outcome @ IngestOutcome::Duplicate { .. }) => {
                self.invalidations += outcome.invalidated().len();
                self.duplicates += 1;
            }
            Ok(IngestOutcome::Rejected { .. }) => self.rejected += 1,
            Err(e) => {
                warn!(index, error = %e, retryable = e.is_retryable(), "batch item failed");
                self.failures.push(BatchFailure {
                    index,
                    error: e.to_string(),
                    retryable: e.is_retryable(),
                });
            }
        }
    }

    fn merge(mut self, other: BatchReport) -> BatchReport {
        self.ingested += other.ingested;
        self.retained_as_history += other.retained_as_history;
        self.duplicates += other.duplicates;
        self.rejected += other.rejected;
        self.invalidations += other.invalidations;
        self.failures.extend(other.failures);
        self.skipped += other.skipped;
        self.cancelled |= other.cancelled;
        self
    }
}

impl FactEngine {
    /// Ingest items one by one, in order.
    pub fn ingest_batch(&self, items: &[BatchItem], cancel: &CancellationToken) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, item) in items.iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                report.skipped = items.len() - index;
                break;
            }
            report.record(index, self.ingest(&item.candidate, item.classification.clone()));
        }
        log_report(&report, items.len());
        report
    }

    /// Ingest items in parallel. Items sharing a fact key stay in submission
    /// order on one worker; distinct keys run concurrently.
    pub fn ingest_batch_parallel(
        &self,
        items: &[BatchItem],
        cancel: &CancellationToken,
    ) -> BatchReport {
        let mut report = group_by_key(items)
            .par_iter()
            .map(|indices| {
                let mut local = BatchReport::default();
                for (pos, &index) in indices.iter().enumerate() {
                    if cancel.is_cancelled() {
                        local.cancelled = true;
                        local.skipped += indices.len() - pos;
                        break;
                    }
                    let item = &items[index];
                    local.record(index, self.ingest(&item.candidate, item.classification.clone()));
                }
                local
            })
            .reduce(BatchReport::default, BatchReport::merge);

        report.failures.sort_by_key(|f| f.index);
        log_report(&report, items.len());
        report
    }
}

/// Item indices grouped by fact key, groups in order of first appearance.
fn group_by_key(items: &[BatchItem]) -> Vec<Vec<usize>> {
    let mut slots: HashMap<FactKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let key = FactKey::from_raw(&item.candidate.subject, &item.candidate.predicate);
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(index);
    }
    groups
}

fn log_report(report: &BatchReport, total: usize) {
    info!(
        total,
        ingested = report.ingested,
        retained_as_history = report.retained_as_history,
        duplicates = report.duplicates,
        rejected = report.rejected,
        invalidations = report.invalidations,
        failures = report.failures.len(),
        skipped = report.skipped,
        cancelled = report.cancelled,
        "batch ingestion finished"
    );
}
