//! Submission flow: validate, read, reconcile, write, navigate.

use thiserror::Error;

use crate::models::{Submission, ValidationError, VaccinationRecord};
use crate::reconciler::{Outcome, Reconciler};
use crate::store::{KeyValueStore, RecordStore, StoreError};

/// Moves the user to the records listing after a successful save.
#[uniffi::export(callback_interface)]
pub trait Navigator: Send + Sync {
    fn show_records(&self);
}

/// Navigator for callers that handle navigation themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn show_records(&self) {}
}

/// Submission errors. Both kinds end the attempt; nothing is retried.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to save vaccination record: {0}")]
    Persistence(#[from] StoreError),
}

impl SubmitError {
    /// Text to show the user.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(e) => e.to_string(),
            SubmitError::Persistence(_) => {
                "Failed to save vaccination record. Please try again.".to_string()
            }
        }
    }
}

pub type SubmitResult<T> = Result<T, SubmitError>;

/// What a successful submission did.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReport {
    pub outcome: Outcome,
    /// Confirmation text for the user
    pub message: String,
    /// The record as saved
    pub record: VaccinationRecord,
    /// Collection size after the save
    pub record_count: usize,
}

/// Records submitted doses into a record store.
pub struct VaccinationRecorder<'a, S> {
    store: &'a RecordStore<S>,
    reconciler: Reconciler,
}

impl<'a, S: KeyValueStore> VaccinationRecorder<'a, S> {
    /// Create a recorder with the standard dose schedule.
    pub fn new(store: &'a RecordStore<S>) -> Self {
        Self::with_reconciler(store, Reconciler::new())
    }

    pub fn with_reconciler(store: &'a RecordStore<S>, reconciler: Reconciler) -> Self {
        Self { store, reconciler }
    }

    /// Submit one dose event.
    ///
    /// The submission is only borrowed, so a failed attempt can be retried
    /// with the same form data. `navigator` is called once, after the write
    /// succeeds.
    pub fn submit<N: Navigator + ?Sized>(
        &self,
        submission: &Submission,
        navigator: &N,
    ) -> SubmitResult<SubmitReport> {
        // Reject before touching storage
        submission.validate()?;

        let existing = self.store.load().inspect_err(|e| {
            tracing::warn!(error = %e, "Failed to read vaccination records");
        })?;

        let reconciliation = self.reconciler.reconcile(submission, &existing)?;

        self.store
            .save(&reconciliation.records)
            .inspect_err(|e| {
                tracing::error!(error = %e, "Error saving vaccination record");
            })?;

        navigator.show_records();

        let record = reconciliation.record().clone();
        Ok(SubmitReport {
            message: reconciliation.outcome.message(),
            record_count: reconciliation.records.len(),
            outcome: reconciliation.outcome,
            record,
        })
    }
}
