//! Record reconciliation.
//!
//! A submission either completes the first pending record for the same
//! patient and vaccine, or becomes a new completed record at the end of
//! the collection.

mod schedule;

pub use schedule::*;

use crate::models::{Submission, ValidationResult, VaccinationRecord};

/// Which branch a submission took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new record was appended
    Created { id: String },
    /// An existing pending record was marked completed
    CompletedPending { id: String, vaccine_name: String },
}

impl Outcome {
    /// Identifier of the record written.
    pub fn id(&self) -> &str {
        match self {
            Outcome::Created { id } | Outcome::CompletedPending { id, .. } => id,
        }
    }

    /// User-facing confirmation text.
    pub fn message(&self) -> String {
        match self {
            Outcome::Created { .. } => {
                "New vaccination record has been added to your vaccinated records!".to_string()
            }
            Outcome::CompletedPending { vaccine_name, .. } => format!(
                "Pending vaccine \"{}\" has been marked as completed and moved to vaccinated records!",
                vaccine_name
            ),
        }
    }
}

/// Result of reconciling one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Full updated collection, ready to persist
    pub records: Vec<VaccinationRecord>,
    pub outcome: Outcome,
    index: usize,
}

impl Reconciliation {
    /// The record created or completed.
    pub fn record(&self) -> &VaccinationRecord {
        &self.records[self.index]
    }

    /// Position of that record in the collection.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Reconciles submissions against a record collection.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    schedule: DoseSchedule,
}

impl Reconciler {
    /// Create a reconciler with the standard dose schedule.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(schedule: DoseSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &DoseSchedule {
        &self.schedule
    }

    /// Reconcile a submission against the existing records.
    ///
    /// Validation runs before anything is copied; `existing` is never modified.
    pub fn reconcile(
        &self,
        submission: &Submission,
        existing: &[VaccinationRecord],
    ) -> ValidationResult<Reconciliation> {
        let counters = submission.validate()?;

        let next_due_date = self.schedule.next_due_date(
            &submission.vaccine_name,
            counters.dose_number,
            counters.total_doses,
            submission.date_given,
        );

        let mut records = existing.to_vec();

        let pending_index = records
            .iter()
            .position(|r| r.is_pending_match(&submission.patient_name, &submission.vaccine_name));

        let (index, outcome) = match pending_index {
            Some(index) => {
                let record = &mut records[index];
                record.complete_with(submission, counters, next_due_date);
                tracing::info!(
                    record_id = %record.id,
                    vaccine = %record.vaccine_name,
                    "Completed pending vaccination record"
                );
                let outcome = Outcome::CompletedPending {
                    id: record.id.clone(),
                    vaccine_name: submission.vaccine_name.clone(),
                };
                (index, outcome)
            }
            None => {
                let id = fresh_id(&records);
                records.push(VaccinationRecord::from_submission(
                    id.clone(),
                    submission,
                    counters,
                    next_due_date,
                ));
                tracing::info!(
                    record_id = %id,
                    vaccine = %submission.vaccine_name,
                    "Created vaccination record"
                );
                (records.len() - 1, Outcome::Created { id })
            }
        };

        Ok(Reconciliation {
            records,
            outcome,
            index,
        })
    }
}

/// Reconcile with the standard schedule.
pub fn reconcile(
    submission: &Submission,
    existing: &[VaccinationRecord],
) -> ValidationResult<Reconciliation> {
    Reconciler::new().reconcile(submission, existing)
}

/// Generate an identifier not used by any existing record.
fn fresh_id(existing: &[VaccinationRecord]) -> String {
    loop {
        let id = uuid::Uuid::new_v4().to_string();
        if !existing.iter().any(|r| r.id == id) {
            return id;
        }
    }
}
