//! Form submission and its validation.

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::DEFAULT_PATIENT_NAME;

/// Validation failures, checked in declaration order.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Patient name is required.")]
    MissingPatientName,

    #[error("Vaccine name is required.")]
    MissingVaccineName,

    #[error("Dose numbers must be positive.")]
    NonPositiveDoseCounters,

    #[error("Dose number cannot exceed total doses.")]
    DoseExceedsTotal,
}

impl ValidationError {
    /// Form field the failure belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingPatientName => "patientName",
            ValidationError::MissingVaccineName => "vaccineName",
            ValidationError::NonPositiveDoseCounters => "doseCounters",
            ValidationError::DoseExceedsTotal => "doseNumber",
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Dose counters that passed validation: `1 <= dose_number <= total_doses`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoseCounters {
    pub dose_number: u32,
    pub total_doses: u32,
}

impl DoseCounters {
    /// Check raw form counters.
    pub fn new(dose_number: i32, total_doses: i32) -> ValidationResult<Self> {
        if dose_number < 1 || total_doses < 1 {
            return Err(ValidationError::NonPositiveDoseCounters);
        }
        if dose_number > total_doses {
            return Err(ValidationError::DoseExceedsTotal);
        }

        Ok(Self {
            dose_number: dose_number.unsigned_abs(),
            total_doses: total_doses.unsigned_abs(),
        })
    }
}

/// A dose event as entered on the form. Status is implicitly completed.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub patient_name: String,
    pub vaccine_name: String,
    pub manufacturer: String,
    /// Signed so that out-of-range form input reaches validation
    pub dose_number: i32,
    pub total_doses: i32,
    pub date_given: NaiveDate,
    pub administered_by: Option<String>,
    pub notes: Option<String>,
}

impl Submission {
    /// A freshly reset form.
    pub fn blank(date_given: NaiveDate) -> Self {
        Self {
            patient_name: DEFAULT_PATIENT_NAME.to_string(),
            vaccine_name: String::new(),
            manufacturer: String::new(),
            dose_number: 1,
            total_doses: 1,
            date_given,
            administered_by: None,
            notes: None,
        }
    }

    /// Check the preconditions for reconciliation.
    pub fn validate(&self) -> ValidationResult<DoseCounters> {
        if self.patient_name.trim().is_empty() {
            return Err(ValidationError::MissingPatientName);
        }
        if self.vaccine_name.trim().is_empty() {
            return Err(ValidationError::MissingVaccineName);
        }
        DoseCounters::new(self.dose_number, self.total_doses)
    }

    /// Administering party, with blank input treated as not provided.
    pub fn administered_by_text(&self) -> Option<String> {
        non_blank(&self.administered_by)
    }

    /// Notes, with blank input treated as not provided.
    pub fn notes_text(&self) -> Option<String> {
        non_blank(&self.notes)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Parse a dose counter text field.
///
/// Reads the leading integer (an optional sign followed by digits) and
/// falls back to 1 when there is none or it is zero. Values outside `i32`
/// saturate so that they still fail validation.
pub fn parse_dose_field(text: &str) -> i32 {
    let trimmed = text.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1i64, &trimmed[1..]),
        Some(b'+') => (1i64, &trimmed[1..]),
        _ => (1i64, trimmed),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 1;
    }

    let value = match digits.parse::<i64>() {
        Ok(n) => (sign * n).clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        Err(_) if sign < 0 => i32::MIN,
        Err(_) => i32::MAX,
    };

    if value == 0 {
        1
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(dose: i32, total: i32) -> Submission {
        Submission {
            patient_name: "John Doe".into(),
            vaccine_name: "Hepatitis B".into(),
            manufacturer: "GSK".into(),
            dose_number: dose,
            total_doses: total,
            date_given: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            administered_by: None,
            notes: None,
        }
    }

    #[test]
    fn test_valid_submission() {
        let counters = submission(1, 3).validate().unwrap();
        assert_eq!(counters.dose_number, 1);
        assert_eq!(counters.total_doses, 3);

        assert_eq!(
            submission(3, 3).validate(),
            Ok(DoseCounters {
                dose_number: 3,
                total_doses: 3
            })
        );
    }

    #[test]
    fn test_dose_counters_new() {
        assert!(DoseCounters::new(2, 2).is_ok());
        assert_eq!(
            DoseCounters::new(0, 2),
            Err(ValidationError::NonPositiveDoseCounters)
        );
        assert_eq!(
            DoseCounters::new(4, 3),
            Err(ValidationError::DoseExceedsTotal)
        );
    }

    #[test]
    fn test_missing_names() {
        let mut s = submission(1, 1);
        s.patient_name = "   ".into();
        assert_eq!(s.validate(), Err(ValidationError::MissingPatientName));

        let mut s = submission(1, 1);
        s.vaccine_name = "\t".into();
        assert_eq!(s.validate(), Err(ValidationError::MissingVaccineName));
    }

    #[test]
    fn test_dose_counter_checks() {
        assert_eq!(
            submission(0, 2).validate(),
            Err(ValidationError::NonPositiveDoseCounters)
        );
        assert_eq!(
            submission(1, -1).validate(),
            Err(ValidationError::NonPositiveDoseCounters)
        );
        assert_eq!(
            submission(3, 2).validate(),
            Err(ValidationError::DoseExceedsTotal)
        );
    }

    #[test]
    fn test_checks_run_in_order() {
        let mut s = submission(5, 0);
        s.patient_name = String::new();
        s.vaccine_name = String::new();
        assert_eq!(s.validate(), Err(ValidationError::MissingPatientName));
        assert_eq!(s.validate().unwrap_err().field(), "patientName");
    }

    #[test]
    fn test_blank_form() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let s = Submission::blank(today);
        assert_eq!(s.patient_name, "John Doe");
        assert_eq!(s.dose_number, 1);
        assert_eq!(s.total_doses, 1);
        assert_eq!(s.date_given, today);
        // No vaccine chosen yet
        assert_eq!(s.validate(), Err(ValidationError::MissingVaccineName));
    }

    #[test]
    fn test_blank_optionals_normalized() {
        let mut s = submission(1, 1);
        s.administered_by = Some("  ".into());
        s.notes = Some("Mild fever".into());
        assert_eq!(s.administered_by_text(), None);
        assert_eq!(s.notes_text(), Some("Mild fever".into()));
    }

    #[test]
    fn test_parse_dose_field() {
        assert_eq!(parse_dose_field("2"), 2);
        assert_eq!(parse_dose_field(" 3 doses"), 3);
        assert_eq!(parse_dose_field(""), 1);
        assert_eq!(parse_dose_field("abc"), 1);
        assert_eq!(parse_dose_field("0"), 1);
        assert_eq!(parse_dose_field("-2"), -2);
        assert_eq!(parse_dose_field("99999999999"), i32::MAX);
        assert_eq!(parse_dose_field("99999999999999999999"), i32::MAX);
        assert_eq!(parse_dose_field("-99999999999999999999"), i32::MIN);
        assert_eq!(parse_dose_field("00000000000000000000000"), 1);

        let mut s = submission(1, parse_dose_field("3"));
        s.dose_number = parse_dose_field("99999999999999999999");
        assert_eq!(s.validate(), Err(ValidationError::DoseExceedsTotal));
    }
}
