//! Dose interval schedule.
//!
//! An ordered rule table evaluated first-match-wins. Order matters:
//! a name containing both "COVID-19" and "HPV" gets the COVID interval.

use chrono::{Days, NaiveDate};

/// Interval used when no rule matches.
pub const DEFAULT_INTERVAL_DAYS: u32 = 30;

/// A single (predicate, interval) rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRule {
    /// Case-sensitive substring the vaccine name must contain
    pub needle: String,
    /// Days until the next dose
    pub days: u32,
}

impl IntervalRule {
    pub fn new(needle: impl Into<String>, days: u32) -> Self {
        Self {
            needle: needle.into(),
            days,
        }
    }

    pub fn matches(&self, vaccine_name: &str) -> bool {
        vaccine_name.contains(self.needle.as_str())
    }
}

/// Schedule for computing next-due dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoseSchedule {
    rules: Vec<IntervalRule>,
    default_days: u32,
}

impl Default for DoseSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

impl DoseSchedule {
    /// The built-in schedule.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                IntervalRule::new("COVID-19", 21),   // 3 weeks
                IntervalRule::new("Hepatitis B", 30), // 1 month
                IntervalRule::new("HPV", 60),        // 2 months
            ],
            default_days: DEFAULT_INTERVAL_DAYS,
        }
    }

    /// Append a rule after the existing ones (lowest priority).
    pub fn add_rule(&mut self, rule: IntervalRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[IntervalRule] {
        &self.rules
    }

    /// Days between doses for a vaccine.
    pub fn interval_days(&self, vaccine_name: &str) -> u32 {
        self.rules
            .iter()
            .find(|rule| rule.matches(vaccine_name))
            .map(|rule| rule.days)
            .unwrap_or(self.default_days)
    }

    /// Next-due date, or `None` when this dose completes the regimen.
    pub fn next_due_date(
        &self,
        vaccine_name: &str,
        dose_number: u32,
        total_doses: u32,
        date_given: NaiveDate,
    ) -> Option<NaiveDate> {
        if dose_number >= total_doses {
            return None;
        }

        let days = self.interval_days(vaccine_name);
        let due = date_given.checked_add_days(Days::new(u64::from(days)));
        if due.is_none() {
            tracing::warn!(%date_given, days, "Next-due date out of calendar range");
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_covid_interval() {
        let schedule = DoseSchedule::standard();
        assert_eq!(
            schedule.next_due_date("COVID-19 mRNA (Pfizer-BioNTech)", 1, 2, date(2024, 1, 1)),
            Some(date(2024, 1, 22))
        );
    }

    #[test]
    fn test_hepatitis_b_interval() {
        let schedule = DoseSchedule::standard();
        assert_eq!(
            schedule.next_due_date("Hepatitis B", 1, 3, date(2024, 1, 1)),
            Some(date(2024, 1, 31))
        );
    }

    #[test]
    fn test_hpv_and_default_intervals() {
        let schedule = DoseSchedule::standard();
        assert_eq!(schedule.interval_days("HPV (Human Papillomavirus)"), 60);
        assert_eq!(schedule.interval_days("Hepatitis A"), DEFAULT_INTERVAL_DAYS);
        assert_eq!(schedule.interval_days("Typhoid"), DEFAULT_INTERVAL_DAYS);
    }

    #[test]
    fn test_first_match_wins() {
        let schedule = DoseSchedule::standard();
        assert_eq!(schedule.interval_days("COVID-19 + HPV combo"), 21);
        assert_eq!(schedule.interval_days("Hepatitis B / HPV"), 30);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let schedule = DoseSchedule::standard();
        assert_eq!(schedule.interval_days("covid-19 booster"), DEFAULT_INTERVAL_DAYS);
        assert_eq!(schedule.interval_days("hpv"), DEFAULT_INTERVAL_DAYS);
    }

    #[test]
    fn test_final_dose_has_no_due_date() {
        let schedule = DoseSchedule::standard();
        assert_eq!(schedule.next_due_date("HPV", 2, 2, date(2024, 1, 1)), None);
        assert_eq!(schedule.next_due_date("HPV", 1, 1, date(2024, 1, 1)), None);
    }

    #[test]
    fn test_crosses_month_and_leap_day() {
        let schedule = DoseSchedule::standard();
        assert_eq!(
            schedule.next_due_date("HPV", 1, 3, date(2024, 1, 15)),
            Some(date(2024, 3, 15))
        );
        assert_eq!(
            schedule.next_due_date("Influenza (Flu)", 1, 2, date(2024, 2, 1)),
            Some(date(2024, 3, 2))
        );
    }

    #[test]
    fn test_added_rule_has_lowest_priority() {
        let mut schedule = DoseSchedule::standard();
        schedule.add_rule(IntervalRule::new("Rabies", 7));
        schedule.add_rule(IntervalRule::new("HPV", 90));

        assert_eq!(schedule.interval_days("Rabies PEP"), 7);
        assert_eq!(schedule.interval_days("HPV"), 60);
        assert_eq!(schedule.rules().len(), 5);
    }
}
