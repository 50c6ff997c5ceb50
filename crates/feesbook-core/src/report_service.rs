//! Pure filtering and aggregation over student snapshots.
//!
//! Everything here works on derived copies of the input; the source
//! collection is never mutated, so running the same report twice over the
//! same snapshot yields identical results.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::NaiveDateTime;
use feesbook_domain::{timestamp, PaymentEntry, PaymentMode, Student, Subject};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::balance::subject_balance;

/// Payment-mode restriction for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModeFilter {
    #[default]
    All,
    Cash,
    Online,
}

impl ModeFilter {
    pub fn matches(self, mode: PaymentMode) -> bool {
        match self {
            ModeFilter::All => true,
            ModeFilter::Cash => mode == PaymentMode::Cash,
            ModeFilter::Online => mode == PaymentMode::Online,
        }
    }
}

impl FromStr for ModeFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ModeFilter::All),
            "cash" => Ok(ModeFilter::Cash),
            "online" => Ok(ModeFilter::Online),
            other => Err(format!("unknown mode filter `{other}`")),
        }
    }
}

/// Filter specification for [`ReportService::run`].
///
/// `date_from`/`date_to` are inclusive bounds against the parsed canonical
/// entry timestamp; `received` restricts to entries recorded by one operator
/// (the per-operator daily summary).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub subject_names: Option<BTreeSet<String>>,
    pub mode: ModeFilter,
    pub date_from: Option<NaiveDateTime>,
    pub date_to: Option<NaiveDateTime>,
    pub received: Option<String>,
}

impl ReportFilter {
    fn keeps_subject(&self, subject: &Subject) -> bool {
        match &self.subject_names {
            Some(names) => names.contains(&subject.subject_name),
            None => true,
        }
    }

    /// Whether an entry passes the mode/receiver/date-range restrictions.
    /// Returns the entry verdict plus a malformed-date flag.
    fn keeps_entry(&self, entry: &PaymentEntry) -> (bool, bool) {
        if !self.mode.matches(entry.mode) {
            return (false, false);
        }
        if let Some(receiver) = &self.received {
            if entry.received != *receiver {
                return (false, false);
            }
        }
        if self.date_from.is_none() && self.date_to.is_none() {
            return (true, false);
        }
        let Some(at) = timestamp::parse_entry(&entry.date) else {
            warn!(raw = %entry.date, "entry date does not match canonical format, excluded from ranged report");
            return (false, true);
        };
        if let Some(from) = self.date_from {
            if at < from {
                return (false, false);
            }
        }
        if let Some(to) = self.date_to {
            if at > to {
                return (false, false);
            }
        }
        (true, false)
    }
}

/// Collection totals split by payment mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeTotals {
    pub cash: f64,
    pub online: f64,
}

impl ModeTotals {
    pub fn grand_total(&self) -> f64 {
        self.cash + self.online
    }

    fn add(&mut self, mode: PaymentMode, amount: f64) {
        match mode {
            PaymentMode::Cash => self.cash += amount,
            PaymentMode::Online => self.online += amount,
        }
    }
}

/// Per-receiver collection breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiverTotals {
    pub cash: f64,
    pub online: f64,
    pub total: f64,
}

/// Output of a report run: surviving students (with only their surviving
/// subjects/entries), totals, and data-quality counters.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub students: Vec<Student>,
    pub totals_by_mode: ModeTotals,
    pub totals_by_receiver: BTreeMap<String, ReceiverTotals>,
    /// Filtered entries whose amount did not parse and contributed zero.
    pub malformed_amounts: usize,
    /// Entries excluded from a date-bounded report because their timestamp
    /// did not match the canonical format.
    pub malformed_dates: usize,
}

/// Per-subject collection overview across every student.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectCollection {
    pub subject_name: String,
    /// Students carrying this subject.
    pub students: usize,
    pub total_fees: f64,
    pub collected: f64,
    pub outstanding: f64,
}

/// Sort key for student listings; aggregation itself never depends on order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentSort {
    /// Most recent entry timestamp, newest first.
    LatestEntry,
    /// Current remaining balance, largest first.
    Remaining,
}

/// Read-only aggregation over student snapshots.
pub struct ReportService;

impl ReportService {
    /// Applies the filter and aggregates totals over the surviving entries.
    ///
    /// A student survives only if at least one subject retains at least one
    /// entry after filtering.
    pub fn run(students: &[Student], filter: &ReportFilter) -> Report {
        let mut report = Report::default();
        for student in students {
            let mut kept_subjects = Vec::new();
            for subject in &student.subjects {
                if !filter.keeps_subject(subject) {
                    continue;
                }
                let mut kept = subject.clone();
                kept.columns.clear();
                for entry in &subject.columns {
                    let (keep, malformed_date) = filter.keeps_entry(entry);
                    if malformed_date {
                        report.malformed_dates += 1;
                    }
                    if keep {
                        kept.columns.push(entry.clone());
                    }
                }
                if !kept.columns.is_empty() {
                    kept_subjects.push(kept);
                }
            }
            if kept_subjects.is_empty() {
                continue;
            }

            for subject in &kept_subjects {
                for entry in &subject.columns {
                    let (amount, ok) = entry.amount_value();
                    if !ok {
                        report.malformed_amounts += 1;
                    }
                    report.totals_by_mode.add(entry.mode, amount);
                    let receiver = report
                        .totals_by_receiver
                        .entry(entry.received.clone())
                        .or_default();
                    match entry.mode {
                        PaymentMode::Cash => receiver.cash += amount,
                        PaymentMode::Online => receiver.online += amount,
                    }
                    receiver.total += amount;
                }
            }

            let mut filtered_student = student.clone();
            filtered_student.subjects = kept_subjects;
            report.students.push(filtered_student);
        }
        report
    }

    /// Groups fee totals by subject name across every student: how much the
    /// subject is worth, how much has been collected, and what is still out.
    pub fn subject_collections(students: &[Student]) -> Vec<SubjectCollection> {
        let mut by_name: BTreeMap<String, SubjectCollection> = BTreeMap::new();
        for student in students {
            for subject in &student.subjects {
                let balance = subject_balance(subject);
                let (total_fees, _) = subject.total_fees_value();
                let slot = by_name
                    .entry(subject.subject_name.clone())
                    .or_insert_with(|| SubjectCollection {
                        subject_name: subject.subject_name.clone(),
                        students: 0,
                        total_fees: 0.0,
                        collected: 0.0,
                        outstanding: 0.0,
                    });
                slot.students += 1;
                slot.total_fees += total_fees;
                slot.collected += balance.paid;
                slot.outstanding += balance.remaining;
            }
        }
        by_name.into_values().collect()
    }

    /// Entries of a subject sorted newest first, as a derived copy.
    pub fn entries_newest_first(subject: &Subject) -> Vec<PaymentEntry> {
        let mut entries = subject.columns.clone();
        entries.sort_by(|a, b| {
            let a = timestamp::parse_entry(&a.date);
            let b = timestamp::parse_entry(&b.date);
            b.cmp(&a)
        });
        entries
    }

    /// Students re-sorted for display by the selected key, descending.
    pub fn sorted_students(students: &[Student], sort: StudentSort) -> Vec<Student> {
        let mut sorted = students.to_vec();
        match sort {
            StudentSort::LatestEntry => {
                sorted.sort_by(|a, b| Self::latest_entry(b).cmp(&Self::latest_entry(a)));
            }
            StudentSort::Remaining => {
                sorted.sort_by(|a, b| {
                    crate::balance::student_remaining(b)
                        .total_cmp(&crate::balance::student_remaining(a))
                });
            }
        }
        sorted
    }

    fn latest_entry(student: &Student) -> Option<NaiveDateTime> {
        student
            .subjects
            .iter()
            .flat_map(|subject| subject.columns.iter())
            .filter_map(|entry| timestamp::parse_entry(&entry.date))
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use feesbook_domain::PaymentEntry;

    fn entry(date: &str, amount: &str, mode: PaymentMode, received: &str) -> PaymentEntry {
        PaymentEntry {
            date: date.into(),
            amount: amount.into(),
            mode,
            received: received.into(),
        }
    }

    fn student(id: i64, subjects: Vec<Subject>) -> Student {
        Student {
            id,
            first_name: "S".into(),
            middle_name: String::new(),
            last_name: format!("{id}"),
            college_name: "City College".into(),
            branch: "Science".into(),
            whatsapp_number: "9000000001".into(),
            calling_number: "9000000002".into(),
            subjects,
            photo: None,
            qr_code: None,
            created_at: Utc::now(),
        }
    }

    fn math_student() -> Student {
        let mut math = Subject::new("Math", "1000");
        math.columns
            .push(entry("01/01/2024 10:00:00", "300", PaymentMode::Cash, "A"));
        student(1, vec![math])
    }

    #[test]
    fn aggregation_example_matches_expected_totals() {
        let students = vec![math_student()];
        let filter = ReportFilter {
            subject_names: Some(["Math".to_string()].into_iter().collect()),
            ..ReportFilter::default()
        };
        let report = ReportService::run(&students, &filter);

        assert_eq!(report.totals_by_mode.cash, 300.0);
        assert_eq!(report.totals_by_mode.online, 0.0);
        assert_eq!(report.students.len(), 1);
        let remaining = subject_balance(&report.students[0].subjects[0]).remaining;
        assert_eq!(remaining, 700.0);
    }

    #[test]
    fn aggregation_is_idempotent_and_leaves_input_untouched() {
        let students = vec![math_student()];
        let before = students.clone();
        let filter = ReportFilter::default();

        let first = ReportService::run(&students, &filter);
        let second = ReportService::run(&students, &filter);

        assert_eq!(students, before);
        assert_eq!(first.totals_by_mode, second.totals_by_mode);
        assert_eq!(first.students, second.students);
        assert_eq!(first.totals_by_receiver, second.totals_by_receiver);
    }

    #[test]
    fn receiver_breakdown_groups_cash_and_online() {
        let mut math = Subject::new("Math", "1000");
        math.columns
            .push(entry("01/01/2024 10:00:00", "100", PaymentMode::Cash, "A"));
        math.columns
            .push(entry("02/01/2024 10:00:00", "50", PaymentMode::Online, "A"));
        let students = vec![student(1, vec![math])];

        let report = ReportService::run(&students, &ReportFilter::default());
        let totals = &report.totals_by_receiver["A"];
        assert_eq!(totals.cash, 100.0);
        assert_eq!(totals.online, 50.0);
        assert_eq!(totals.total, 150.0);
        assert_eq!(report.totals_by_mode.grand_total(), 150.0);
    }

    #[test]
    fn date_range_excludes_entries_but_keeps_students_with_other_hits() {
        let mut math = Subject::new("Math", "1000");
        math.columns
            .push(entry("01/01/2024 10:00:00", "300", PaymentMode::Cash, "A"));
        math.columns
            .push(entry("01/03/2024 10:00:00", "200", PaymentMode::Cash, "A"));
        let students = vec![student(1, vec![math])];

        let filter = ReportFilter {
            date_from: timestamp::parse_entry("01/01/2024 00:00:00"),
            date_to: timestamp::parse_entry("31/01/2024 23:59:59"),
            ..ReportFilter::default()
        };
        let report = ReportService::run(&students, &filter);

        assert_eq!(report.students.len(), 1);
        assert_eq!(report.students[0].subjects[0].columns.len(), 1);
        assert_eq!(report.totals_by_mode.cash, 300.0);
        assert_eq!(report.totals_by_receiver["A"].total, 300.0);
    }

    #[test]
    fn inclusive_bounds_keep_entries_on_the_edges() {
        let mut math = Subject::new("Math", "1000");
        math.columns
            .push(entry("15/01/2024 10:00:00", "300", PaymentMode::Cash, "A"));
        let students = vec![student(1, vec![math])];

        let filter = ReportFilter {
            date_from: timestamp::parse_entry("15/01/2024 10:00:00"),
            date_to: timestamp::parse_entry("15/01/2024 10:00:00"),
            ..ReportFilter::default()
        };
        assert_eq!(ReportService::run(&students, &filter).students.len(), 1);
    }

    #[test]
    fn receiver_filter_limits_to_one_operator() {
        let mut math = Subject::new("Math", "1000");
        math.columns
            .push(entry("01/01/2024 10:00:00", "100", PaymentMode::Cash, "A"));
        math.columns
            .push(entry("01/01/2024 11:00:00", "60", PaymentMode::Cash, "B"));
        let students = vec![student(1, vec![math])];

        let filter = ReportFilter {
            received: Some("B".into()),
            ..ReportFilter::default()
        };
        let report = ReportService::run(&students, &filter);
        assert_eq!(report.totals_by_mode.cash, 60.0);
        assert_eq!(report.totals_by_receiver.len(), 1);
    }

    #[test]
    fn malformed_amounts_land_as_zero_with_a_warning_count() {
        let mut math = Subject::new("Math", "1000");
        math.columns
            .push(entry("01/01/2024 10:00:00", "bogus", PaymentMode::Cash, "A"));
        let students = vec![student(1, vec![math])];

        let report = ReportService::run(&students, &ReportFilter::default());
        // The row still appears; its amount just contributes nothing.
        assert_eq!(report.students.len(), 1);
        assert_eq!(report.totals_by_mode.cash, 0.0);
        assert_eq!(report.malformed_amounts, 1);
    }

    #[test]
    fn malformed_dates_are_counted_when_a_range_is_applied() {
        let mut math = Subject::new("Math", "1000");
        math.columns
            .push(entry("2024-01-01T10:00:00", "100", PaymentMode::Cash, "A"));
        let students = vec![student(1, vec![math])];

        let filter = ReportFilter {
            date_from: timestamp::parse_entry("01/01/2024 00:00:00"),
            ..ReportFilter::default()
        };
        let report = ReportService::run(&students, &filter);
        assert!(report.students.is_empty());
        assert_eq!(report.malformed_dates, 1);
    }

    #[test]
    fn mode_filter_drops_students_with_no_matching_entries() {
        let students = vec![math_student()];
        let filter = ReportFilter {
            mode: ModeFilter::Online,
            ..ReportFilter::default()
        };
        let report = ReportService::run(&students, &filter);
        assert!(report.students.is_empty());
        assert_eq!(report.totals_by_mode.grand_total(), 0.0);
    }

    #[test]
    fn subject_collections_sum_across_students() {
        let mut math_a = Subject::new("Math", "1000");
        math_a
            .columns
            .push(entry("01/01/2024 10:00:00", "300", PaymentMode::Cash, "A"));
        let math_b = Subject::new("Math", "1000");
        let students = vec![student(1, vec![math_a]), student(2, vec![math_b])];

        let collections = ReportService::subject_collections(&students);
        assert_eq!(collections.len(), 1);
        let math = &collections[0];
        assert_eq!(math.students, 2);
        assert_eq!(math.total_fees, 2000.0);
        assert_eq!(math.collected, 300.0);
        assert_eq!(math.outstanding, 1700.0);
    }

    #[test]
    fn display_sorts_are_derived_copies() {
        let mut paid_up = Subject::new("Math", "1000");
        paid_up
            .columns
            .push(entry("05/02/2024 09:00:00", "1000", PaymentMode::Cash, "A"));
        let owing = Subject::new("Math", "1000");
        let students = vec![student(1, vec![paid_up]), student(2, vec![owing])];

        let by_remaining = ReportService::sorted_students(&students, StudentSort::Remaining);
        assert_eq!(by_remaining[0].id, 2);

        let by_latest = ReportService::sorted_students(&students, StudentSort::LatestEntry);
        assert_eq!(by_latest[0].id, 1);

        // Input order untouched.
        assert_eq!(students[0].id, 1);
    }

    #[test]
    fn entries_sort_newest_first_without_mutating_storage_order() {
        let mut math = Subject::new("Math", "1000");
        math.columns
            .push(entry("01/01/2024 10:00:00", "100", PaymentMode::Cash, "A"));
        math.columns
            .push(entry("05/01/2024 10:00:00", "50", PaymentMode::Cash, "A"));

        let sorted = ReportService::entries_newest_first(&math);
        assert_eq!(sorted[0].amount, "50");
        assert_eq!(math.columns[0].amount, "100");
    }
}
