//! Collection reports and the per-operator summary.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use colored::Colorize;
use feesbook_core::{ModeFilter, Report, ReportFilter, ReportService, StudentStore};
use feesbook_domain::timestamp;

use crate::cli::table::{Table, TableColumn};
use crate::cli::CliContext;
use crate::errors::{AppError, Result};

/// `report [--subject <name>]... [--mode cash|online] [--from d] [--to d]`
pub fn run(ctx: &CliContext, args: &[String]) -> Result<()> {
    let filter = parse_filter(args, None)?;
    let students = ctx.store.load_all()?;
    let report = ReportService::run(&students, &filter);
    print_report(&report);
    Ok(())
}

/// `summary [--from d] [--to d]`: the report restricted to entries the
/// current operator recorded.
pub fn summary(ctx: &CliContext, args: &[String]) -> Result<()> {
    let receiver = ctx.session.operator().to_string();
    let filter = parse_filter(args, Some(receiver.clone()))?;
    let students = ctx.store.load_all()?;
    let report = ReportService::run(&students, &filter);

    println!("{} {}", "Collections received by".bold(), receiver.bold());
    print_report(&report);
    Ok(())
}

fn parse_filter(args: &[String], received: Option<String>) -> Result<ReportFilter> {
    let mut subject_names: BTreeSet<String> = BTreeSet::new();
    let mut mode = ModeFilter::All;
    let mut date_from = None;
    let mut date_to = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--subject" => {
                let value = flag_value(&mut iter, "--subject")?;
                subject_names.insert(value);
            }
            "--mode" => {
                let value = flag_value(&mut iter, "--mode")?;
                mode = value.parse().map_err(AppError::Input)?;
            }
            "--from" => {
                let value = flag_value(&mut iter, "--from")?;
                date_from = Some(day_start(&value)?);
            }
            "--to" => {
                let value = flag_value(&mut iter, "--to")?;
                date_to = Some(day_end(&value)?);
            }
            other => {
                return Err(AppError::Input(format!("unknown report argument `{other}`")));
            }
        }
    }

    Ok(ReportFilter {
        subject_names: if subject_names.is_empty() {
            None
        } else {
            Some(subject_names)
        },
        mode,
        date_from,
        date_to,
        received,
    })
}

fn flag_value(iter: &mut std::slice::Iter<'_, String>, flag: &str) -> Result<String> {
    iter.next()
        .cloned()
        .ok_or_else(|| AppError::Input(format!("{flag} requires a value")))
}

fn day_start(raw: &str) -> Result<NaiveDateTime> {
    parse_day(raw).map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

fn day_end(raw: &str) -> Result<NaiveDateTime> {
    parse_day(raw).map(|date| date.and_hms_opt(23, 59, 59).unwrap_or_default())
}

fn parse_day(raw: &str) -> Result<chrono::NaiveDate> {
    timestamp::parse_date(raw)
        .ok_or_else(|| AppError::Input(format!("`{raw}` is not a DD/MM/YYYY date")))
}

fn print_report(report: &Report) {
    if report.students.is_empty() {
        println!("No entries match the filter.");
        return;
    }

    let mut entries = Table::new(
        Some("Matching entries"),
        vec![
            TableColumn::new("Student", 24),
            TableColumn::new("Subject", 20),
            TableColumn::new("Date", 20),
            TableColumn::new("Amount", 10),
            TableColumn::new("Mode", 8),
            TableColumn::new("Received by", 14),
        ],
    );
    for student in &report.students {
        for subject in &student.subjects {
            for entry in &subject.columns {
                entries.add_row(vec![
                    student.full_name(),
                    subject.subject_name.clone(),
                    entry.date.clone(),
                    entry.amount.clone(),
                    entry.mode.to_string(),
                    entry.received.clone(),
                ]);
            }
        }
    }
    print!("{}", entries.render());

    let mut collections = Table::new(
        Some("By subject"),
        vec![
            TableColumn::new("Subject", 20),
            TableColumn::new("Students", 8),
            TableColumn::new("Fees", 12),
            TableColumn::new("Collected", 12),
            TableColumn::new("Outstanding", 12),
        ],
    );
    for entry in ReportService::subject_collections(&report.students) {
        collections.add_row(vec![
            entry.subject_name,
            entry.students.to_string(),
            format!("{:.2}", entry.total_fees),
            format!("{:.2}", entry.collected),
            format!("{:.2}", entry.outstanding),
        ]);
    }
    println!();
    print!("{}", collections.render());

    let mut receivers = Table::new(
        Some("By receiver"),
        vec![
            TableColumn::new("Receiver", 14),
            TableColumn::new("Cash", 12),
            TableColumn::new("Online", 12),
            TableColumn::new("Total", 12),
        ],
    );
    for (receiver, totals) in &report.totals_by_receiver {
        receivers.add_row(vec![
            receiver.clone(),
            format!("{:.2}", totals.cash),
            format!("{:.2}", totals.online),
            format!("{:.2}", totals.total),
        ]);
    }
    println!();
    print!("{}", receivers.render());

    println!();
    println!(
        "{}: cash {:.2}, online {:.2}, total {:.2}",
        "Totals".bold(),
        report.totals_by_mode.cash,
        report.totals_by_mode.online,
        report.totals_by_mode.grand_total()
    );

    if report.malformed_amounts > 0 {
        println!(
            "{}",
            format!(
                "{} entr{} with unreadable amounts counted as zero",
                report.malformed_amounts,
                if report.malformed_amounts == 1 { "y" } else { "ies" }
            )
            .yellow()
        );
    }
    if report.malformed_dates > 0 {
        println!(
            "{}",
            format!(
                "{} entr{} excluded from the date range (unreadable date)",
                report.malformed_dates,
                if report.malformed_dates == 1 { "y" } else { "ies" }
            )
            .yellow()
        );
    }
}
