//! Read-only student listings.

use colored::Colorize;
use feesbook_core::{
    student_remaining, subject_balance, ReportService, StudentSort, StudentStore,
};

use crate::cli::table::{Table, TableColumn};
use crate::cli::CliContext;
use crate::errors::{AppError, Result};

use super::parse_student_id;

/// `students [--sort latest|remaining]`
pub fn list(ctx: &CliContext, args: &[String]) -> Result<()> {
    let sort = parse_sort(args)?;
    let mut students = ctx.store.load_all()?;
    if let Some(sort) = sort {
        students = ReportService::sorted_students(&students, sort);
    }

    if students.is_empty() {
        println!("No students registered.");
        return Ok(());
    }

    let mut table = Table::new(
        Some("Students"),
        vec![
            TableColumn::new("Id", 14),
            TableColumn::new("Name", 24),
            TableColumn::new("College", 18),
            TableColumn::new("Branch", 12),
            TableColumn::new("Remaining", 10),
        ],
    );
    for student in &students {
        table.add_row(vec![
            student.id.to_string(),
            student.full_name(),
            student.college_name.clone(),
            student.branch.clone(),
            format!("{:.2}", student_remaining(student)),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}

/// `show <id>`: one student's subjects, balances, and entries newest first.
pub fn show(ctx: &CliContext, args: &[String]) -> Result<()> {
    let student_id = parse_student_id(args)?;
    let versioned = ctx.store.find_by_id(student_id)?;
    let student = versioned.student;

    println!("{} (id {})", student.full_name().bold(), student.id);
    println!("{} / {}", student.college_name, student.branch);
    println!(
        "WhatsApp {} | Calling {}",
        student.whatsapp_number, student.calling_number
    );

    for subject in &student.subjects {
        let balance = subject_balance(subject);
        println!();
        println!(
            "{} - total {}, paid {:.2}, remaining {:.2}",
            subject.subject_name.bold(),
            subject.total_fees,
            balance.paid,
            balance.remaining
        );

        let entries = ReportService::entries_newest_first(subject);
        if entries.is_empty() {
            println!("  (no payments yet)");
            continue;
        }
        let mut table = Table::new(
            None::<String>,
            vec![
                TableColumn::new("Date", 20),
                TableColumn::new("Amount", 10),
                TableColumn::new("Mode", 8),
                TableColumn::new("Received by", 14),
            ],
        );
        for entry in &entries {
            table.add_row(vec![
                entry.date.clone(),
                entry.amount.clone(),
                entry.mode.to_string(),
                entry.received.clone(),
            ]);
        }
        print!("{}", table.render());
    }
    Ok(())
}

fn parse_sort(args: &[String]) -> Result<Option<StudentSort>> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--sort" {
            let value = iter
                .next()
                .ok_or_else(|| AppError::Input("--sort requires `latest` or `remaining`".into()))?;
            return match value.as_str() {
                "latest" => Ok(Some(StudentSort::LatestEntry)),
                "remaining" => Ok(Some(StudentSort::Remaining)),
                other => Err(AppError::Input(format!(
                    "unknown sort `{other}`, expected `latest` or `remaining`"
                ))),
            };
        }
    }
    Ok(None)
}
