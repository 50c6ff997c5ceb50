//! Payment capture: fills draft rows per subject and appends the batch.

use colored::Colorize;
use feesbook_core::{
    subject_balance, AppendRequest, PaymentService, Receipt, StudentStore,
};

use crate::cli::table::{Table, TableColumn};
use crate::cli::CliContext;
use crate::errors::Result;

use super::{confirm, parse_student_id, select, text_input};

const MODE_OPTIONS: [&str; 2] = ["Cash", "Online"];

/// `pay <id>`: one prompt round per subject, blank amount skips the row.
/// The whole batch is appended atomically and the receipt printed.
pub fn run(ctx: &CliContext, args: &[String]) -> Result<()> {
    let student_id = parse_student_id(args)?;
    let versioned = ctx.store.find_by_id(student_id)?;
    let student = versioned.student;

    println!("{} (id {})", student.full_name().bold(), student.id);

    let mut drafts = PaymentService::prepare_drafts(&student, &ctx.session, &ctx.clock);
    let mode_options: Vec<String> = MODE_OPTIONS.iter().map(|m| m.to_string()).collect();

    for draft in &mut drafts {
        let subject = match student.subject(draft.subject_index) {
            Some(subject) => subject,
            None => continue,
        };
        let balance = subject_balance(subject);
        println!(
            "{}: paid {:.2}, remaining {:.2}",
            subject.subject_name.bold(),
            balance.paid,
            balance.remaining
        );

        let amount = text_input("Amount (blank to skip)")?;
        if amount.trim().is_empty() {
            continue;
        }
        let mode = select("Mode", &mode_options)?;
        draft.entry.amount = amount;
        draft.entry.mode = mode_options[mode].clone();
    }

    let filled = drafts
        .iter()
        .filter(|draft| !draft.entry.is_untouched())
        .count();
    if filled == 0 {
        println!("Nothing entered; ledger unchanged.");
        return Ok(());
    }
    if !confirm(&format!("Append {filled} payment(s)?"))? {
        println!("Cancelled.");
        return Ok(());
    }

    let request = AppendRequest { student_id, drafts };
    let outcome = PaymentService::append(&ctx.store, &ctx.session, &ctx.clock, &request)?;
    print_receipt(&outcome.receipt);
    Ok(())
}

fn print_receipt(receipt: &Receipt) {
    if receipt.lines.is_empty() {
        println!("No entries were appended.");
        return;
    }

    let mut table = Table::new(
        Some(format!(
            "Receipt {} - {} ({})",
            receipt.id, receipt.student_name, receipt.recorded_at
        )),
        vec![
            TableColumn::new("Subject", 20),
            TableColumn::new("Amount", 10),
            TableColumn::new("Mode", 8),
            TableColumn::new("Received by", 14),
        ],
    );
    for line in &receipt.lines {
        table.add_row(vec![
            line.subject_name.clone(),
            line.amount.clone(),
            line.mode.to_string(),
            line.received.clone(),
        ]);
    }
    print!("{}", table.render());
}
