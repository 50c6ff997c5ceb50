//! Student registration and removal.

use colored::Colorize;
use feesbook_core::{NewStudent, NewSubject, RegistrationService, StudentStore};

use crate::cli::CliContext;
use crate::errors::Result;

use super::{confirm, parse_student_id, select, text_input};

/// Interactive registration form. Subjects are picked from the configured
/// catalog; validation happens in one pass so the operator sees every
/// missing field at once.
pub fn run(ctx: &CliContext) -> Result<()> {
    let catalog = &ctx.config.catalogs.subjects;

    let mut draft = NewStudent {
        first_name: text_input("First name")?,
        middle_name: text_input("Middle name (optional)")?,
        last_name: text_input("Last name")?,
        college_name: text_input("College")?,
        branch: text_input("Branch")?,
        whatsapp_number: text_input("WhatsApp number")?,
        calling_number: text_input("Calling number")?,
        subjects: Vec::new(),
    };

    loop {
        if catalog.is_empty() {
            println!(
                "{}",
                "No subjects configured yet; add some with `catalog add subjects <name>`".yellow()
            );
            break;
        }
        let index = select("Subject", catalog)?;
        let total_fees = text_input("Total fees")?;
        draft.subjects.push(NewSubject {
            subject_name: catalog[index].clone(),
            total_fees,
        });
        if !confirm("Add another subject?")? {
            break;
        }
    }

    let student = RegistrationService::create(
        &ctx.store,
        &ctx.session,
        &ctx.clock,
        &draft,
        catalog,
    )?;

    println!(
        "{} {} (id {})",
        "Registered".green().bold(),
        student.full_name(),
        student.id
    );
    Ok(())
}

/// `remove <id>` with a confirmation prompt; removal is permanent.
pub fn remove(ctx: &CliContext, args: &[String]) -> Result<()> {
    let student_id = parse_student_id(args)?;
    let versioned = ctx.store.find_by_id(student_id)?;
    let name = versioned.student.full_name();

    if !confirm(&format!("Remove {name} and all payment history?"))? {
        println!("Cancelled.");
        return Ok(());
    }

    RegistrationService::remove(&ctx.store, &ctx.session, student_id)?;
    println!("{} {name}", "Removed".green().bold());
    Ok(())
}
