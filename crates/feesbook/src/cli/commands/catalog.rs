//! Subject/college/branch catalog maintenance.

use colored::Colorize;
use feesbook_config::Catalogs;

use crate::cli::CliContext;
use crate::errors::{AppError, Result};

/// Dispatches `catalog list|add|remove`.
pub fn run(ctx: &CliContext, args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("list") | None => list(ctx),
        Some("add") => mutate(ctx, &args[1..], Catalogs::add, "Added"),
        Some("remove") => mutate(ctx, &args[1..], Catalogs::remove, "Removed"),
        Some(other) => Err(AppError::Command(format!(
            "unknown catalog subcommand `{other}`"
        ))),
    }
}

fn list(ctx: &CliContext) -> Result<()> {
    print_section("Subjects", &ctx.config.catalogs.subjects);
    print_section("Colleges", &ctx.config.catalogs.colleges);
    print_section("Branches", &ctx.config.catalogs.branches);
    Ok(())
}

fn print_section(title: &str, entries: &[String]) {
    println!("{}", title.bold());
    if entries.is_empty() {
        println!("  (empty)");
    }
    for entry in entries {
        println!("  {entry}");
    }
}

fn mutate(
    ctx: &CliContext,
    args: &[String],
    apply: fn(&mut Vec<String>, &str) -> bool,
    verb: &str,
) -> Result<()> {
    ctx.session.require_admin("catalog change")?;

    let kind = args
        .first()
        .ok_or_else(|| AppError::Input("expected a catalog kind: subjects, colleges, or branches".into()))?;
    let name = args
        .get(1)
        .ok_or_else(|| AppError::Input("expected an entry name".into()))?;

    let mut config = ctx.config.clone();
    let target = match kind.as_str() {
        "subjects" => &mut config.catalogs.subjects,
        "colleges" => &mut config.catalogs.colleges,
        "branches" => &mut config.catalogs.branches,
        other => {
            return Err(AppError::Input(format!(
                "unknown catalog `{other}`, expected subjects, colleges, or branches"
            )))
        }
    };

    if !apply(target, name) {
        println!("No change: `{name}` {}", if verb == "Added" { "is already listed" } else { "was not listed" });
        return Ok(());
    }

    ctx.config_manager.save(&config)?;
    println!("{} `{name}` in {kind}", verb.green().bold());
    Ok(())
}
