//! Command-line interface: argument parsing, prompting, and rendering.

pub mod commands;
pub mod table;

use feesbook_config::{Config, ConfigManager};
use feesbook_core::{Role, Session, SystemClock};
use feesbook_storage_json::JsonStudentStore;

use crate::errors::{AppError, Result};

/// Everything a command handler needs to run.
pub struct CliContext {
    pub store: JsonStudentStore,
    pub session: Session,
    pub clock: SystemClock,
    pub config: Config,
    pub config_manager: ConfigManager,
}

/// Entry point used by the binary.
pub fn run_cli() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    run_with_args(&args)
}

/// Parses global flags, builds the context, and dispatches the command.
pub fn run_with_args(args: &[String]) -> Result<()> {
    let (operator, admin, rest) = split_global_flags(args)?;

    if rest.is_empty() || rest[0] == "help" || rest[0] == "--help" {
        print_usage();
        return Ok(());
    }

    let config_manager = ConfigManager::default_location()?;
    let config = config_manager.load()?;

    let operator = operator
        .or_else(|| config.default_operator.clone())
        .ok_or_else(|| {
            AppError::Input(
                "no operator given: pass --operator <name> or set default_operator".into(),
            )
        })?;
    let role = if admin { Role::Admin } else { Role::Staff };
    let session = Session::new(operator, role);

    let store = JsonStudentStore::with_base_dir(config.resolve_data_root())?;
    let ctx = CliContext {
        store,
        session,
        clock: SystemClock,
        config,
        config_manager,
    };

    let command = rest[0].as_str();
    let tail = &rest[1..];
    tracing::debug!(operator = %ctx.session.operator(), command, "dispatching");
    match command {
        "register" => commands::register::run(&ctx),
        "remove" => commands::register::remove(&ctx, tail),
        "pay" => commands::payment::run(&ctx, tail),
        "students" => commands::students::list(&ctx, tail),
        "show" => commands::students::show(&ctx, tail),
        "report" => commands::report::run(&ctx, tail),
        "summary" => commands::report::summary(&ctx, tail),
        "catalog" => commands::catalog::run(&ctx, tail),
        other => Err(AppError::Command(format!(
            "unknown command `{other}`, run `feesbook help`"
        ))),
    }
}

/// Pulls `--operator <name>` and `--admin` out of the argument list.
fn split_global_flags(args: &[String]) -> Result<(Option<String>, bool, Vec<String>)> {
    let mut operator = None;
    let mut admin = false;
    let mut rest = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--operator" => {
                let value = iter
                    .next()
                    .ok_or_else(|| AppError::Input("--operator requires a name".into()))?;
                operator = Some(value.clone());
            }
            "--admin" => admin = true,
            _ => rest.push(arg.clone()),
        }
    }

    Ok((operator, admin, rest))
}

fn print_usage() {
    println!("feesbook - tuition fee ledger");
    println!();
    println!("USAGE:");
    println!("  feesbook [--operator <name>] [--admin] <command> [args]");
    println!();
    println!("COMMANDS:");
    println!("  register                         Register a new student (admin)");
    println!("  remove <id>                      Remove a student (admin)");
    println!("  pay <id>                         Record payments for a student");
    println!("  students [--sort latest|remaining]");
    println!("                                   List students with balances");
    println!("  show <id>                        Show one student's ledger");
    println!("  report [--subject <name>]... [--mode cash|online]");
    println!("         [--from DD/MM/YYYY] [--to DD/MM/YYYY]");
    println!("                                   Collection report over all students");
    println!("  summary [--from DD/MM/YYYY] [--to DD/MM/YYYY]");
    println!("                                   Report scoped to the current operator");
    println!("  catalog list                     Show subject/college/branch catalogs");
    println!("  catalog add <kind> <name>        Add a catalog entry (admin)");
    println!("  catalog remove <kind> <name>     Remove a catalog entry (admin)");
    println!("  help                             Show this message");
}
