//! Command-line front end for the repair-shop core.
//!
//! # Responsibility
//! - Parse subcommands and map them onto `RepairService` calls.
//! - Print results as JSON and map service error kinds to exit codes.
//!
//! # Invariants
//! - Exit codes are stable: 0 ok, 2 not found, 3 conflict, 4 invalid,
//!   1 storage or setup failure.
//! - Only successful results go to stdout; failure envelopes go to stderr.

use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use repair_core::db::open_db;
use repair_core::{
    init_logging, ErrorKind, InMemoryRepairRepository, PhoneNumber, RepairConfig, RepairId,
    RepairRegistrationRequest, RepairRepository, RepairService, RepairUpdateRequest,
    SqliteRepairRepository,
};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "repair",
    version = repair_core::core_version(),
    about = "Manage device repair tickets"
)]
struct Cli {
    /// SQLite database file (defaults to REPAIR_DB_PATH or a temp-dir file).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every repair ticket.
    List,
    /// Show one repair ticket.
    Get { id: RepairId },
    /// Register a new repair ticket.
    Add(AddArgs),
    /// Patch fields of an existing repair ticket.
    Update {
        id: RepairId,
        #[command(flatten)]
        fields: UpdateArgs,
    },
    /// Delete a repair ticket.
    Delete { id: RepairId },
    /// Insert the sample tickets into the database, skipping taken phone numbers.
    Seed,
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    brand: String,
    #[arg(long)]
    issue: String,
    #[arg(long)]
    phone_number: PhoneNumber,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    phone_number: Option<PhoneNumber>,
    #[arg(long)]
    issue: Option<String>,
}

impl From<AddArgs> for RepairRegistrationRequest {
    fn from(value: AddArgs) -> Self {
        Self {
            name: value.name,
            title: value.title,
            brand: value.brand,
            issue: value.issue,
            phone_number: value.phone_number,
        }
    }
}

impl From<UpdateArgs> for RepairUpdateRequest {
    fn from(value: UpdateArgs) -> Self {
        Self {
            name: value.name,
            title: value.title,
            brand: value.brand,
            phone_number: value.phone_number,
            issue: value.issue,
        }
    }
}

#[derive(Debug, Serialize)]
struct Outcome {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    message: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = RepairConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => return fail(ExitCode::from(1), None, format!("database open failed: {err}")),
    };
    let repo = match SqliteRepairRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => return fail(ExitCode::from(1), None, format!("store init failed: {err}")),
    };

    run(cli.command, &repo)
}

fn run(command: Command, repo: &SqliteRepairRepository<'_>) -> ExitCode {
    let service = RepairService::new(repo);
    let result = match command {
        Command::List => service.list_repairs().map(|repairs| print_json(&repairs)),
        Command::Get { id } => service.get_repair(id).map(|repair| print_json(&repair)),
        Command::Add(args) => service
            .add_repair(args.into())
            .map(|()| print_ok("Repair registered.")),
        Command::Update { id, fields } => service
            .update_repair(id, fields.into())
            .map(|()| print_ok("Repair updated.")),
        Command::Delete { id } => service
            .delete_repair(id)
            .map(|()| print_ok("Repair deleted.")),
        Command::Seed => {
            let inserted = seed(&service);
            print_ok(format!("Seeded {inserted} repair(s)."));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (code, label): (u8, &'static str) = match err.kind() {
                ErrorKind::NotFound => (2, "not_found"),
                ErrorKind::Conflict => (3, "conflict"),
                ErrorKind::Invalid => (4, "invalid"),
                ErrorKind::Storage => (1, "storage"),
            };
            fail(ExitCode::from(code), Some(label), err.to_string())
        }
    }
}

fn seed<R: RepairRepository>(service: &RepairService<R>) -> usize {
    let samples = match InMemoryRepairRepository::with_sample_data().list_repairs() {
        Ok(samples) => samples,
        Err(err) => {
            warn!("event=seed module=cli status=error error={err}");
            return 0;
        }
    };

    let mut inserted = 0;
    for sample in samples {
        let request = RepairRegistrationRequest {
            name: sample.name,
            title: sample.title,
            brand: sample.brand,
            issue: sample.issue,
            phone_number: sample.phone_number,
        };
        match service.add_repair(request) {
            Ok(()) => inserted += 1,
            Err(err) if err.kind() == ErrorKind::Conflict => {}
            Err(err) => warn!("event=seed module=cli status=error error={err}"),
        }
    }

    let total = service.list_repairs().map_or(0, |all| all.len());
    info!("event=seed module=cli status=ok inserted={inserted} total={total}");
    inserted
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn print_json<T: Serialize>(value: &T) {
    if let Err(err) = write_json(&mut std::io::stdout().lock(), value) {
        eprintln!("failed to write output: {err}");
    }
}

fn print_ok(message: impl Into<String>) {
    print_json(&Outcome {
        ok: true,
        kind: None,
        message: message.into(),
    });
}

fn write_failure<W: Write>(
    out: &mut W,
    kind: Option<&'static str>,
    message: String,
) -> std::io::Result<()> {
    write_json(
        out,
        &Outcome {
            ok: false,
            kind,
            message,
        },
    )
}

fn fail(code: ExitCode, kind: Option<&'static str>, message: String) -> ExitCode {
    if let Err(err) = write_failure(&mut std::io::stderr().lock(), kind, message) {
        warn!("event=cli_output module=cli status=error error={err}");
    }
    code
}
