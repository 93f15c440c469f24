//! Enrollkv CLI
//!
//! Opens a data directory, runs one operation, and prints the result as JSON.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use enrollkv::config::WalSyncStrategy;
use enrollkv::{Config, ErrorKind, NewStudent, Reply, Request, StudentPatch, StudentService};
use tracing_subscriber::{fmt, EnvFilter};

/// Enrollkv CLI
#[derive(Parser, Debug)]
#[command(name = "enrollkv-cli")]
#[command(about = "CLI for the Enrollkv student record store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./enrollkv_data")]
    data_dir: String,

    /// Accept enrollment dates that are not YYYY-MM-DD
    #[arg(long)]
    no_date_validation: bool,

    /// fsync the WAL only every N writes instead of after each one; a hard
    /// kill can then lose up to N-1 acknowledged writes
    #[arg(long, value_name = "N")]
    batch_sync: Option<usize>,

    /// MemTable size limit in KB before flush
    #[arg(short = 'm', long, default_value = "4096")]
    memtable_kb: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every student in store order
    List,

    /// Get a student by id
    Get { id: String },

    /// Create a student
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Enrollment date (YYYY-MM-DD)
        #[arg(long)]
        enrollment_date: String,
        #[arg(long)]
        major: String,
    },

    /// Update any subset of a student's fields
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        enrollment_date: Option<String>,
        #[arg(long)]
        major: Option<String>,
    },

    /// Delete a student by id
    Delete { id: String },

    /// Students with exactly this major
    ByMajor { major: String },

    /// Students enrolled between two dates (inclusive)
    ByDateRange { start: String, end: String },

    /// Students enrolled in a year
    ByYear { year: i32 },

    /// Students with a major, enrolled in a year
    ByMajorYear { major: String, year: i32 },

    /// Case-insensitive name search
    Search { fragment: String },

    /// Get a student by exact email
    ByEmail { email: String },

    /// Count students with a major
    CountMajor { major: String },

    /// Change a student's major
    SetMajor { id: String, major: String },

    /// Change a student's email
    SetEmail { id: String, email: String },

    /// Change a student's name
    SetName { id: String, name: String },

    /// One page of students (1-based)
    Page {
        page: i64,
        #[arg(default_value = "10")]
        page_size: i64,
    },

    /// Every student ordered by name
    Sorted,

    /// Run a JSON-encoded request, e.g. '{"op":"get","id":"..."}'
    Exec { request: String },

    /// Merge on-disk tables
    Compact,
}

impl Commands {
    fn into_request(self) -> Result<Request, String> {
        Ok(match self {
            Commands::List => Request::List,
            Commands::Get { id } => Request::Get { id },
            Commands::Create { name, email, enrollment_date, major } => Request::Create {
                payload: NewStudent::new(name, email, enrollment_date, major),
            },
            Commands::Update { id, name, email, enrollment_date, major } => Request::Update {
                id,
                patch: StudentPatch { name, email, enrollment_date, major },
            },
            Commands::Delete { id } => Request::Delete { id },
            Commands::ByMajor { major } => Request::FilterByMajor { major },
            Commands::ByDateRange { start, end } => Request::FilterByDateRange { start, end },
            Commands::ByYear { year } => Request::FilterByYear { year },
            Commands::ByMajorYear { major, year } => Request::FilterByMajorAndYear { major, year },
            Commands::Search { fragment } => Request::SearchByName { fragment },
            Commands::ByEmail { email } => Request::GetByEmail { email },
            Commands::CountMajor { major } => Request::CountByMajor { major },
            Commands::SetMajor { id, major } => Request::UpdateMajor { id, major },
            Commands::SetEmail { id, email } => Request::UpdateEmail { id, email },
            Commands::SetName { id, name } => Request::UpdateName { id, name },
            Commands::Page { page, page_size } => Request::Paginate { page, page_size },
            Commands::Sorted => Request::SortedByName,
            Commands::Exec { request } => {
                serde_json::from_str(&request).map_err(|e| format!("invalid request JSON: {}", e))?
            }
            Commands::Compact => return Err("compact is not a request".to_string()),
        })
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,enrollkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .wal_sync_strategy(sync_strategy(args.batch_sync))
        .memtable_size_limit(args.memtable_kb * 1024)
        .validate_enrollment_date(!args.no_date_validation)
        .build();

    let service = match StudentService::open(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to open store at {}: {}", args.data_dir, e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = match args.command {
        Commands::Compact => service
            .compact()
            .map(|live| serde_json::json!({ "liveRecords": live }))
            .map_err(|e| (e.kind(), e.to_string())),
        command => match command.into_request() {
            Ok(request) => service
                .execute(request)
                .map_err(|e| (e.kind(), e.to_string()))
                .and_then(render),
            Err(msg) => Err((ErrorKind::Validation, msg)),
        },
    };

    let code = match outcome {
        Ok(json) => {
            match serde_json::to_string_pretty(&json) {
                Ok(text) => {
                    println!("{}", text);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("error: {}", e);
                    ExitCode::from(exit_code(ErrorKind::Internal))
                }
            }
        }
        Err((kind, msg)) => {
            eprintln!("error: {}", msg);
            ExitCode::from(exit_code(kind))
        }
    };

    if let Err(e) = service.close() {
        tracing::error!("Failed to close store: {}", e);
        return ExitCode::FAILURE;
    }

    code
}

/// `None` syncs every write; `Some(n)` batches fsyncs every `n` entries
fn sync_strategy(batch: Option<usize>) -> WalSyncStrategy {
    match batch {
        Some(count) => WalSyncStrategy::EveryNEntries { count },
        None => WalSyncStrategy::EveryWrite,
    }
}

fn render(reply: Reply) -> Result<serde_json::Value, (ErrorKind, String)> {
    serde_json::to_value(reply)
        .map_err(|e| (ErrorKind::Internal, format!("failed to encode reply: {}", e)))
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Validation => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Capacity => 4,
    }
}
