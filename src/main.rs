use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tally::cli::{
    handle_audit_command, handle_budget_command, handle_category_command, handle_export_command,
    handle_import_command, handle_report_command, handle_restore_command,
    handle_statement_command, handle_transaction_command, parse_mapping_override, BudgetCommands,
    CategoryCommands, ExportCommands, ReportArgs, StatementArgs, TransactionCommands,
};
use tally::config::{paths::TallyPaths, settings::Settings};
use tally::services::import::FieldKind;
use tally::storage::{init, Storage};

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Personal income and expense tracker",
    long_about = "tally records income and expense transactions, imports bank CSV \
                  exports with automatic categorization, and reports totals, \
                  category breakdowns and savings over time."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Budget percentage commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Import transactions from CSV files
    Import {
        /// CSV files, processed in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Override a column mapping, e.g. --map "Posted On=date"
        #[arg(short, long = "map", value_parser = parse_mapping_override)]
        overrides: Vec<(String, FieldKind)>,

        /// Import nothing from a file if any of its rows is invalid
        #[arg(long)]
        strict: bool,
    },

    /// Summary report for a period
    Report(ReportArgs),

    /// Printable monthly statement
    Statement(StatementArgs),

    /// Export data
    #[command(subcommand)]
    Export(ExportCommands),

    /// Replace all data with a JSON or YAML backup
    Restore {
        /// Backup file
        file: PathBuf,

        /// Confirm replacing current data
        #[arg(long)]
        yes: bool,
    },

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = TallyPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    if init::needs_initialization(&paths) {
        init::initialize_storage(&paths)?;
    }

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?.with_audit(settings.audit_enabled);
    storage.load_all()?;

    match cli.command {
        Some(Commands::Transaction(cmd)) => handle_transaction_command(&storage, cmd)?,
        Some(Commands::Category(cmd)) => handle_category_command(&storage, cmd)?,
        Some(Commands::Budget(cmd)) => handle_budget_command(&storage, &settings, cmd)?,
        Some(Commands::Import {
            files,
            overrides,
            strict,
        }) => handle_import_command(&storage, &settings, files, overrides, strict)?,
        Some(Commands::Report(args)) => handle_report_command(&storage, &settings, args)?,
        Some(Commands::Statement(args)) => handle_statement_command(&storage, args)?,
        Some(Commands::Export(cmd)) => handle_export_command(&storage, cmd)?,
        Some(Commands::Restore { file, yes }) => handle_restore_command(&storage, file, yes)?,
        Some(Commands::Audit { limit }) => handle_audit_command(&storage, limit)?,
        Some(Commands::Init) => {
            init::initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialized tally at: {}", paths.base_dir().display());
            println!("Run 'tally category list' to see the default categories.");
        }
        Some(Commands::Config) => {
            println!("tally Configuration");
            println!("===================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Default period:  {}", settings.default_period);
            println!("  Import policy:   {}", settings.import_policy);
            println!("  Audit enabled:   {}", settings.audit_enabled);
        }
        None => {
            println!("tally - personal income and expense tracker");
            println!();
            println!("Run 'tally --help' for usage information.");
        }
    }

    Ok(())
}
