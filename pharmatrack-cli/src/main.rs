use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pharmatrack::{
    export, InventoryRecord, Query, RawFields, RecordId, SearchColumn, Store, TrackerConfig,
};
use std::path::PathBuf;
use std::process;

/// pharmatrack — pharmacy inventory and expiry tracker
#[derive(Parser)]
#[command(name = "pharmatrack", version, about)]
struct Cli {
    /// Config file (default: ./pharmatrack.yaml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config and PHARMATRACK_DB)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Add a new product batch
    Add(RecordArgs),

    /// Overwrite every field of an existing record
    Update {
        /// Record ID
        id: RecordId,
        #[command(flatten)]
        record: RecordArgs,
    },

    /// Delete a record
    Delete {
        /// Record ID
        id: RecordId,
        /// Show what would be deleted without actually deleting
        #[arg(long)]
        dry_run: bool,
    },

    /// Show a single record
    Get {
        /// Record ID
        id: RecordId,
    },

    /// List all records, soonest expiry first
    List,

    /// Substring search on one column
    Search {
        /// product_name, category, batch_no or supplier
        #[arg(value_parser = parse_search_column)]
        column: SearchColumn,
        /// Text to look for (case-insensitive); omit to list everything
        text: Option<String>,
    },

    /// Records expiring within N days (including already expired)
    Expiring {
        /// Window in days (default from config)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Records with quantity at or below a threshold
    LowStock {
        /// Threshold (default from config)
        #[arg(long)]
        threshold: Option<u32>,
    },

    /// Export a view to CSV
    Export {
        /// Output file (default: <export_dir>/pharmacy_export_<timestamp>.csv)
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        view: ViewArgs,
    },
}

/// Form fields, passed as raw text and validated by the library
#[derive(Args)]
struct RecordArgs {
    /// Product name
    #[arg(long)]
    name: String,
    /// Quantity on hand
    #[arg(long)]
    quantity: String,
    #[arg(long, default_value = "")]
    category: String,
    /// Batch number
    #[arg(long, default_value = "")]
    batch: String,
    /// Unit price
    #[arg(long, default_value = "")]
    price: String,
    #[arg(long, default_value = "")]
    supplier: String,
    /// Expiry date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    expiry: String,
}

impl From<RecordArgs> for RawFields {
    fn from(args: RecordArgs) -> Self {
        RawFields {
            product_name: args.name,
            category: args.category,
            batch_no: args.batch,
            quantity: args.quantity,
            price: args.price,
            supplier: args.supplier,
            expiry_date: args.expiry,
        }
    }
}

/// Which records to export; all records when no option is given
#[derive(Args)]
struct ViewArgs {
    /// Search column, used with --search
    #[arg(long, value_parser = parse_search_column, requires = "search")]
    search_in: Option<SearchColumn>,
    /// Search text
    #[arg(long, requires = "search_in", conflicts_with_all = ["expiring", "below"])]
    search: Option<String>,
    /// Only records expiring within N days
    #[arg(long, conflicts_with = "below")]
    expiring: Option<u32>,
    /// Only records with quantity at or below N
    #[arg(long)]
    below: Option<u32>,
}

impl ViewArgs {
    fn to_query(&self) -> Query {
        if let (Some(column), Some(needle)) = (self.search_in, &self.search) {
            return Query::Search {
                column,
                needle: needle.clone(),
            };
        }
        if let Some(days) = self.expiring {
            return Query::ExpiringWithin(days);
        }
        if let Some(threshold) = self.below {
            return Query::BelowQuantity(threshold);
        }
        Query::All
    }
}

fn parse_search_column(s: &str) -> Result<SearchColumn, String> {
    s.parse()
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = TrackerConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database = db;
    }

    let store = Store::open(&config.database)?;

    match cli.command {
        Command::Add(record) => {
            let id = store.add(&record.into())?;
            print_output(&serde_json::json!({ "id": id }), &cli.format)?;
        }

        Command::Update { id, record } => {
            store.edit(id, &record.into())?;
            print_output(&serde_json::json!({ "ok": true, "id": id }), &cli.format)?;
        }

        Command::Delete { id, dry_run } => {
            if dry_run {
                let record = store.get(id)?;
                print_output(
                    &serde_json::json!({
                        "dry_run": true,
                        "would_delete": record,
                    }),
                    &cli.format,
                )?;
            } else {
                store.delete(id)?;
                print_output(&serde_json::json!({ "ok": true, "deleted": id }), &cli.format)?;
            }
        }

        Command::Get { id } => {
            let record = store.get(id)?;
            print_output(&serde_json::to_value(record)?, &cli.format)?;
        }

        Command::List => {
            print_records(&store.list_all()?, &cli.format)?;
        }

        Command::Search { column, text } => {
            let text = text.unwrap_or_default();
            print_records(&store.search(column, &text)?, &cli.format)?;
        }

        Command::Expiring { days } => {
            let days = days.unwrap_or(config.expiring_days);
            let today = store.today();
            let rows = store
                .expiring_within(days)?
                .iter()
                .map(|record| expiring_row(record, today))
                .collect::<Result<Vec<_>, _>>()?;
            print_output(&serde_json::Value::Array(rows), &cli.format)?;
        }

        Command::LowStock { threshold } => {
            let threshold = threshold.unwrap_or(config.low_stock_threshold);
            print_records(&store.below_quantity(threshold)?, &cli.format)?;
        }

        Command::Export { output, view } => {
            let query = view.to_query();
            let records = store.run(&query)?;
            let path = output
                .unwrap_or_else(|| export::default_export_path(&config.export_dir, store.now()));
            let written = export::export_to_path(&records, &path)?;
            print_output(
                &serde_json::json!({
                    "ok": true,
                    "view": query.to_string(),
                    "rows": written,
                    "path": path.display().to_string(),
                }),
                &cli.format,
            )?;
        }
    }

    store.close()?;
    Ok(())
}

fn print_records(
    records: &[InventoryRecord],
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    print_output(&serde_json::to_value(records)?, format)
}

/// A record as shown by `expiring`, flagged when it is already past its date
fn expiring_row(
    record: &InventoryRecord,
    today: NaiveDate,
) -> Result<serde_json::Value, serde_json::Error> {
    let mut value = serde_json::to_value(record)?;
    if let Some(fields) = value.as_object_mut() {
        fields.insert("expired".into(), record.is_expired(today).into());
    }
    Ok(value)
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(value)?);
        }
    }
    Ok(())
}
