//! MarketDesk CLI: operator commands over the same adapters and store the
//! web server uses.
//!
//! Commands:
//! - `movers`: fetch and print NSE/BSE top gainers and losers
//! - `leads list`: summarize stored lead submissions
//! - `leads export`: write all leads to a CSV file
//! - `users list`: print registered usernames and emails

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use marketdesk_core::{
    AppConfig, BseProvider, MarketSource, NseProvider, QuoteRow, RankedTable,
};
use marketdesk_store::{PasswordHasher, Store};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "marketdesk", about = "MarketDesk CLI: market movers and lead desk")]
struct Cli {
    /// Path to a TOML config file. Defaults to $MARKETDESK_CONFIG, then built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding users.jsonl and leads.jsonl. Overrides the config.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print top gainers and losers.
    Movers {
        /// Which exchange to query.
        #[arg(long, value_enum, default_value_t = SourceArg::All)]
        source: SourceArg,
    },
    /// Lead submissions.
    Leads {
        #[command(subcommand)]
        action: LeadsAction,
    },
    /// Registered users.
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand)]
enum LeadsAction {
    /// Print one line per lead with its interest flags.
    List,
    /// Export all leads as CSV.
    Export {
        /// Output file.
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// Print usernames, emails, and signup times.
    List,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceArg {
    Nse,
    Bse,
    All,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.server.data_dir = dir;
    }

    match cli.command {
        Commands::Movers { source } => run_movers(&config, source),
        Commands::Leads { action } => match action {
            LeadsAction::List => run_leads_list(&config),
            LeadsAction::Export { out } => run_leads_export(&config, &out),
        },
        Commands::Users { action } => match action {
            UsersAction::List => run_users_list(&config),
        },
    }
}

fn open_store(config: &AppConfig) -> Result<Store> {
    let hasher = PasswordHasher::new(config.server.bcrypt_cost)?;
    Store::open(&config.server.data_dir, hasher)
        .with_context(|| format!("opening store at {}", config.server.data_dir.display()))
}

fn run_movers(config: &AppConfig, source: SourceArg) -> Result<()> {
    let mut sources: Vec<Box<dyn MarketSource>> = Vec::new();
    if matches!(source, SourceArg::Nse | SourceArg::All) {
        sources.push(Box::new(NseProvider::new(config.market.nse.clone())));
    }
    if matches!(source, SourceArg::Bse | SourceArg::All) {
        sources.push(Box::new(BseProvider::new(config.market.bse.clone())));
    }

    for provider in &sources {
        let movers = provider.movers_or_placeholder();
        for table in [&movers.gainers, &movers.losers] {
            println!("{} {}", provider.id(), table.direction.label());
            println!("{}", format_table(table));
        }
    }
    Ok(())
}

const TABLE_HEADER: [&str; 7] = ["Symbol", "Open", "High", "Low", "Last", "Prev Close", "% Chg"];

/// Fixed-width terminal rendering. Placeholder tables print the message only.
fn format_table(table: &RankedTable) -> String {
    if let Some(message) = table.failure() {
        return format!("  {message}\n");
    }
    let mut out = format!(
        "{:<14} {:>10} {:>10} {:>10} {:>10} {:>10} {:>8}\n",
        TABLE_HEADER[0],
        TABLE_HEADER[1],
        TABLE_HEADER[2],
        TABLE_HEADER[3],
        TABLE_HEADER[4],
        TABLE_HEADER[5],
        TABLE_HEADER[6],
    );
    out.push_str(&"-".repeat(80));
    out.push('\n');
    for row in table.rows() {
        out.push_str(&format_row(row));
    }
    out
}

fn format_row(row: &QuoteRow) -> String {
    format!(
        "{:<14} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>+8.2}\n",
        row.symbol,
        row.open,
        row.day_high,
        row.day_low,
        row.last_price,
        row.previous_close,
        row.percent_change
    )
}

fn yes_no_flag(value: &str) -> &'static str {
    if value.eq_ignore_ascii_case("yes") {
        "Y"
    } else {
        "-"
    }
}

fn run_leads_list(config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;
    let leads = store.leads.all()?;
    if leads.is_empty() {
        println!("No leads in {}", store.data_dir().display());
        return Ok(());
    }

    println!("Leads: {}", leads.len());
    println!();
    println!(
        "{:<20} {:<24} {:<15} {:<15} {:>3} {:>3} {:>3} {:>3}",
        "Submitted", "Name", "Phone", "WhatsApp", "INS", "MF", "SR", "EC"
    );
    println!("{}", "-".repeat(105));
    for lead in &leads {
        let form = &lead.form;
        println!(
            "{:<20} {:<24} {:<15} {:<15} {:>3} {:>3} {:>3} {:>3}",
            lead.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            form.name,
            form.phone,
            form.whatsapp,
            yes_no_flag(&form.insurance),
            yes_no_flag(&form.mutualfund),
            yes_no_flag(&form.stockresearch),
            yes_no_flag(&form.expertcall),
        );
    }
    Ok(())
}

fn run_leads_export(config: &AppConfig, out: &Path) -> Result<()> {
    let store = open_store(config)?;
    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    let written = store.leads.export_csv(BufWriter::new(file))?;
    println!("Exported {written} leads to {}", out.display());
    Ok(())
}

fn run_users_list(config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;
    let users = store.users.all()?;
    if users.is_empty() {
        println!("No users in {}", store.data_dir().display());
        return Ok(());
    }

    println!("Users: {}", users.len());
    println!();
    println!("{:<20} {:<32} {:<20}", "Username", "Email", "Created");
    println!("{}", "-".repeat(74));
    for user in &users {
        println!(
            "{:<20} {:<32} {:<20}",
            user.username,
            user.email,
            user.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use marketdesk_core::Direction;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "marketdesk",
            "leads",
            "export",
            "--out",
            "leads.csv",
            "--data-dir",
            "/tmp/md",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/md")));
        assert!(matches!(
            cli.command,
            Commands::Leads {
                action: LeadsAction::Export { .. }
            }
        ));
    }

    #[test]
    fn movers_defaults_to_all_sources() {
        let cli = Cli::try_parse_from(["marketdesk", "movers"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Movers {
                source: SourceArg::All
            }
        ));
        assert!(Cli::try_parse_from(["marketdesk", "movers", "--source", "nyse"]).is_err());
    }

    #[test]
    fn placeholder_prints_message_only() {
        let table = RankedTable::placeholder(Direction::Gainers, "NSE API Error: timeout");
        assert_eq!(format_table(&table), "  NSE API Error: timeout\n");
    }

    #[test]
    fn rows_are_fixed_width() {
        let row = QuoteRow {
            last_price: 3900.0,
            percent_change: 2.5,
            ..QuoteRow::empty("TCS")
        };
        let table = RankedTable::from_ranked(Direction::Gainers, vec![row]);
        let text = format_table(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("TCS "));
        assert!(lines[2].ends_with("   +2.50"));
        assert!(lines[2].contains("3900.00"));
    }
}
