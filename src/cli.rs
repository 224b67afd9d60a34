use anyhow::{anyhow, bail, ensure, Context as _, Result};
use chrono::NaiveDate;
use console::{pad_str, style, Alignment, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use std::fmt::Display;
use std::io::stdout;
use std::path::{Path, PathBuf};

use crate::args::{Args, Command};
use crate::books::{Books, JournalKind};
use crate::config::Config;
use crate::db::today;
use crate::export;
use crate::posting::PostingReport;
use crate::records::{
    AccountNumber, FuelCardEntry, FuelPurchaseEntry, GeneralLedgerEntry, ReserveEntry, TollEntry,
};
use crate::terminal::{self, BulletPointPrinter};

const DEFAULT_DATA_DIR: &str = "haulbooks-data";

pub fn main(args: Args) -> Result<()> {
    let Args { config, command } = args;
    match command {
        Command::Init { data_dir } => Cli::init(&config, data_dir),
        command => Cli::load(&config)?.run(command),
    }
}

pub struct Cli {
    books: Books,
}

impl Cli {
    pub fn init(config_path: &Path, data_dir: Option<PathBuf>) -> Result<()> {
        if config_path.exists()
            && !terminal::confirm(&format!(
                "Config file {} already exists. Overwrite it?",
                config_path.display()
            ))?
        {
            bail!("Config file {} already exists", config_path.display());
        }
        let data_dir = match data_dir {
            Some(data_dir) => data_dir,
            None => PathBuf::from(terminal::prompt_with_default(
                "Data directory",
                DEFAULT_DATA_DIR,
            )?),
        };
        std::fs::create_dir_all(&data_dir).with_context(|| {
            anyhow!("Failed to create data directory {}", data_dir.display())
        })?;
        let config = Config::new(data_dir);
        config.save(config_path)?;

        let cli = Self::new(&config);
        let seeded = cli.books.seed_chart_of_accounts()?;
        println!("{}", style_header("Initialized:"));
        let printer = BulletPointPrinter::new_stdout();
        printer.print_item(format!("Config {}", style_path(config_path)));
        printer.print_item(format!("Data directory {}", style_path(&config.data_dir)));
        if seeded {
            printer.print_item("Chart of accounts created");
        } else {
            printer.print_item("Chart of accounts already present");
        }
        Ok(())
    }

    pub fn load(config_path: &Path) -> Result<Self> {
        let config = Config::load(config_path)
            .context("Failed to load config. Run `haulbooks init` first.")?;
        ensure!(
            config.data_dir.is_dir(),
            "Data directory {} does not exist",
            config.data_dir.display()
        );
        Ok(Self::new(&config))
    }

    fn new(config: &Config) -> Self {
        let progress = ProgressBar::new_spinner();
        if let Ok(progress_style) = ProgressStyle::with_template("{spinner:.green} {pos} lines") {
            progress.set_style(progress_style);
        }
        Self {
            books: Books::new(config.data_dir.clone(), config.accounts).with_progress(progress),
        }
    }

    pub fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Init { .. } => bail!("Already initialized"),
            Command::AddFuelPurchase {
                trip,
                gallons,
                price,
                source_account,
                def_gallons,
                def_price,
                location,
                odometer,
                date,
            } => self.main_add_fuel_purchase(FuelPurchaseEntry {
                location,
                odometer,
                ..FuelPurchaseEntry::new(
                    date.unwrap_or_else(today),
                    trip,
                    gallons,
                    price,
                    source_account,
                )
                .with_def(def_gallons, def_price)
            }),
            Command::AddFuelCard {
                amount,
                source_account,
                description,
                date,
            } => self.main_add_fuel_card(FuelCardEntry {
                description,
                ..FuelCardEntry::new(date.unwrap_or_else(today), amount, source_account)
            }),
            Command::AddReserve {
                trip,
                amount,
                description,
                date,
            } => self.main_add_reserve(ReserveEntry {
                description,
                ..ReserveEntry::new(date.unwrap_or_else(today), trip, amount)
            }),
            Command::AddToll {
                trip,
                amount,
                agency,
                location,
                transponder,
                date,
            } => self.main_add_toll(TollEntry {
                agency,
                location,
                transponder,
                ..TollEntry::new(date.unwrap_or_else(today), trip, amount)
            }),
            Command::List { kind } => self.main_list(kind),
            Command::Trip { trip } => self.main_trip(&trip),
            Command::Post { kind } => self.main_post(kind),
            Command::Ledger => self.main_ledger(),
            Command::Balance => self.main_balance(),
            Command::Export => self.main_export(),
        }
    }

    fn main_add_fuel_purchase(&self, entry: FuelPurchaseEntry) -> Result<()> {
        let mut journal = self.books.fuel_purchases()?;
        print_added(journal.account(), &entry);
        journal.add_new(entry);
        journal.close()?;
        Ok(())
    }

    fn main_add_fuel_card(&self, entry: FuelCardEntry) -> Result<()> {
        let mut journal = self.books.fuel_card()?;
        print_added(journal.account(), &entry);
        journal.add_new(entry);
        journal.close()?;
        Ok(())
    }

    fn main_add_reserve(&self, entry: ReserveEntry) -> Result<()> {
        let mut journal = self.books.reserve()?;
        print_added(journal.account(), &entry);
        journal.add_new(entry);
        journal.close()?;
        Ok(())
    }

    fn main_add_toll(&self, entry: TollEntry) -> Result<()> {
        let mut journal = self.books.tolls()?;
        print_added(journal.account(), &entry);
        journal.add_new(entry);
        journal.close()?;
        Ok(())
    }

    fn main_list(&self, kind: JournalKind) -> Result<()> {
        println!("{}", style_header(&format!("{} entries:", capitalize(kind.name()))));
        let printer = BulletPointPrinter::new_stdout();
        let count = match kind {
            JournalKind::FuelPurchases => printer.print_items(self.books.fuel_purchases()?.iter()),
            JournalKind::FuelCard => printer.print_items(self.books.fuel_card()?.iter()),
            JournalKind::Tolls => printer.print_items(self.books.tolls()?.iter()),
            JournalKind::Reserve => printer.print_items(self.books.reserve()?.iter()),
            JournalKind::Receivables => printer.print_items(self.books.receivables()?.iter()),
            JournalKind::Accounts => printer.print_items(self.books.chart_of_accounts()?.iter()),
            JournalKind::Brokers => printer.print_items(self.books.brokers()?.iter()),
            JournalKind::Customers => printer.print_items(self.books.customers()?.iter()),
            JournalKind::Loads => printer.print_items(self.books.loads()?.iter()),
            JournalKind::Stops => printer.print_items(self.books.stops()?.iter()),
        };
        log::debug!("Listed {} {} entries", count, kind);
        Ok(())
    }

    fn main_trip(&self, trip: &str) -> Result<()> {
        println!("{}", style_header(&format!("Trip {}:", trip)));
        let printer = BulletPointPrinter::new_stdout();

        let fuel_purchases = self.books.fuel_purchases()?;
        printer.print_section(
            style_section("Fuel purchases"),
            fuel_purchases.entries_for_trip(trip),
        );
        let fuel_total = checked_sum(
            fuel_purchases
                .entries_for_trip(trip)
                .map(FuelPurchaseEntry::total),
        );

        let tolls = self.books.tolls()?;
        printer.print_section(style_section("Tolls"), tolls.entries_for_trip(trip));
        let toll_total = checked_sum(tolls.entries_for_trip(trip).map(|toll| Some(toll.amount)));

        let reserve = self.books.reserve()?;
        printer.print_section(style_section("Reserve"), reserve.entries_for_trip(trip));
        let reserve_total =
            checked_sum(reserve.entries_for_trip(trip).map(|entry| Some(entry.amount)));

        println!();
        println!("{}", style_header("Totals:"));
        printer.print_labeled("Fuel", 8, style_total(fuel_total));
        printer.print_labeled("Tolls", 8, style_total(toll_total));
        printer.print_labeled("Reserve", 8, style_total(reserve_total));
        Ok(())
    }

    fn main_post(&self, kind: JournalKind) -> Result<()> {
        let report = self
            .books
            .post(kind)
            .with_context(|| anyhow!("Failed to post {} journal", kind))?;
        println!("{}", style_header(&format!("Posted {} journal:", kind)));
        print_report(&BulletPointPrinter::new_stdout(), &report);
        if report.skipped > 0 {
            log::warn!(
                "{} {} entries had already been posted and were skipped",
                report.skipped,
                kind
            );
        }
        if report.failed > 0 {
            log::warn!(
                "{} {} entries have amounts that overflow and stay unposted",
                report.failed,
                kind
            );
        }
        Ok(())
    }

    fn main_ledger(&self) -> Result<()> {
        let ledger = self.books.ledger()?;
        println!("{}", style_header("General ledger:"));
        let printer = BulletPointPrinter::new_stdout();
        printer.print_items(ledger.entries().map(style_ledger_entry));
        Ok(())
    }

    fn main_balance(&self) -> Result<()> {
        let ledger = self.books.ledger()?;
        let chart = self.books.chart_of_accounts()?;
        println!("{}", style_header("Balances:"));
        let printer = BulletPointPrinter::new_stdout();
        let balances = ledger.trial_balance();
        printer.print_items(balances.iter().map(|(account, balance)| {
            let name = chart
                .iter()
                .find(|entry| entry.number == *account)
                .map(|entry| entry.name.as_str())
                .unwrap_or("");
            format!(
                "{} {} {}",
                style_account(*account),
                pad_str(name, 24, Alignment::Left, None),
                pad_str(
                    &style_amount(*balance).to_string(),
                    15,
                    Alignment::Right,
                    None
                ),
            )
        }));
        let total = balances
            .values()
            .fold(Decimal::ZERO, |total, balance| total.saturating_add(*balance));
        ensure!(
            total.is_zero(),
            "Ledger does not balance, accounts sum up to {}",
            total
        );
        Ok(())
    }

    fn main_export(&self) -> Result<()> {
        let ledger = self.books.ledger()?;
        let chart = self.books.chart_of_accounts()?;
        export::export_ledger(ledger.entries(), chart.iter(), &mut stdout())
    }
}

fn print_added(account: AccountNumber, entry: &impl Display) {
    println!(
        "{}",
        style_header(&format!("Adding to journal {}:", account))
    );
    BulletPointPrinter::new_stdout().print_item(entry);
}

fn print_report(printer: &BulletPointPrinter, report: &PostingReport) {
    printer.print_item(format!("{} entries posted", report.posted));
    printer.print_item(format!("{} ledger entries created", report.ledger_entries));
    if report.skipped > 0 {
        printer.print_item(style_warning(&format!(
            "{} entries already posted",
            report.skipped
        )));
    }
    if report.failed > 0 {
        printer.print_item(style_warning(&format!(
            "{} entries not posted, their amounts overflow",
            report.failed
        )));
    }
}

/// None as soon as one amount is missing or the sum overflows.
fn checked_sum(mut amounts: impl Iterator<Item = Option<Decimal>>) -> Option<Decimal> {
    amounts.try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount?))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn style_header(header: &str) -> StyledObject<&str> {
    style(header).bold().underlined()
}

fn style_section(section: &str) -> StyledObject<&str> {
    style(section).cyan().bold()
}

fn style_path(path: &Path) -> StyledObject<String> {
    style(path.display().to_string()).magenta()
}

fn style_warning(message: &str) -> StyledObject<&str> {
    style(message).yellow()
}

fn style_account(account: AccountNumber) -> StyledObject<String> {
    style(format!("{:>6}", account)).magenta()
}

fn style_date(date: &NaiveDate) -> StyledObject<String> {
    style(date.format("%Y-%m-%d").to_string())
}

fn style_amount(amount: Decimal) -> StyledObject<String> {
    let result = style(format!("{} {}", amount, export::CURRENCY)).bold();
    if amount < Decimal::ZERO {
        result.red()
    } else {
        result.green()
    }
}

fn style_total(total: Option<Decimal>) -> StyledObject<String> {
    match total {
        Some(amount) => style_amount(amount),
        None => style("overflow".to_string()).bold().red(),
    }
}

fn style_ledger_entry(entry: &GeneralLedgerEntry) -> String {
    format!(
        "{} {} {} -> {} {} {}{}",
        pad_str(&style_date(&entry.date).to_string(), 10, Alignment::Left, None),
        pad_str(&entry.code, 6, Alignment::Left, None),
        style_account(entry.from_account),
        style_account(entry.to_account),
        pad_str(
            &style_amount(entry.amount).to_string(),
            15,
            Alignment::Right,
            None
        ),
        style(&entry.description).italic(),
        if entry.balanced { "" } else { " !" },
    )
}
