use indicatif::ProgressBar;
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use crate::db::{AccountJournal, DataStoreError, GeneralLedger, Record, Table};
use crate::posting::{JournalAccounts, PostingEngine, PostingError, PostingReport};
use crate::records::{
    AccountKind, AccountNumber, BrokerEntry, ChartOfAccountsEntry, CustomerEntry, FuelCardEntry,
    FuelPurchaseEntry, LoadEntry, ReceivableEntry, ReserveEntry, StopEntry, TollEntry,
};

pub const ACCOUNTS_TABLE: &str = "accounts";
pub const BROKERS_TABLE: &str = "brokers";
pub const CUSTOMERS_TABLE: &str = "customers";
pub const LOADS_TABLE: &str = "loads";
pub const STOPS_TABLE: &str = "stops";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum JournalKind {
    FuelPurchases,
    FuelCard,
    Tolls,
    Reserve,
    Receivables,
    Accounts,
    Brokers,
    Customers,
    Loads,
    Stops,
}

impl JournalKind {
    pub fn name(&self) -> &'static str {
        match self {
            JournalKind::FuelPurchases => "fuel purchase",
            JournalKind::FuelCard => "fuel card",
            JournalKind::Tolls => "toll",
            JournalKind::Reserve => "reserve",
            JournalKind::Receivables => "receivable",
            JournalKind::Accounts => "chart of accounts",
            JournalKind::Brokers => "broker",
            JournalKind::Customers => "customer",
            JournalKind::Loads => "load",
            JournalKind::Stops => "stop",
        }
    }

    pub fn is_postable(&self) -> bool {
        matches!(
            self,
            JournalKind::FuelPurchases | JournalKind::FuelCard | JournalKind::Reserve
        )
    }
}

impl Display for JournalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opens the journals and tables of one data directory.
///
/// Every open returns a fresh instance loaded from disk. Callers must keep a single instance
/// per file while editing, otherwise the last flush wins.
pub struct Books {
    data_dir: PathBuf,
    accounts: JournalAccounts,
    progress: ProgressBar,
}

impl Books {
    pub fn new(data_dir: impl Into<PathBuf>, accounts: JournalAccounts) -> Self {
        Self {
            data_dir: data_dir.into(),
            accounts,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn accounts(&self) -> &JournalAccounts {
        &self.accounts
    }

    fn journal<R: Record>(
        &self,
        account: AccountNumber,
    ) -> Result<AccountJournal<R>, DataStoreError> {
        self.progress.reset();
        AccountJournal::open_with_progress(&self.data_dir, account, &self.progress)
    }

    fn table<R: Record>(
        &self,
        name: &'static str,
    ) -> Result<Table<R>, DataStoreError> {
        self.progress.reset();
        Table::open_with_progress(&self.data_dir, name, &self.progress)
    }

    pub fn fuel_purchases(&self) -> Result<AccountJournal<FuelPurchaseEntry>, DataStoreError> {
        self.journal(self.accounts.fuel_purchase)
    }

    pub fn fuel_card(&self) -> Result<AccountJournal<FuelCardEntry>, DataStoreError> {
        self.journal(self.accounts.fuel_card)
    }

    pub fn tolls(&self) -> Result<AccountJournal<TollEntry>, DataStoreError> {
        self.journal(self.accounts.tolls)
    }

    pub fn reserve(&self) -> Result<AccountJournal<ReserveEntry>, DataStoreError> {
        self.journal(self.accounts.reserve)
    }

    pub fn receivables(&self) -> Result<AccountJournal<ReceivableEntry>, DataStoreError> {
        self.journal(self.accounts.receivables)
    }

    pub fn chart_of_accounts(&self) -> Result<Table<ChartOfAccountsEntry>, DataStoreError> {
        self.table(ACCOUNTS_TABLE)
    }

    pub fn brokers(&self) -> Result<Table<BrokerEntry>, DataStoreError> {
        self.table(BROKERS_TABLE)
    }

    pub fn customers(&self) -> Result<Table<CustomerEntry>, DataStoreError> {
        self.table(CUSTOMERS_TABLE)
    }

    pub fn loads(&self) -> Result<Table<LoadEntry>, DataStoreError> {
        self.table(LOADS_TABLE)
    }

    pub fn stops(&self) -> Result<Table<StopEntry>, DataStoreError> {
        self.table(STOPS_TABLE)
    }

    pub fn ledger(&self) -> Result<GeneralLedger, DataStoreError> {
        self.progress.reset();
        GeneralLedger::open_with_progress(&self.data_dir, &self.progress)
    }

    /// Adds the accounts the posting rules use to an empty chart of accounts.
    ///
    /// Returns false if the chart already had entries.
    pub fn seed_chart_of_accounts(&self) -> Result<bool, DataStoreError> {
        let mut table = self.chart_of_accounts()?;
        if table.count() > 0 {
            return Ok(false);
        }
        let seed = [
            (self.accounts.receivables, "Receivables", AccountKind::Asset, false),
            (self.accounts.reserve, "Maintenance Reserve", AccountKind::Asset, false),
            (self.accounts.fuel_purchase, "Fuel Purchase", AccountKind::Expense, true),
            (self.accounts.fuel_card, "Fuel Card", AccountKind::Asset, false),
            (self.accounts.tolls, "Tolls", AccountKind::Expense, true),
        ];
        for (number, name, kind, tax_deductible) in seed {
            table.add_new(ChartOfAccountsEntry {
                tax_deductible,
                ..ChartOfAccountsEntry::new(number, name.to_string(), kind)
            });
        }
        table.close()?;
        Ok(true)
    }

    /// Posts every unposted entry of a postable journal into the general ledger.
    pub fn post(&self, kind: JournalKind) -> Result<PostingReport, PostingError> {
        if !kind.is_postable() {
            return Err(PostingError::Unsupported(kind.name()));
        }
        let mut ledger = self.ledger()?;
        let mut engine = PostingEngine::new(&mut ledger);
        match kind {
            JournalKind::FuelPurchases => {
                engine.post(&mut self.fuel_purchases()?, &self.accounts.fuel_purchase_rule())
            }
            JournalKind::FuelCard => {
                engine.post(&mut self.fuel_card()?, &self.accounts.fuel_card_rule())
            }
            JournalKind::Reserve => {
                engine.post(&mut self.reserve()?, &self.accounts.reserve_rule())
            }
            _ => Err(PostingError::Unsupported(kind.name())),
        }
    }
}
