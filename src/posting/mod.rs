//! Turns unposted journal entries into general ledger transactions.
//!
//! Each journal record moves from unposted to posted exactly once. Posting a journal walks its
//! records in order, asks the journal's [`PostingRule`] which ledger transactions a record
//! implies, posts them, and marks the record posted. Both stores are flushed at the end of the
//! run. A record whose amounts can't be computed stays unposted and is counted as failed.

use serde::{Deserialize, Serialize};

mod rules;

pub use rules::{FuelCardRule, FuelPurchaseRule, ReserveRule};

use crate::db::{AccountJournal, DataStoreError, GeneralLedger, Postable};
use crate::records::{AccountNumber, GeneralLedgerEntry};

#[derive(thiserror::Error, Debug)]
pub enum PostingError {
    #[error(transparent)]
    Store(#[from] DataStoreError),

    #[error("Posting is not supported for {0} records")]
    Unsupported(&'static str),

    /// The ledger was saved but the journal wasn't, so its records still read as unposted.
    #[error("Posted {posted} entries of journal {account} to the ledger, but failed to mark them posted")]
    JournalNotMarked {
        account: AccountNumber,
        posted: usize,
        #[source]
        source: DataStoreError,
    },
}

/// A ledger amount that doesn't fit into a decimal.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0} amount overflows")]
pub struct AmountOverflow(pub &'static str);

/// Which ledger transactions a journal record stands for.
pub trait PostingRule<R> {
    fn ledger_entries(&self, record: &R) -> Result<Vec<GeneralLedgerEntry>, AmountOverflow>;
}

/// Chart-of-accounts numbers of the journals and of the fixed posting targets.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct JournalAccounts {
    pub fuel_purchase: AccountNumber,
    pub fuel_card: AccountNumber,
    pub receivables: AccountNumber,
    pub reserve: AccountNumber,
    pub tolls: AccountNumber,
}

impl Default for JournalAccounts {
    fn default() -> Self {
        Self {
            fuel_purchase: AccountNumber(10040),
            fuel_card: AccountNumber(50040),
            receivables: AccountNumber(10100),
            reserve: AccountNumber(10300),
            tolls: AccountNumber(50060),
        }
    }
}

impl JournalAccounts {
    pub fn all(&self) -> [AccountNumber; 5] {
        [
            self.fuel_purchase,
            self.fuel_card,
            self.receivables,
            self.reserve,
            self.tolls,
        ]
    }

    pub fn fuel_purchase_rule(&self) -> FuelPurchaseRule {
        FuelPurchaseRule {
            fuel_purchase: self.fuel_purchase,
            fuel_card: self.fuel_card,
        }
    }

    pub fn fuel_card_rule(&self) -> FuelCardRule {
        FuelCardRule {
            fuel_card: self.fuel_card,
        }
    }

    pub fn reserve_rule(&self) -> ReserveRule {
        ReserveRule {
            receivables: self.receivables,
            reserve: self.reserve,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostingReport {
    /// Records that were posted by this run.
    pub posted: usize,
    /// Records that had already been posted before and were left alone.
    pub skipped: usize,
    /// Records whose amounts overflow. They stay unposted.
    pub failed: usize,
    pub ledger_entries: usize,
}

impl PostingReport {
    /// False if any record was skipped or failed, i.e. not everything advanced in this run.
    pub fn is_complete(&self) -> bool {
        self.skipped == 0 && self.failed == 0
    }
}

pub struct PostingEngine<'a> {
    ledger: &'a mut GeneralLedger,
}

impl<'a> PostingEngine<'a> {
    pub fn new(ledger: &'a mut GeneralLedger) -> Self {
        Self { ledger }
    }

    /// Posts every unposted record of the journal and flushes the ledger, then the journal.
    ///
    /// The two flushes are not atomic together. If the ledger flush succeeds and the journal
    /// flush fails, the ledger file already holds the new entries while the journal file still
    /// has the records unposted, and a later run posts them again. The error then says how many
    /// records were affected.
    pub fn post<R, P>(
        &mut self,
        journal: &mut AccountJournal<R>,
        rule: &P,
    ) -> Result<PostingReport, PostingError>
    where
        R: Postable,
        P: PostingRule<R>,
    {
        let account = journal.account();
        log::info!("Posting journal {}...", account);
        let mut report = PostingReport::default();
        for (index, record) in journal.store_mut().iter_mut().enumerate() {
            if record.is_posted() {
                report.skipped += 1;
                continue;
            }
            let entries = match rule.ledger_entries(record) {
                Ok(entries) => entries,
                Err(err) => {
                    log::warn!(
                        "Journal {} entry {}: {}, leaving it unposted",
                        account,
                        index + 1,
                        err
                    );
                    report.failed += 1;
                    continue;
                }
            };
            for entry in entries {
                self.ledger.post(entry);
                report.ledger_entries += 1;
            }
            record.mark_posted();
            report.posted += 1;
        }

        self.ledger.flush()?;
        journal.flush().map_err(|source| PostingError::JournalNotMarked {
            account,
            posted: report.posted,
            source,
        })?;
        log::info!(
            "Posting journal {}...done ({} posted, {} already posted, {} failed, {} ledger entries)",
            account,
            report.posted,
            report.skipped,
            report.failed,
            report.ledger_entries
        );
        Ok(report)
    }
}
