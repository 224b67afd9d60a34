use indicatif::ProgressBar;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;

use super::error::DataStoreError;
use super::store::{Cursor, JournalStore};
use crate::records::{AccountNumber, GeneralLedgerEntry};

pub const LEDGER_FILE: &str = "0.ldgr";

/// The general ledger every postable journal posts into.
#[derive(Debug)]
pub struct GeneralLedger {
    store: JournalStore<GeneralLedgerEntry>,
}

impl GeneralLedger {
    pub fn open(data_dir: &Path) -> Result<Self, DataStoreError> {
        Self::open_with_progress(data_dir, &ProgressBar::hidden())
    }

    pub fn open_with_progress(
        data_dir: &Path,
        progress: &ProgressBar,
    ) -> Result<Self, DataStoreError> {
        Ok(Self {
            store: JournalStore::open_with_progress(data_dir.join(LEDGER_FILE), progress)?,
        })
    }

    /// Records one transaction. It is only persisted by the next [`GeneralLedger::flush`].
    pub fn post(&mut self, entry: GeneralLedgerEntry) -> Cursor {
        log::debug!("Posting {}", entry);
        self.store.append(entry)
    }

    pub fn flush(&self) -> Result<(), DataStoreError> {
        self.store.flush()
    }

    pub fn close(self) -> Result<(), DataStoreError> {
        self.store.close()
    }

    pub fn store(&self) -> &JournalStore<GeneralLedgerEntry> {
        &self.store
    }

    pub fn entries(&self) -> impl Iterator<Item = &GeneralLedgerEntry> {
        self.store.iter()
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    /// Marks the transaction as reconciled with the bank statement.
    pub fn mark_balanced(&mut self, cursor: &Cursor) -> Result<(), DataStoreError> {
        let len = self.store.count();
        let entry = self
            .store
            .get_mut(cursor.index())
            .ok_or(DataStoreError::OutOfBounds {
                index: cursor.index(),
                len,
            })?;
        entry.balanced = true;
        Ok(())
    }

    /// Saturates at the bounds of [`Decimal`] instead of overflowing.
    pub fn balance_of(&self, account: AccountNumber) -> Decimal {
        self.entries().fold(Decimal::ZERO, |balance, entry| {
            balance.saturating_add(entry.change_for(account))
        })
    }

    /// Balance of every account that appears in the ledger.
    pub fn trial_balance(&self) -> BTreeMap<AccountNumber, Decimal> {
        let mut balances = BTreeMap::new();
        for entry in self.entries() {
            let from = balances.entry(entry.from_account).or_insert(Decimal::ZERO);
            *from = from.saturating_sub(entry.amount);
            let to = balances.entry(entry.to_account).or_insert(Decimal::ZERO);
            *to = to.saturating_add(entry.amount);
        }
        balances
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn transfer(from: u32, to: u32, cents: i64) -> GeneralLedgerEntry {
        GeneralLedgerEntry::new(
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            "TEST",
            "test transfer",
            AccountNumber(from),
            AccountNumber(to),
            Decimal::new(cents, 2),
            false,
        )
    }

    #[test]
    fn ledger_file_name() {
        let tempdir = tempfile::tempdir().unwrap();
        let ledger = GeneralLedger::open(tempdir.path()).unwrap();
        assert_eq!(tempdir.path().join("0.ldgr"), ledger.store().path());
    }

    #[test]
    fn posted_entries_survive_reopen() {
        let tempdir = tempfile::tempdir().unwrap();
        let mut ledger = GeneralLedger::open(tempdir.path()).unwrap();
        ledger.post(transfer(50040, 10040, 17500));
        ledger.post(transfer(10100, 10300, 5000));
        ledger.close().unwrap();

        let ledger = GeneralLedger::open(tempdir.path()).unwrap();
        assert_eq!(
            vec![transfer(50040, 10040, 17500), transfer(10100, 10300, 5000)],
            ledger.entries().cloned().collect::<Vec<_>>()
        );
    }

    #[test]
    fn balances() {
        let tempdir = tempfile::tempdir().unwrap();
        let mut ledger = GeneralLedger::open(tempdir.path()).unwrap();
        ledger.post(transfer(10000, 50040, 50000));
        ledger.post(transfer(50040, 10040, 17500));
        ledger.post(transfer(10100, 10300, 5000));

        assert_eq!(Decimal::new(32500, 2), ledger.balance_of(AccountNumber(50040)));
        assert_eq!(Decimal::new(-50000, 2), ledger.balance_of(AccountNumber(10000)));

        let trial_balance = ledger.trial_balance();
        assert_eq!(5, trial_balance.len());
        assert_eq!(Decimal::ZERO, trial_balance.values().sum::<Decimal>());
    }

    #[test]
    fn balances_saturate() {
        let tempdir = tempfile::tempdir().unwrap();
        let mut ledger = GeneralLedger::open(tempdir.path()).unwrap();
        for _ in 0..2 {
            ledger.post(GeneralLedgerEntry::new(
                NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
                "TEST",
                "huge transfer",
                AccountNumber(1),
                AccountNumber(2),
                Decimal::MAX,
                false,
            ));
        }

        assert_eq!(Decimal::MAX, ledger.balance_of(AccountNumber(2)));
        let trial_balance = ledger.trial_balance();
        assert_eq!(Some(&Decimal::MIN), trial_balance.get(&AccountNumber(1)));
        assert_eq!(Some(&Decimal::MAX), trial_balance.get(&AccountNumber(2)));
    }

    #[test]
    fn mark_balanced() {
        let tempdir = tempfile::tempdir().unwrap();
        let mut ledger = GeneralLedger::open(tempdir.path()).unwrap();
        let cursor = ledger.post(transfer(10000, 50040, 50000));
        ledger.mark_balanced(&cursor).unwrap();
        assert!(ledger.entries().all(|entry| entry.balanced));
        assert!(ledger.mark_balanced(&Cursor::at(1)).is_err());
    }
}
