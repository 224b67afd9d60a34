use indicatif::ProgressBar;
use std::path::Path;

use super::codec::{Postable, Record, TripLinked};
use super::error::DataStoreError;
use super::store::{Cursor, JournalStore};
use crate::records::AccountNumber;

pub const JOURNAL_EXTENSION: &str = "jrnl";
pub const TABLE_EXTENSION: &str = "tbl";

/// The journal of one chart-of-accounts number, stored as `<account>.jrnl`.
#[derive(Debug)]
pub struct AccountJournal<R> {
    account: AccountNumber,
    store: JournalStore<R>,
}

impl<R: Record> AccountJournal<R> {
    pub fn open(data_dir: &Path, account: AccountNumber) -> Result<Self, DataStoreError> {
        Self::open_with_progress(data_dir, account, &ProgressBar::hidden())
    }

    pub fn open_with_progress(
        data_dir: &Path,
        account: AccountNumber,
        progress: &ProgressBar,
    ) -> Result<Self, DataStoreError> {
        let path = data_dir.join(format!("{}.{}", account, JOURNAL_EXTENSION));
        Ok(Self {
            account,
            store: JournalStore::open_with_progress(path, progress)?,
        })
    }

    pub fn flush(&self) -> Result<(), DataStoreError> {
        self.store.flush()
    }

    pub fn close(self) -> Result<(), DataStoreError> {
        self.store.close()
    }
}

impl<R> AccountJournal<R> {
    pub fn account(&self) -> AccountNumber {
        self.account
    }

    pub fn store(&self) -> &JournalStore<R> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut JournalStore<R> {
        &mut self.store
    }

    pub fn add_new(&mut self, record: R) -> Cursor {
        self.store.append(record)
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.store.iter()
    }
}

impl<R: Postable> AccountJournal<R> {
    pub fn unposted(&self) -> impl Iterator<Item = &R> {
        self.store.iter().filter(|record| !record.is_posted())
    }

    pub fn unposted_count(&self) -> usize {
        self.unposted().count()
    }
}

impl<R: TripLinked> AccountJournal<R> {
    pub fn entries_for_trip<'a>(&'a self, trip: &'a str) -> impl Iterator<Item = &'a R> + 'a {
        entries_for_trip(&self.store, trip)
    }

    /// Position of the next record after `from` that belongs to `trip`, wrapping around.
    ///
    /// The caller's cursor is left untouched.
    pub fn find_next_for_trip(&self, from: &Cursor, trip: &str) -> Option<Cursor> {
        find_next_for_trip(&self.store, from, trip)
    }
}

/// A non-journal table such as brokers or customers, stored as `<name>.tbl`.
#[derive(Debug)]
pub struct Table<R> {
    name: &'static str,
    store: JournalStore<R>,
}

impl<R: Record> Table<R> {
    pub fn open(data_dir: &Path, name: &'static str) -> Result<Self, DataStoreError> {
        Self::open_with_progress(data_dir, name, &ProgressBar::hidden())
    }

    pub fn open_with_progress(
        data_dir: &Path,
        name: &'static str,
        progress: &ProgressBar,
    ) -> Result<Self, DataStoreError> {
        let path = data_dir.join(format!("{}.{}", name, TABLE_EXTENSION));
        Ok(Self {
            name,
            store: JournalStore::open_with_progress(path, progress)?,
        })
    }

    pub fn flush(&self) -> Result<(), DataStoreError> {
        self.store.flush()
    }

    pub fn close(self) -> Result<(), DataStoreError> {
        self.store.close()
    }
}

impl<R> Table<R> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn store(&self) -> &JournalStore<R> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut JournalStore<R> {
        &mut self.store
    }

    pub fn add_new(&mut self, record: R) -> Cursor {
        self.store.append(record)
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.store.iter()
    }
}

impl<R: TripLinked> Table<R> {
    pub fn entries_for_trip<'a>(&'a self, trip: &'a str) -> impl Iterator<Item = &'a R> + 'a {
        entries_for_trip(&self.store, trip)
    }

    pub fn find_next_for_trip(&self, from: &Cursor, trip: &str) -> Option<Cursor> {
        find_next_for_trip(&self.store, from, trip)
    }
}

fn entries_for_trip<'a, R: TripLinked>(
    store: &'a JournalStore<R>,
    trip: &'a str,
) -> impl Iterator<Item = &'a R> + 'a {
    store.iter().filter(move |record| record.trip() == trip)
}

fn find_next_for_trip<R: TripLinked>(
    store: &JournalStore<R>,
    from: &Cursor,
    trip: &str,
) -> Option<Cursor> {
    let len = store.count();
    (1..=len)
        .map(|offset| (from.index() + offset) % len)
        .find(|&index| store.get(index).is_some_and(|record| record.trip() == trip))
        .map(Cursor::at)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::records::{BrokerEntry, RecordId, ReserveEntry, StopEntry};

    fn reserve(trip: &str, posted: bool) -> ReserveEntry {
        ReserveEntry {
            posted,
            ..ReserveEntry::new(
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                trip.to_string(),
                Decimal::new(10000, 2),
            )
        }
    }

    fn journal(
        entries: impl IntoIterator<Item = ReserveEntry>,
    ) -> (tempfile::TempDir, AccountJournal<ReserveEntry>) {
        let tempdir = tempfile::tempdir().unwrap();
        let mut journal = AccountJournal::open(tempdir.path(), AccountNumber(10300)).unwrap();
        for entry in entries {
            journal.add_new(entry);
        }
        (tempdir, journal)
    }

    #[test]
    fn journal_file_is_named_after_account() {
        let (tempdir, journal) = journal([]);
        assert_eq!(tempdir.path().join("10300.jrnl"), journal.store().path());
        assert!(journal.store().is_freshly_created());
    }

    #[test]
    fn table_file_is_named_after_table() {
        let tempdir = tempfile::tempdir().unwrap();
        let mut table = Table::<BrokerEntry>::open(tempdir.path(), "brokers").unwrap();
        table.add_new(BrokerEntry::new("Prairie Freight".to_string()));
        table.close().unwrap();

        let table = Table::<BrokerEntry>::open(tempdir.path(), "brokers").unwrap();
        assert_eq!(tempdir.path().join("brokers.tbl"), table.store().path());
        assert_eq!(1, table.count());
    }

    #[test]
    fn counts_unposted() {
        let (_tempdir, journal) = journal([
            reserve("T-1", true),
            reserve("T-2", false),
            reserve("T-3", false),
        ]);
        assert_eq!(2, journal.unposted_count());
        assert_eq!(
            vec!["T-2", "T-3"],
            journal
                .unposted()
                .map(|entry| entry.trip.as_str())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn entries_for_trip() {
        let (_tempdir, journal) = journal([
            reserve("T-1", false),
            reserve("T-2", false),
            reserve("T-1", true),
        ]);
        assert_eq!(2, journal.entries_for_trip("T-1").count());
        assert_eq!(0, journal.entries_for_trip("T-9").count());
    }

    #[test]
    fn find_next_for_trip_leaves_cursor_alone() {
        let (_tempdir, journal) = journal([
            reserve("T-1", false),
            reserve("T-2", false),
            reserve("T-1", false),
            reserve("T-3", false),
        ]);
        let cursor = Cursor::at(1);
        assert_eq!(Some(Cursor::at(2)), journal.find_next_for_trip(&cursor, "T-1"));
        assert_eq!(1, cursor.index());
        assert_eq!(
            Some(Cursor::at(0)),
            journal.find_next_for_trip(&Cursor::at(2), "T-1")
        );
        assert_eq!(None, journal.find_next_for_trip(&cursor, "T-9"));
    }

    #[test]
    fn find_next_for_trip_on_empty_journal() {
        let (_tempdir, journal) = journal([]);
        assert_eq!(None, journal.find_next_for_trip(&Cursor::default(), "T-1"));
    }

    #[test]
    fn table_trip_search() {
        let tempdir = tempfile::tempdir().unwrap();
        let mut table = Table::<StopEntry>::open(tempdir.path(), "stops").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        table.add_new(StopEntry::new("ORD-1".to_string(), 1, RecordId(1), date, date));
        table.add_new(StopEntry::new("ORD-2".to_string(), 1, RecordId(1), date, date));
        table.add_new(StopEntry::new("ORD-1".to_string(), 2, RecordId(2), date, date));
        assert_eq!(
            vec![1, 2],
            table
                .entries_for_trip("ORD-1")
                .map(|stop| stop.stop_number)
                .collect::<Vec<_>>()
        );
        assert_eq!(
            Some(Cursor::at(2)),
            table.find_next_for_trip(&Cursor::at(0), "ORD-1")
        );
    }

    #[test]
    fn posted_flag_survives_reopen() {
        let (tempdir, mut journal) = journal([reserve("T-1", false)]);
        journal.store_mut().get_mut(0).unwrap().mark_posted();
        journal.close().unwrap();

        let journal =
            AccountJournal::<ReserveEntry>::open(tempdir.path(), AccountNumber(10300)).unwrap();
        assert_eq!(0, journal.unposted_count());
    }
}
