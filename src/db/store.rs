use csv::StringRecord;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

use super::codec::{decode_record, encode_record, Record};
use super::error::DataStoreError;
use super::file;

/// Position of one caller inside a [`JournalStore`].
///
/// The store itself has no notion of a current record, so several views can browse the same
/// store independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    pub fn at(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped_lines: usize,
    pub defaulted_fields: usize,
}

/// Ordered records of one type, backed by one file.
///
/// The in-memory records are authoritative between [`JournalStore::open`] and
/// [`JournalStore::flush`]; the file only reflects the last flush.
#[derive(Debug)]
pub struct JournalStore<R> {
    path: PathBuf,
    records: Vec<R>,
    freshly_created: bool,
    load_report: LoadReport,
}

impl<R: Record> JournalStore<R> {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DataStoreError> {
        Self::open_with_progress(path, &ProgressBar::hidden())
    }

    /// Loads the store file, creating it if it doesn't exist yet.
    ///
    /// Lines that can't be decoded are logged and skipped.
    pub fn open_with_progress(
        path: impl Into<PathBuf>,
        progress: &ProgressBar,
    ) -> Result<Self, DataStoreError> {
        let path = path.into();
        let Some(lines) = file::open_records(&path)? else {
            log::info!("Creating {}", path.display());
            file::create_empty(&path)?;
            return Ok(Self {
                path,
                records: vec![],
                freshly_created: true,
                load_report: LoadReport::default(),
            });
        };

        log::info!("Loading {}...", path.display());
        let mut records = vec![];
        let mut report = LoadReport::default();
        for line in lines {
            let line = line.map_err(|err| DataStoreError::io(&path, err.into()))?;
            let line_number = line.position().map_or(0, |position| position.line());
            progress.set_position(line_number);
            let fields = match StringRecord::from_byte_record(line) {
                Ok(fields) => fields,
                Err(err) => {
                    log::warn!(
                        "{}:{}: {}, skipping line",
                        path.display(),
                        line_number,
                        err
                    );
                    report.skipped_lines += 1;
                    continue;
                }
            };
            match decode_record::<R>(&fields) {
                Ok(decoded) => {
                    for issue in &decoded.issues {
                        log::warn!(
                            "{}:{}: {}, using default value",
                            path.display(),
                            line_number,
                            issue
                        );
                    }
                    report.defaulted_fields += decoded.issues.len();
                    report.loaded += 1;
                    records.push(decoded.record);
                }
                Err(err) => {
                    log::warn!(
                        "{}:{}: {}, skipping line",
                        path.display(),
                        line_number,
                        err
                    );
                    report.skipped_lines += 1;
                }
            }
        }
        log::info!(
            "Loading {}...done ({} records)",
            path.display(),
            records.len()
        );

        Ok(Self {
            path,
            records,
            freshly_created: false,
            load_report: report,
        })
    }

    /// Rewrites the whole file from the in-memory records, in order.
    pub fn flush(&self) -> Result<(), DataStoreError> {
        log::info!("Saving {}...", self.path.display());
        file::save_records(&self.path, self.records.iter().map(encode_record))?;
        log::info!("Saving {}...done", self.path.display());
        Ok(())
    }

    /// Flushes and releases the store.
    pub fn close(self) -> Result<(), DataStoreError> {
        self.flush()
    }
}

impl<R> JournalStore<R> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether [`JournalStore::open`] found no file and created an empty one.
    pub fn is_freshly_created(&self) -> bool {
        self.freshly_created
    }

    pub fn load_report(&self) -> LoadReport {
        self.load_report
    }

    /// Appends a record and returns a cursor pointing at it.
    pub fn append(&mut self, record: R) -> Cursor {
        self.records.push(record);
        Cursor::at(self.records.len() - 1)
    }

    /// Replaces the record the cursor points at.
    pub fn update(&mut self, cursor: &Cursor, record: R) -> Result<(), DataStoreError> {
        let len = self.records.len();
        let slot = self
            .records
            .get_mut(cursor.index)
            .ok_or(DataStoreError::OutOfBounds {
                index: cursor.index,
                len,
            })?;
        *slot = record;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut R> {
        self.records.get_mut(index)
    }

    /// The record at the cursor, or None if the cursor doesn't point at a record.
    pub fn current(&self, cursor: &Cursor) -> Option<&R> {
        self.records.get(cursor.index)
    }

    /// Like [`JournalStore::current`], but a cursor outside the store is an error.
    pub fn record_at(&self, cursor: &Cursor) -> Result<&R, DataStoreError> {
        self.records
            .get(cursor.index)
            .ok_or(DataStoreError::OutOfBounds {
                index: cursor.index,
                len: self.records.len(),
            })
    }

    pub fn first(&self, cursor: &mut Cursor) -> Option<&R> {
        cursor.index = 0;
        self.records.first()
    }

    pub fn previous(&self, cursor: &mut Cursor) -> Option<&R> {
        cursor.index = cursor.index.saturating_sub(1).min(self.last_index());
        self.current(cursor)
    }

    pub fn next(&self, cursor: &mut Cursor) -> Option<&R> {
        cursor.index = (cursor.index + 1).min(self.last_index());
        self.current(cursor)
    }

    pub fn last(&self, cursor: &mut Cursor) -> Option<&R> {
        cursor.index = self.last_index();
        self.current(cursor)
    }

    fn last_index(&self) -> usize {
        self.records.len().saturating_sub(1)
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut R> {
        self.records.iter_mut()
    }
}
