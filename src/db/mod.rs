mod codec;
mod error;
mod file;
mod journal;
mod ledger;
mod store;

pub use codec::{
    decode_line, decode_record, encode_line, encode_record, today, Decoded, FieldReader,
    FieldWriter, Postable, Record, TripLinked, BLANK, DATE_FORMAT, DELIMITER,
};
pub use error::{DataStoreError, DecodeError};
pub use journal::{AccountJournal, Table, JOURNAL_EXTENSION, TABLE_EXTENSION};
pub use ledger::{GeneralLedger, LEDGER_FILE};
pub use store::{Cursor, JournalStore, LoadReport};
