//! Line format shared by every store file.
//!
//! A record is one line; its fields are joined by [`DELIMITER`]. Each record type fixes the
//! order of its fields in [`Record::encode`] and must read them back in the same order in
//! [`Record::decode`]. A missing optional text or date is written as [`BLANK`]. Optional text
//! made only of spaces gets one extra space, so it never collides with [`BLANK`] and every value
//! reads back as it was written.

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use std::fmt::Display;
use std::io::{Read, Write};
use std::str::FromStr;

use super::error::DecodeError;

pub const DELIMITER: char = '~';
pub const BLANK: &str = " ";
pub const DATE_FORMAT: &str = "%m/%d/%Y";

pub trait Record: Sized {
    /// Number of fields [`Record::encode`] writes.
    const FIELD_COUNT: usize;

    fn encode(&self, fields: &mut FieldWriter);

    /// Fields that fail to parse fall back to a default; the reader keeps track of them.
    fn decode(fields: &mut FieldReader<'_>) -> Self;
}

/// Records that can be reflected in the general ledger.
pub trait Postable: Record {
    fn is_posted(&self) -> bool;
    fn mark_posted(&mut self);
}

/// Records that belong to a trip (or order) number.
pub trait TripLinked {
    fn trip(&self) -> &str;
}

/// Store files have no header and no quoting; lines of any length are passed on so that a bad
/// line can be reported instead of failing the whole file.
pub(crate) fn reader<T: Read>(source: T) -> csv::Reader<T> {
    csv::ReaderBuilder::new()
        .delimiter(DELIMITER as u8)
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(source)
}

pub(crate) fn writer<T: Write>(sink: T) -> csv::Writer<T> {
    csv::WriterBuilder::new()
        .delimiter(DELIMITER as u8)
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(sink)
}

pub fn encode_record<R: Record>(record: &R) -> StringRecord {
    let mut writer = FieldWriter::with_capacity(R::FIELD_COUNT);
    record.encode(&mut writer);
    debug_assert_eq!(R::FIELD_COUNT, writer.fields.len());
    StringRecord::from(writer.fields)
}

#[derive(Debug)]
pub struct Decoded<R> {
    pub record: R,
    /// Fields that were replaced by a default value.
    pub issues: Vec<DecodeError>,
}

pub fn decode_record<R: Record>(fields: &StringRecord) -> Result<Decoded<R>, DecodeError> {
    if fields.len() != R::FIELD_COUNT {
        return Err(DecodeError::FieldCount {
            expected: R::FIELD_COUNT,
            found: fields.len(),
        });
    }
    let mut reader = FieldReader::new(fields);
    let record = R::decode(&mut reader);
    Ok(Decoded {
        record,
        issues: reader.issues,
    })
}

/// Encodes a record as one line, without the line terminator.
pub fn encode_line<R: Record>(record: &R) -> String {
    let mut writer = writer(vec![]);
    let line = writer
        .write_record(&encode_record(record))
        .ok()
        .and_then(|()| writer.into_inner().ok())
        .unwrap_or_default();
    let line = String::from_utf8_lossy(&line);
    line.trim_end_matches('\n').to_string()
}

pub fn decode_line<R: Record>(line: &str) -> Result<Decoded<R>, DecodeError> {
    let fields = reader(line.as_bytes())
        .into_records()
        .next()
        .and_then(Result::ok)
        .unwrap_or_default();
    decode_record(&fields)
}

pub struct FieldWriter {
    fields: Vec<String>,
}

impl FieldWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub fn text(&mut self, value: &str) -> &mut Self {
        self.fields.push(sanitize(value));
        self
    }

    pub fn opt_text(&mut self, value: Option<&str>) -> &mut Self {
        let field = match value {
            None => BLANK.to_string(),
            Some(value) => {
                let mut value = sanitize(value);
                if is_spaces(&value) {
                    value.push(' ');
                }
                value
            }
        };
        self.fields.push(field);
        self
    }

    pub fn number(&mut self, value: impl Display) -> &mut Self {
        self.fields.push(value.to_string());
        self
    }

    pub fn decimal(&mut self, value: Decimal) -> &mut Self {
        self.fields.push(value.normalize().to_string());
        self
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.fields.push(value.to_string());
        self
    }

    pub fn date(&mut self, value: NaiveDate) -> &mut Self {
        self.fields.push(value.format(DATE_FORMAT).to_string());
        self
    }

    pub fn opt_date(&mut self, value: Option<NaiveDate>) -> &mut Self {
        match value {
            Some(value) => self.date(value),
            None => {
                self.fields.push(BLANK.to_string());
                self
            }
        }
    }
}

fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            DELIMITER | '\n' | '\r' => ' ',
            c => c,
        })
        .collect()
}

fn is_spaces(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c == ' ')
}

pub struct FieldReader<'a> {
    fields: &'a StringRecord,
    position: usize,
    issues: Vec<DecodeError>,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a StringRecord) -> Self {
        Self {
            fields,
            position: 0,
            issues: vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn next_raw(&mut self) -> &'a str {
        let value = self.fields.get(self.position).unwrap_or("");
        self.position += 1;
        value
    }

    pub fn text(&mut self, _field: &'static str) -> String {
        self.next_raw().to_string()
    }

    pub fn opt_text(&mut self, _field: &'static str) -> Option<String> {
        let value = self.next_raw();
        if value == BLANK {
            None
        } else if is_spaces(value) {
            Some(value[1..].to_string())
        } else {
            Some(value.to_string())
        }
    }

    pub fn number<T: FromStr + Default>(&mut self, field: &'static str) -> T {
        let value = self.next_raw();
        match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                self.issues.push(DecodeError::InvalidNumber {
                    field,
                    value: value.to_string(),
                });
                T::default()
            }
        }
    }

    pub fn decimal(&mut self, field: &'static str) -> Decimal {
        let value = self.next_raw();
        match Decimal::from_str(value.trim()) {
            Ok(parsed) => parsed,
            Err(_) => {
                self.issues.push(DecodeError::InvalidNumber {
                    field,
                    value: value.to_string(),
                });
                Decimal::ZERO
            }
        }
    }

    pub fn bool(&mut self, field: &'static str) -> bool {
        let value = self.next_raw();
        match value.trim().to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => {
                self.issues.push(DecodeError::InvalidBool {
                    field,
                    value: value.to_string(),
                });
                false
            }
        }
    }

    /// Unparseable dates fall back to today.
    pub fn date(&mut self, field: &'static str) -> NaiveDate {
        let value = self.next_raw();
        parse_date(value).unwrap_or_else(|| {
            self.issues.push(DecodeError::InvalidDate {
                field,
                value: value.to_string(),
            });
            today()
        })
    }

    pub fn opt_date(&mut self, field: &'static str) -> Option<NaiveDate> {
        let value = self.next_raw();
        if value.trim().is_empty() {
            return None;
        }
        match parse_date(value) {
            Some(date) => Some(date),
            None => {
                self.issues.push(DecodeError::InvalidDate {
                    field,
                    value: value.to_string(),
                });
                None
            }
        }
    }

    /// Reads a field that only admits a closed set of values.
    pub fn variant<T: Default>(
        &mut self,
        field: &'static str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> T {
        let value = self.next_raw();
        parse(value.trim()).unwrap_or_else(|| {
            self.issues.push(DecodeError::InvalidVariant {
                field,
                value: value.to_string(),
            });
            T::default()
        })
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
