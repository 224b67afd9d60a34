use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::{self, Display};

use super::RecordId;
use crate::db::{FieldReader, FieldWriter, Postable, Record, TripLinked};

/// Part of a settlement held back into the maintenance reserve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveEntry {
    pub id: RecordId,
    pub date: NaiveDate,
    pub trip: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub posted: bool,
}

impl ReserveEntry {
    pub fn new(date: NaiveDate, trip: String, amount: Decimal) -> Self {
        Self {
            id: RecordId::generate(),
            date,
            trip,
            amount,
            description: None,
            posted: false,
        }
    }
}

impl Record for ReserveEntry {
    const FIELD_COUNT: usize = 6;

    fn encode(&self, fields: &mut FieldWriter) {
        fields
            .number(self.id)
            .date(self.date)
            .text(&self.trip)
            .decimal(self.amount)
            .opt_text(self.description.as_deref())
            .bool(self.posted);
    }

    fn decode(fields: &mut FieldReader<'_>) -> Self {
        Self {
            id: fields.number("id"),
            date: fields.date("date"),
            trip: fields.text("trip"),
            amount: fields.decimal("amount"),
            description: fields.opt_text("description"),
            posted: fields.bool("posted"),
        }
    }
}

impl Postable for ReserveEntry {
    fn is_posted(&self) -> bool {
        self.posted
    }

    fn mark_posted(&mut self) {
        self.posted = true;
    }
}

impl TripLinked for ReserveEntry {
    fn trip(&self) -> &str {
        &self.trip
    }
}

impl Display for ReserveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} trip {} reserve {}",
            self.date.format("%Y-%m-%d"),
            self.trip,
            self.amount
        )?;
        if let Some(description) = &self.description {
            write!(f, " \"{description}\"")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{decode_line, encode_line};

    #[test]
    fn reserve_decodes_what_it_encodes() {
        let mut entry = ReserveEntry::new(
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            "T-88".to_string(),
            Decimal::new(12500, 2),
        );
        entry.mark_posted();
        let decoded = decode_line::<ReserveEntry>(&encode_line(&entry)).unwrap();
        assert_eq!(entry, decoded.record);
        assert!(decoded.record.is_posted());
    }
}
