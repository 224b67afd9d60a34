use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::{self, Display};

use super::RecordId;
use crate::db::{FieldReader, FieldWriter, Record, TripLinked};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TollEntry {
    pub id: RecordId,
    pub date: NaiveDate,
    pub trip: String,
    pub location: Option<String>,
    pub agency: Option<String>,
    pub amount: Decimal,
    /// Paid through a transponder rather than at the booth.
    pub transponder: bool,
    pub notes: Option<String>,
}

impl TollEntry {
    pub fn new(date: NaiveDate, trip: String, amount: Decimal) -> Self {
        Self {
            id: RecordId::generate(),
            date,
            trip,
            location: None,
            agency: None,
            amount,
            transponder: false,
            notes: None,
        }
    }
}

impl Record for TollEntry {
    const FIELD_COUNT: usize = 8;

    fn encode(&self, fields: &mut FieldWriter) {
        fields
            .number(self.id)
            .date(self.date)
            .text(&self.trip)
            .opt_text(self.location.as_deref())
            .opt_text(self.agency.as_deref())
            .decimal(self.amount)
            .bool(self.transponder)
            .opt_text(self.notes.as_deref());
    }

    fn decode(fields: &mut FieldReader<'_>) -> Self {
        Self {
            id: fields.number("id"),
            date: fields.date("date"),
            trip: fields.text("trip"),
            location: fields.opt_text("location"),
            agency: fields.opt_text("agency"),
            amount: fields.decimal("amount"),
            transponder: fields.bool("transponder"),
            notes: fields.opt_text("notes"),
        }
    }
}

impl TripLinked for TollEntry {
    fn trip(&self) -> &str {
        &self.trip
    }
}

impl Display for TollEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} trip {} toll {}",
            self.date.format("%Y-%m-%d"),
            self.trip,
            self.amount
        )?;
        if let Some(agency) = &self.agency {
            write!(f, " ({agency})")?;
        }
        if self.transponder {
            write!(f, " [transponder]")?;
        }
        Ok(())
    }
}
