use chrono::NaiveDate;
use std::fmt::{self, Display};

use super::RecordId;
use crate::db::{FieldReader, FieldWriter, Record, TripLinked};

/// One pickup or delivery of a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopEntry {
    pub id: RecordId,
    pub order: String,
    pub stop_number: u16,
    pub customer_id: RecordId,
    pub early_date: NaiveDate,
    pub late_date: NaiveDate,
    pub signed_by: Option<String>,
    pub completed: bool,
}

impl StopEntry {
    pub fn new(
        order: String,
        stop_number: u16,
        customer_id: RecordId,
        early_date: NaiveDate,
        late_date: NaiveDate,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            order,
            stop_number,
            customer_id,
            early_date,
            late_date,
            signed_by: None,
            completed: false,
        }
    }
}

impl Record for StopEntry {
    const FIELD_COUNT: usize = 8;

    fn encode(&self, fields: &mut FieldWriter) {
        fields
            .number(self.id)
            .text(&self.order)
            .number(self.stop_number)
            .number(self.customer_id)
            .date(self.early_date)
            .date(self.late_date)
            .opt_text(self.signed_by.as_deref())
            .bool(self.completed);
    }

    fn decode(fields: &mut FieldReader<'_>) -> Self {
        Self {
            id: fields.number("id"),
            order: fields.text("order"),
            stop_number: fields.number("stop_number"),
            customer_id: fields.number("customer_id"),
            early_date: fields.date("early_date"),
            late_date: fields.date("late_date"),
            signed_by: fields.opt_text("signed_by"),
            completed: fields.bool("completed"),
        }
    }
}

impl TripLinked for StopEntry {
    fn trip(&self) -> &str {
        &self.order
    }
}

impl Display for StopEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "order {} stop {} customer {} window {}..{}",
            self.order,
            self.stop_number,
            self.customer_id,
            self.early_date.format("%Y-%m-%d"),
            self.late_date.format("%Y-%m-%d"),
        )?;
        if self.completed {
            write!(f, " [done]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{decode_line, encode_line};

    #[test]
    fn stop_decodes_what_it_encodes() {
        let entry = StopEntry {
            signed_by: Some("J. Ortiz".to_string()),
            completed: true,
            ..StopEntry::new(
                "ORD-311".to_string(),
                2,
                RecordId(17),
                NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            )
        };
        let decoded = decode_line::<StopEntry>(&encode_line(&entry)).unwrap();
        assert_eq!(entry, decoded.record);
    }
}
