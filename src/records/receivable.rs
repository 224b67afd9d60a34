use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::{self, Display};

use super::RecordId;
use crate::db::{FieldReader, FieldWriter, Record, TripLinked};

/// Money a customer owes for a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivableEntry {
    pub id: RecordId,
    pub date: NaiveDate,
    pub order: String,
    pub customer_id: RecordId,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid: bool,
    pub paid_date: Option<NaiveDate>,
}

impl ReceivableEntry {
    pub fn new(
        date: NaiveDate,
        order: String,
        customer_id: RecordId,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            date,
            order,
            customer_id,
            amount,
            due_date,
            paid: false,
            paid_date: None,
        }
    }

    pub fn mark_paid(&mut self, date: NaiveDate) {
        self.paid = true;
        self.paid_date = Some(date);
    }
}

impl Record for ReceivableEntry {
    const FIELD_COUNT: usize = 8;

    fn encode(&self, fields: &mut FieldWriter) {
        fields
            .number(self.id)
            .date(self.date)
            .text(&self.order)
            .number(self.customer_id)
            .decimal(self.amount)
            .date(self.due_date)
            .bool(self.paid)
            .opt_date(self.paid_date);
    }

    fn decode(fields: &mut FieldReader<'_>) -> Self {
        Self {
            id: fields.number("id"),
            date: fields.date("date"),
            order: fields.text("order"),
            customer_id: fields.number("customer_id"),
            amount: fields.decimal("amount"),
            due_date: fields.date("due_date"),
            paid: fields.bool("paid"),
            paid_date: fields.opt_date("paid_date"),
        }
    }
}

impl TripLinked for ReceivableEntry {
    fn trip(&self) -> &str {
        &self.order
    }
}

impl Display for ReceivableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} order {} customer {} {} due {}",
            self.date.format("%Y-%m-%d"),
            self.order,
            self.customer_id,
            self.amount,
            self.due_date.format("%Y-%m-%d"),
        )?;
        if let Some(paid_date) = self.paid_date {
            write!(f, " (paid {})", paid_date.format("%Y-%m-%d"))?;
        }
        Ok(())
    }
}
