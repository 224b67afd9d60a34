use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::{self, Display};

use super::RecordId;
use crate::db::{FieldReader, FieldWriter, Record, TripLinked};

/// A load booked through a broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadEntry {
    pub id: RecordId,
    pub order: String,
    pub trip: String,
    pub broker_id: RecordId,
    pub pickup_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub rate: Decimal,
    pub miles: u32,
    pub commodity: Option<String>,
    pub bill_of_lading: Option<String>,
    pub hazmat: bool,
    pub tarped: bool,
    pub team: bool,
    pub completed: bool,
}

impl LoadEntry {
    pub fn new(
        order: String,
        trip: String,
        broker_id: RecordId,
        pickup_date: NaiveDate,
        delivery_date: NaiveDate,
        rate: Decimal,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            order,
            trip,
            broker_id,
            pickup_date,
            delivery_date,
            rate,
            miles: 0,
            commodity: None,
            bill_of_lading: None,
            hazmat: false,
            tarped: false,
            team: false,
            completed: false,
        }
    }

    /// Rate per loaded mile, if the distance is known.
    pub fn rate_per_mile(&self) -> Option<Decimal> {
        if self.miles == 0 {
            None
        } else {
            Some((self.rate / Decimal::from(self.miles)).round_dp(2))
        }
    }
}

impl Record for LoadEntry {
    const FIELD_COUNT: usize = 14;

    fn encode(&self, fields: &mut FieldWriter) {
        fields
            .number(self.id)
            .text(&self.order)
            .text(&self.trip)
            .number(self.broker_id)
            .date(self.pickup_date)
            .date(self.delivery_date)
            .decimal(self.rate)
            .number(self.miles)
            .opt_text(self.commodity.as_deref())
            .opt_text(self.bill_of_lading.as_deref())
            .bool(self.hazmat)
            .bool(self.tarped)
            .bool(self.team)
            .bool(self.completed);
    }

    fn decode(fields: &mut FieldReader<'_>) -> Self {
        Self {
            id: fields.number("id"),
            order: fields.text("order"),
            trip: fields.text("trip"),
            broker_id: fields.number("broker_id"),
            pickup_date: fields.date("pickup_date"),
            delivery_date: fields.date("delivery_date"),
            rate: fields.decimal("rate"),
            miles: fields.number("miles"),
            commodity: fields.opt_text("commodity"),
            bill_of_lading: fields.opt_text("bill_of_lading"),
            hazmat: fields.bool("hazmat"),
            tarped: fields.bool("tarped"),
            team: fields.bool("team"),
            completed: fields.bool("completed"),
        }
    }
}

impl TripLinked for LoadEntry {
    fn trip(&self) -> &str {
        &self.trip
    }
}

impl Display for LoadEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "order {} trip {} {}..{} rate {}",
            self.order,
            self.trip,
            self.pickup_date.format("%Y-%m-%d"),
            self.delivery_date.format("%Y-%m-%d"),
            self.rate,
        )?;
        if let Some(per_mile) = self.rate_per_mile() {
            write!(f, " ({per_mile}/mi)")?;
        }
        if self.hazmat {
            write!(f, " [hazmat]")?;
        }
        Ok(())
    }
}
