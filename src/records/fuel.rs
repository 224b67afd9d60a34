use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::{self, Display};

use super::{AccountNumber, RecordId};
use crate::db::{FieldReader, FieldWriter, Postable, Record, TripLinked};

/// Diesel and DEF bought at one stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuelPurchaseEntry {
    pub id: RecordId,
    pub date: NaiveDate,
    pub trip: String,
    pub location: Option<String>,
    pub odometer: u32,
    pub diesel_gallons: Decimal,
    pub diesel_price: Decimal,
    pub def_gallons: Decimal,
    pub def_price: Decimal,
    /// Account the purchase was paid from.
    pub source_account: AccountNumber,
    pub notes: Option<String>,
    pub posted: bool,
}

impl FuelPurchaseEntry {
    pub fn new(
        date: NaiveDate,
        trip: String,
        diesel_gallons: Decimal,
        diesel_price: Decimal,
        source_account: AccountNumber,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            date,
            trip,
            location: None,
            odometer: 0,
            diesel_gallons,
            diesel_price,
            def_gallons: Decimal::ZERO,
            def_price: Decimal::ZERO,
            source_account,
            notes: None,
            posted: false,
        }
    }

    pub fn with_def(mut self, def_gallons: Decimal, def_price: Decimal) -> Self {
        self.def_gallons = def_gallons;
        self.def_price = def_price;
        self
    }

    /// None if gallons times price doesn't fit into a [`Decimal`].
    pub fn diesel_total(&self) -> Option<Decimal> {
        self.diesel_gallons.checked_mul(self.diesel_price).map(money)
    }

    /// None if gallons times price doesn't fit into a [`Decimal`].
    pub fn def_total(&self) -> Option<Decimal> {
        self.def_gallons.checked_mul(self.def_price).map(money)
    }

    pub fn has_def(&self) -> bool {
        !matches!(self.def_total(), Some(total) if total.is_zero())
    }

    pub fn total(&self) -> Option<Decimal> {
        self.diesel_total()?.checked_add(self.def_total()?)
    }
}

fn money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Shows an amount, or "overflow" for an amount that couldn't be computed.
pub struct Total(pub Option<Decimal>);

impl Display for Total {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(amount) => write!(f, "{amount}"),
            None => write!(f, "overflow"),
        }
    }
}

impl Record for FuelPurchaseEntry {
    const FIELD_COUNT: usize = 12;

    fn encode(&self, fields: &mut FieldWriter) {
        fields
            .number(self.id)
            .date(self.date)
            .text(&self.trip)
            .opt_text(self.location.as_deref())
            .number(self.odometer)
            .decimal(self.diesel_gallons)
            .decimal(self.diesel_price)
            .decimal(self.def_gallons)
            .decimal(self.def_price)
            .number(self.source_account)
            .opt_text(self.notes.as_deref())
            .bool(self.posted);
    }

    fn decode(fields: &mut FieldReader<'_>) -> Self {
        Self {
            id: fields.number("id"),
            date: fields.date("date"),
            trip: fields.text("trip"),
            location: fields.opt_text("location"),
            odometer: fields.number("odometer"),
            diesel_gallons: fields.decimal("diesel_gallons"),
            diesel_price: fields.decimal("diesel_price"),
            def_gallons: fields.decimal("def_gallons"),
            def_price: fields.decimal("def_price"),
            source_account: fields.number("source_account"),
            notes: fields.opt_text("notes"),
            posted: fields.bool("posted"),
        }
    }
}

impl Postable for FuelPurchaseEntry {
    fn is_posted(&self) -> bool {
        self.posted
    }

    fn mark_posted(&mut self) {
        self.posted = true;
    }
}

impl TripLinked for FuelPurchaseEntry {
    fn trip(&self) -> &str {
        &self.trip
    }
}

impl Display for FuelPurchaseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} trip {} diesel {} gal @ {} = {}",
            self.date.format("%Y-%m-%d"),
            self.trip,
            self.diesel_gallons,
            self.diesel_price,
            Total(self.diesel_total()),
        )?;
        if self.has_def() {
            write!(
                f,
                ", DEF {} gal @ {} = {}",
                self.def_gallons,
                self.def_price,
                Total(self.def_total())
            )?;
        }
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

/// Money moved onto the fuel card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuelCardEntry {
    pub id: RecordId,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub source_account: AccountNumber,
    pub description: Option<String>,
    pub posted: bool,
}

impl FuelCardEntry {
    pub fn new(date: NaiveDate, amount: Decimal, source_account: AccountNumber) -> Self {
        Self {
            id: RecordId::generate(),
            date,
            amount,
            source_account,
            description: None,
            posted: false,
        }
    }
}

impl Record for FuelCardEntry {
    const FIELD_COUNT: usize = 6;

    fn encode(&self, fields: &mut FieldWriter) {
        fields
            .number(self.id)
            .date(self.date)
            .decimal(self.amount)
            .number(self.source_account)
            .opt_text(self.description.as_deref())
            .bool(self.posted);
    }

    fn decode(fields: &mut FieldReader<'_>) -> Self {
        Self {
            id: fields.number("id"),
            date: fields.date("date"),
            amount: fields.decimal("amount"),
            source_account: fields.number("source_account"),
            description: fields.opt_text("description"),
            posted: fields.bool("posted"),
        }
    }
}

impl Postable for FuelCardEntry {
    fn is_posted(&self) -> bool {
        self.posted
    }

    fn mark_posted(&mut self) {
        self.posted = true;
    }
}

impl Display for FuelCardEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} from account {}",
            self.date.format("%Y-%m-%d"),
            self.amount,
            self.source_account
        )?;
        if let Some(description) = &self.description {
            write!(f, " \"{description}\"")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::db::{decode_line, encode_line};

    fn purchase() -> FuelPurchaseEntry {
        FuelPurchaseEntry {
            id: RecordId(1_700_000_000_000),
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            trip: "T-1042".to_string(),
            location: Some("Pilot, Amarillo TX".to_string()),
            odometer: 412_880,
            diesel_gallons: Decimal::new(1205, 1),
            diesel_price: Decimal::new(3899, 3),
            def_gallons: Decimal::new(25, 1),
            def_price: Decimal::new(4190, 3),
            source_account: AccountNumber(50040),
            notes: None,
            posted: false,
        }
    }

    #[test]
    fn fuel_purchase_line_layout() {
        assert_eq!(
            "1700000000000~05/02/2024~T-1042~Pilot, Amarillo TX~412880~120.5~3.899~2.5~4.19~50040~ ~false",
            encode_line(&purchase())
        );
    }

    #[test]
    fn fuel_purchase_decodes_what_it_encodes() {
        let decoded = decode_line::<FuelPurchaseEntry>(&encode_line(&purchase())).unwrap();
        assert_eq!(purchase(), decoded.record);
        assert!(decoded.issues.is_empty());
    }

    #[rstest]
    #[case(Decimal::new(500, 1), Decimal::new(350, 2), Decimal::new(17500, 2))]
    #[case(Decimal::new(1205, 1), Decimal::new(3899, 3), Decimal::new(46983, 2))]
    #[case(Decimal::new(1, 0), Decimal::new(1005, 3), Decimal::new(101, 2))]
    fn diesel_total_rounds_to_cents(
        #[case] gallons: Decimal,
        #[case] price: Decimal,
        #[case] expected: Decimal,
    ) {
        let entry = FuelPurchaseEntry::new(
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            "T-1".to_string(),
            gallons,
            price,
            AccountNumber(50040),
        );
        assert_eq!(Some(expected), entry.diesel_total());
    }

    #[test]
    fn overflowing_total_is_none() {
        let entry = FuelPurchaseEntry::new(
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            "T-1".to_string(),
            Decimal::MAX,
            Decimal::new(2, 0),
            AccountNumber(50040),
        );
        assert_eq!(None, entry.diesel_total());
        assert_eq!(None, entry.total());
        assert!(!entry.has_def());
        assert_eq!(
            "2024-05-02 trip T-1 diesel 79228162514264337593543950335 gal @ 2 = overflow",
            entry.to_string()
        );
    }

    #[test]
    fn def_is_optional() {
        let entry = FuelPurchaseEntry::new(
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            "T-1".to_string(),
            Decimal::new(50, 0),
            Decimal::new(350, 2),
            AccountNumber(50040),
        );
        assert!(!entry.has_def());
        assert!(entry
            .with_def(Decimal::new(2, 0), Decimal::new(4, 0))
            .has_def());
    }

    #[test]
    fn fuel_card_decodes_what_it_encodes() {
        let entry = FuelCardEntry {
            description: Some("weekly top-up".to_string()),
            posted: true,
            ..FuelCardEntry::new(
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                Decimal::new(50000, 2),
                AccountNumber(10000),
            )
        };
        let decoded = decode_line::<FuelCardEntry>(&encode_line(&entry)).unwrap();
        assert_eq!(entry, decoded.record);
    }
}
