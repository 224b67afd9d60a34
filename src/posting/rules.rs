use rust_decimal::Decimal;

use super::{AmountOverflow, PostingRule};
use crate::records::{
    AccountNumber, FuelCardEntry, FuelPurchaseEntry, GeneralLedgerEntry, ReserveEntry,
};

pub const CODE_DIESEL: &str = "FUEL";
pub const CODE_DEF: &str = "DEF";
pub const CODE_FUEL_CARD: &str = "FCARD";
pub const CODE_RESERVE: &str = "RSRV";

/// Diesel is paid from the purchase's source account, DEF from the fuel card; both land in the
/// fuel purchase account and are deductible.
#[derive(Debug, Clone, Copy)]
pub struct FuelPurchaseRule {
    pub fuel_purchase: AccountNumber,
    pub fuel_card: AccountNumber,
}

impl PostingRule<FuelPurchaseEntry> for FuelPurchaseRule {
    fn ledger_entries(
        &self,
        record: &FuelPurchaseEntry,
    ) -> Result<Vec<GeneralLedgerEntry>, AmountOverflow> {
        let mut entries = vec![];
        let diesel = record.diesel_total().ok_or(AmountOverflow("diesel"))?;
        if !diesel.is_zero() {
            entries.push(GeneralLedgerEntry::new(
                record.date,
                CODE_DIESEL,
                format!(
                    "Diesel {} gal @ {} trip {}",
                    record.diesel_gallons, record.diesel_price, record.trip
                ),
                record.source_account,
                self.fuel_purchase,
                diesel,
                true,
            ));
        }
        let def = record.def_total().ok_or(AmountOverflow("DEF"))?;
        if !def.is_zero() {
            entries.push(GeneralLedgerEntry::new(
                record.date,
                CODE_DEF,
                format!(
                    "DEF {} gal @ {} trip {}",
                    record.def_gallons, record.def_price, record.trip
                ),
                self.fuel_card,
                self.fuel_purchase,
                def,
                true,
            ));
        }
        Ok(entries)
    }
}

/// Money loaded onto the fuel card from another account.
#[derive(Debug, Clone, Copy)]
pub struct FuelCardRule {
    pub fuel_card: AccountNumber,
}

impl PostingRule<FuelCardEntry> for FuelCardRule {
    fn ledger_entries(
        &self,
        record: &FuelCardEntry,
    ) -> Result<Vec<GeneralLedgerEntry>, AmountOverflow> {
        Ok(single(
            record.amount,
            GeneralLedgerEntry::new(
                record.date,
                CODE_FUEL_CARD,
                record
                    .description
                    .clone()
                    .unwrap_or_else(|| "Fuel card transfer".to_string()),
                record.source_account,
                self.fuel_card,
                record.amount,
                false,
            ),
        ))
    }
}

/// Reserve contributions are held back from receivables.
#[derive(Debug, Clone, Copy)]
pub struct ReserveRule {
    pub receivables: AccountNumber,
    pub reserve: AccountNumber,
}

impl PostingRule<ReserveEntry> for ReserveRule {
    fn ledger_entries(
        &self,
        record: &ReserveEntry,
    ) -> Result<Vec<GeneralLedgerEntry>, AmountOverflow> {
        let description = match &record.description {
            Some(description) => format!("{} trip {}", description, record.trip),
            None => format!("Reserve trip {}", record.trip),
        };
        Ok(single(
            record.amount,
            GeneralLedgerEntry::new(
                record.date,
                CODE_RESERVE,
                description,
                self.receivables,
                self.reserve,
                record.amount,
                false,
            ),
        ))
    }
}

fn single(amount: Decimal, entry: GeneralLedgerEntry) -> Vec<GeneralLedgerEntry> {
    if amount.is_zero() {
        vec![]
    } else {
        vec![entry]
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;
    use crate::posting::JournalAccounts;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    fn purchase(diesel_gallons: Decimal, def_gallons: Decimal) -> FuelPurchaseEntry {
        FuelPurchaseEntry::new(
            date(),
            "T-1042".to_string(),
            diesel_gallons,
            Decimal::new(350, 2),
            AccountNumber(10000),
        )
        .with_def(def_gallons, Decimal::new(400, 2))
    }

    #[test]
    fn diesel_and_def_post_separately() {
        let rule = JournalAccounts::default().fuel_purchase_rule();
        let entries = rule
            .ledger_entries(&purchase(Decimal::new(50, 0), Decimal::new(5, 0)))
            .unwrap();

        assert_eq!(2, entries.len());
        let diesel = &entries[0];
        assert_eq!(CODE_DIESEL, diesel.code);
        assert_eq!(AccountNumber(10000), diesel.from_account);
        assert_eq!(AccountNumber(10040), diesel.to_account);
        assert_eq!(Decimal::new(175, 0), diesel.amount);
        assert!(diesel.deductible);

        let def = &entries[1];
        assert_eq!(CODE_DEF, def.code);
        assert_eq!(AccountNumber(50040), def.from_account);
        assert_eq!(AccountNumber(10040), def.to_account);
        assert_eq!(Decimal::new(20, 0), def.amount);
        assert!(def.deductible);
        assert!(!def.balanced);
    }

    #[rstest]
    #[case(Decimal::new(50, 0), Decimal::ZERO, vec![CODE_DIESEL])]
    #[case(Decimal::ZERO, Decimal::new(5, 0), vec![CODE_DEF])]
    #[case(Decimal::ZERO, Decimal::ZERO, vec![])]
    fn only_nonzero_movements_post(
        #[case] diesel_gallons: Decimal,
        #[case] def_gallons: Decimal,
        #[case] expected_codes: Vec<&str>,
    ) {
        let rule = JournalAccounts::default().fuel_purchase_rule();
        let entries = rule
            .ledger_entries(&purchase(diesel_gallons, def_gallons))
            .unwrap();
        assert_eq!(
            expected_codes,
            entries
                .iter()
                .map(|entry| entry.code.as_str())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn overflowing_def_posts_nothing() {
        let rule = JournalAccounts::default().fuel_purchase_rule();
        let record = purchase(Decimal::new(50, 0), Decimal::MAX);
        assert_eq!(Err(AmountOverflow("DEF")), rule.ledger_entries(&record));
    }

    #[test]
    fn fuel_card_transfer() {
        let rule = JournalAccounts::default().fuel_card_rule();
        let entries = rule
            .ledger_entries(&FuelCardEntry::new(
                date(),
                Decimal::new(30000, 2),
                AccountNumber(10000),
            ))
            .unwrap();
        assert_eq!(1, entries.len());
        assert_eq!(AccountNumber(10000), entries[0].from_account);
        assert_eq!(AccountNumber(50040), entries[0].to_account);
        assert_eq!(Decimal::new(30000, 2), entries[0].amount);
        assert!(!entries[0].deductible);
        assert_eq!("Fuel card transfer", entries[0].description);
    }

    #[test]
    fn reserve_contribution() {
        let rule = JournalAccounts::default().reserve_rule();
        let entries = rule
            .ledger_entries(&ReserveEntry::new(
                date(),
                "T-1042".to_string(),
                Decimal::new(12500, 2),
            ))
            .unwrap();
        assert_eq!(1, entries.len());
        assert_eq!(AccountNumber(10100), entries[0].from_account);
        assert_eq!(AccountNumber(10300), entries[0].to_account);
        assert!(!entries[0].deductible);
        assert_eq!("Reserve trip T-1042", entries[0].description);
    }

    #[test]
    fn negative_reserve_reverses() {
        let rule = JournalAccounts::default().reserve_rule();
        let entries = rule
            .ledger_entries(&ReserveEntry::new(
                date(),
                "T-1042".to_string(),
                Decimal::new(-5000, 2),
            ))
            .unwrap();
        assert_eq!(AccountNumber(10300), entries[0].from_account);
        assert_eq!(AccountNumber(10100), entries[0].to_account);
        assert_eq!(Decimal::new(5000, 2), entries[0].amount);
    }
}
