use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;

use anyhow::Result;
use beancount_core::{metadata::MetaValue, Directive, Flag, IncompleteAmount, Ledger, Posting};
use common_macros::{hash_map, hash_set};
use rust_decimal::Decimal;

use crate::records::{AccountKind, AccountNumber, ChartOfAccountsEntry, GeneralLedgerEntry};

pub const CURRENCY: &str = "USD";

/// Renders general ledger entries as a beancount file.
///
/// Every ledger entry becomes one transaction with two postings. Account names come from the
/// chart of accounts. Accounts missing from the chart are exported as assets.
pub fn export_ledger<'a>(
    entries: impl Iterator<Item = &'a GeneralLedgerEntry>,
    chart: impl Iterator<Item = &'a ChartOfAccountsEntry>,
    writer: &mut impl Write,
) -> Result<()> {
    let chart: HashMap<AccountNumber, &ChartOfAccountsEntry> =
        chart.map(|account| (account.number, account)).collect();
    let ledger = Ledger {
        directives: entries
            .map(|entry| entry_to_beancount(entry, &chart))
            .collect(),
    };
    beancount_render::render(writer, &ledger)?;
    Ok(())
}

fn entry_to_beancount<'a>(
    entry: &'a GeneralLedgerEntry,
    chart: &HashMap<AccountNumber, &ChartOfAccountsEntry>,
) -> Directive<'a> {
    let meta = hash_map![
        Cow::Borrowed("code") => MetaValue::Text(Cow::Borrowed(&entry.code)),
        Cow::Borrowed("tax_deductible") => MetaValue::Bool(entry.deductible),
    ];
    Directive::Transaction(beancount_core::Transaction {
        date: entry.date.into(),
        // Unreconciled entries show up as warnings until they are balanced
        flag: if entry.balanced {
            Flag::Okay
        } else {
            Flag::Warning
        },
        payee: None,
        narration: Cow::Borrowed(&entry.description),
        tags: hash_set![],
        links: hash_set![],
        postings: vec![
            posting(account_to_beancount(entry.from_account, chart), -entry.amount),
            posting(account_to_beancount(entry.to_account, chart), entry.amount),
        ],
        meta,
        source: None,
    })
}

fn posting(account: beancount_core::Account<'static>, amount: Decimal) -> Posting<'static> {
    Posting {
        account,
        units: IncompleteAmount {
            num: Some(amount),
            currency: Some(Cow::Borrowed(CURRENCY)),
        },
        cost: None,
        price: None,
        flag: None,
        meta: hash_map![],
    }
}

fn account_to_beancount(
    number: AccountNumber,
    chart: &HashMap<AccountNumber, &ChartOfAccountsEntry>,
) -> beancount_core::Account<'static> {
    let (kind, name) = match chart.get(&number) {
        Some(account) => (account.kind, account_name(&account.name)),
        None => (AccountKind::Asset, None),
    };
    let ty = match kind {
        AccountKind::Asset => beancount_core::AccountType::Assets,
        AccountKind::Liability => beancount_core::AccountType::Liabilities,
        AccountKind::Equity => beancount_core::AccountType::Equity,
        AccountKind::Revenue => beancount_core::AccountType::Income,
        AccountKind::Expense => beancount_core::AccountType::Expenses,
    };
    let name = name.unwrap_or_else(|| format!("A{}", number));
    beancount_core::Account {
        ty,
        parts: vec![Cow::Owned(name)],
    }
}

/// Turns a chart-of-accounts name into a beancount account component, e.g.
/// "maintenance reserve" becomes "MaintenanceReserve".
fn account_name(name: &str) -> Option<String> {
    let component: String = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    // Components have to start with a capital letter or a digit
    match component.chars().next() {
        Some(first) if first.is_ascii_uppercase() || first.is_ascii_digit() => Some(component),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Fuel Purchase", Some("FuelPurchase"))]
    #[case("maintenance reserve", Some("MaintenanceReserve"))]
    #[case("A/R - Brokers", Some("ARBrokers"))]
    #[case("401k match", Some("401kMatch"))]
    #[case("  ", None)]
    #[case("Öl", Some("L"))]
    fn names(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(expected.map(str::to_string), account_name(name));
    }

    #[test]
    fn unknown_account_is_an_asset() {
        let account = account_to_beancount(AccountNumber(12345), &HashMap::new());
        assert_eq!(beancount_core::AccountType::Assets, account.ty);
        assert_eq!(vec![Cow::Borrowed("A12345")], account.parts);
    }

    #[test]
    fn renders_both_sides() {
        let chart = [
            ChartOfAccountsEntry::new(
                AccountNumber(10040),
                "Fuel Purchase".to_string(),
                AccountKind::Expense,
            ),
            ChartOfAccountsEntry::new(
                AccountNumber(50040),
                "Fuel Card".to_string(),
                AccountKind::Asset,
            ),
        ];
        let entry = GeneralLedgerEntry::new(
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            "FUEL",
            "Diesel",
            AccountNumber(50040),
            AccountNumber(10040),
            Decimal::new(17500, 2),
            true,
        );
        let mut output = Vec::new();
        export_ledger([entry].iter(), chart.iter(), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("2024-05-02 !"), "{output}");
        assert!(output.contains("Diesel"), "{output}");
        assert!(output.contains("Expenses:FuelPurchase"), "{output}");
        assert!(output.contains("Assets:FuelCard"), "{output}");
        assert!(output.contains("-175.00 USD"), "{output}");
    }
}
