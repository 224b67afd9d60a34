use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::{self, Display};

use super::AccountNumber;
use crate::db::{FieldReader, FieldWriter, Record};

/// One general ledger transaction: `amount` leaves `from_account` and enters `to_account`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralLedgerEntry {
    pub date: NaiveDate,
    pub code: String,
    pub description: String,
    pub from_account: AccountNumber,
    pub to_account: AccountNumber,
    pub amount: Decimal,
    pub deductible: bool,
    /// Reconciled against the bank statement.
    pub balanced: bool,
}

impl GeneralLedgerEntry {
    /// A negative amount is booked as the reverse movement, so the stored amount is never
    /// negative.
    pub fn new(
        date: NaiveDate,
        code: impl Into<String>,
        description: impl Into<String>,
        from_account: AccountNumber,
        to_account: AccountNumber,
        amount: Decimal,
        deductible: bool,
    ) -> Self {
        let (from_account, to_account) = if amount.is_sign_negative() {
            (to_account, from_account)
        } else {
            (from_account, to_account)
        };
        Self {
            date,
            code: code.into(),
            description: description.into(),
            from_account,
            to_account,
            amount: amount.abs(),
            deductible,
            balanced: false,
        }
    }

    /// Effect of this transaction on the balance of `account`.
    pub fn change_for(&self, account: AccountNumber) -> Decimal {
        let mut change = Decimal::ZERO;
        if self.to_account == account {
            change += self.amount;
        }
        if self.from_account == account {
            change -= self.amount;
        }
        change
    }
}

impl Record for GeneralLedgerEntry {
    const FIELD_COUNT: usize = 8;

    fn encode(&self, fields: &mut FieldWriter) {
        fields
            .date(self.date)
            .text(&self.code)
            .text(&self.description)
            .number(self.from_account)
            .number(self.to_account)
            .decimal(self.amount)
            .bool(self.deductible)
            .bool(self.balanced);
    }

    fn decode(fields: &mut FieldReader<'_>) -> Self {
        Self {
            date: fields.date("date"),
            code: fields.text("code"),
            description: fields.text("description"),
            from_account: fields.number("from_account"),
            to_account: fields.number("to_account"),
            amount: fields.decimal("amount"),
            deductible: fields.bool("deductible"),
            balanced: fields.bool("balanced"),
        }
    }
}

impl Display for GeneralLedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} -> {} {} \"{}\"",
            self.date.format("%Y-%m-%d"),
            self.code,
            self.from_account,
            self.to_account,
            self.amount,
            self.description,
        )
    }
}
