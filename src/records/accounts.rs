use std::fmt::{self, Display};

use super::AccountNumber;
use crate::db::{FieldReader, FieldWriter, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AccountKind {
    #[default]
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Asset => "Asset",
            AccountKind::Liability => "Liability",
            AccountKind::Equity => "Equity",
            AccountKind::Revenue => "Revenue",
            AccountKind::Expense => "Expense",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Asset" => Some(AccountKind::Asset),
            "Liability" => Some(AccountKind::Liability),
            "Equity" => Some(AccountKind::Equity),
            "Revenue" => Some(AccountKind::Revenue),
            "Expense" => Some(AccountKind::Expense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOfAccountsEntry {
    pub number: AccountNumber,
    pub name: String,
    pub kind: AccountKind,
    pub description: Option<String>,
    pub tax_deductible: bool,
}

impl ChartOfAccountsEntry {
    pub fn new(number: AccountNumber, name: String, kind: AccountKind) -> Self {
        Self {
            number,
            name,
            kind,
            description: None,
            tax_deductible: false,
        }
    }
}

impl Record for ChartOfAccountsEntry {
    const FIELD_COUNT: usize = 5;

    fn encode(&self, fields: &mut FieldWriter) {
        fields
            .number(self.number)
            .text(&self.name)
            .text(self.kind.as_str())
            .opt_text(self.description.as_deref())
            .bool(self.tax_deductible);
    }

    fn decode(fields: &mut FieldReader<'_>) -> Self {
        Self {
            number: fields.number("number"),
            name: fields.text("name"),
            kind: fields.variant("kind", AccountKind::parse),
            description: fields.opt_text("description"),
            tax_deductible: fields.bool("tax_deductible"),
        }
    }
}

impl Display for ChartOfAccountsEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.number, self.name, self.kind.as_str())?;
        if self.tax_deductible {
            write!(f, " [deductible]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{decode_line, encode_line, DecodeError};

    #[test]
    fn account_decodes_what_it_encodes() {
        let entry = ChartOfAccountsEntry {
            description: Some("Diesel and DEF".to_string()),
            tax_deductible: true,
            ..ChartOfAccountsEntry::new(
                AccountNumber(10040),
                "Fuel Purchase".to_string(),
                AccountKind::Expense,
            )
        };
        assert_eq!(
            "10040~Fuel Purchase~Expense~Diesel and DEF~true",
            encode_line(&entry)
        );
        let decoded = decode_line::<ChartOfAccountsEntry>(&encode_line(&entry)).unwrap();
        assert_eq!(entry, decoded.record);
    }

    #[test]
    fn unknown_kind_falls_back() {
        let decoded = decode_line::<ChartOfAccountsEntry>("1~Cash~Bogus~ ~false").unwrap();
        assert_eq!(AccountKind::Asset, decoded.record.kind);
        assert_eq!(
            vec![DecodeError::InvalidVariant {
                field: "kind",
                value: "Bogus".to_string()
            }],
            decoded.issues
        );
    }
}
