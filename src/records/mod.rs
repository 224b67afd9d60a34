use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

mod accounts;
mod broker;
mod customer;
mod fuel;
mod ledger_entry;
mod load;
mod receivable;
mod reserve;
mod stop;
mod toll;

pub use accounts::{AccountKind, ChartOfAccountsEntry};
pub use broker::BrokerEntry;
pub use customer::CustomerEntry;
pub use fuel::{FuelCardEntry, FuelPurchaseEntry, Total};
pub use ledger_entry::GeneralLedgerEntry;
pub use load::LoadEntry;
pub use receivable::ReceivableEntry;
pub use reserve::ReserveEntry;
pub use stop::StopEntry;
pub use toll::TollEntry;

/// Number of an account in the chart of accounts.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct AccountNumber(pub u32);

impl Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountNumber {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Identity of a record, derived from the creation time in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub i64);

static LAST_ID: AtomicI64 = AtomicI64::new(0);

impl RecordId {
    /// Strictly greater than every id generated before in this process.
    pub fn generate() -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        let mut last = LAST_ID.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match LAST_ID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return Self(next),
                Err(actual) => last = actual,
            }
        }
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_increase() {
        let ids: Vec<RecordId> = (0..100).map(|_| RecordId::generate()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn generated_ids_follow_the_clock() {
        let before = chrono::Utc::now().timestamp_millis();
        assert!(RecordId::generate().0 >= before);
    }
}
