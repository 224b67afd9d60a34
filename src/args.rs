use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::books::JournalKind;
use crate::records::AccountNumber;

/// Keep the fuel, toll, reserve and receivable journals of a trucking business and post them to
/// the general ledger.
#[derive(Parser, Debug)]
pub struct Args {
    /// Path of the config file
    #[clap(long, global = true, default_value = "haulbooks.yaml")]
    pub config: PathBuf,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a config file and a data directory with a chart of accounts
    Init {
        /// Directory for the journal files. Asked interactively if missing.
        #[clap(long)]
        data_dir: Option<PathBuf>,
    },

    /// Add a fuel purchase to the fuel purchase journal
    AddFuelPurchase {
        #[clap(long)]
        trip: String,
        #[clap(long)]
        gallons: Decimal,
        #[clap(long)]
        price: Decimal,
        /// Account the diesel was paid from
        #[clap(long)]
        source_account: AccountNumber,
        #[clap(long, default_value_t = Decimal::ZERO)]
        def_gallons: Decimal,
        #[clap(long, default_value_t = Decimal::ZERO)]
        def_price: Decimal,
        #[clap(long)]
        location: Option<String>,
        #[clap(long, default_value_t = 0)]
        odometer: u32,
        /// Defaults to today
        #[clap(long)]
        date: Option<NaiveDate>,
    },

    /// Add a transfer onto the fuel card
    AddFuelCard {
        #[clap(long, allow_hyphen_values = true)]
        amount: Decimal,
        #[clap(long)]
        source_account: AccountNumber,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        date: Option<NaiveDate>,
    },

    /// Add a reserve contribution for a trip
    AddReserve {
        #[clap(long)]
        trip: String,
        #[clap(long, allow_hyphen_values = true)]
        amount: Decimal,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        date: Option<NaiveDate>,
    },

    /// Add a toll paid on a trip
    AddToll {
        #[clap(long)]
        trip: String,
        #[clap(long)]
        amount: Decimal,
        #[clap(long)]
        agency: Option<String>,
        #[clap(long)]
        location: Option<String>,
        /// Paid by transponder rather than cash
        #[clap(long)]
        transponder: bool,
        #[clap(long)]
        date: Option<NaiveDate>,
    },

    /// Print all entries of a journal or table
    List {
        #[clap(value_enum)]
        kind: JournalKind,
    },

    /// Print the fuel, toll and reserve entries of one trip
    Trip { trip: String },

    /// Post all unposted entries of a journal to the general ledger
    Post {
        #[clap(value_enum)]
        kind: JournalKind,
    },

    /// Print the general ledger
    Ledger,

    /// Print the balance of every account that has ledger entries
    Balance,

    /// Print the general ledger in beancount format
    Export,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fuel_purchase() {
        let args = Args::try_parse_from([
            "haulbooks",
            "add-fuel-purchase",
            "--trip",
            "T-1042",
            "--gallons",
            "50.0",
            "--price",
            "3.50",
            "--source-account",
            "50040",
            "--date",
            "2024-05-02",
        ])
        .unwrap();
        assert_eq!(PathBuf::from("haulbooks.yaml"), args.config);
        match args.command {
            Command::AddFuelPurchase {
                trip,
                gallons,
                source_account,
                def_gallons,
                date,
                ..
            } => {
                assert_eq!("T-1042", trip);
                assert_eq!(Decimal::new(500, 1), gallons);
                assert_eq!(AccountNumber(50040), source_account);
                assert_eq!(Decimal::ZERO, def_gallons);
                assert_eq!(NaiveDate::from_ymd_opt(2024, 5, 2), date);
            }
            command => panic!("Unexpected command {command:?}"),
        }
    }

    #[test]
    fn parses_post_kind() {
        let args =
            Args::try_parse_from(["haulbooks", "post", "fuel-card", "--config", "x.yaml"]).unwrap();
        assert_eq!(PathBuf::from("x.yaml"), args.config);
        assert!(matches!(
            args.command,
            Command::Post {
                kind: JournalKind::FuelCard
            }
        ));
    }

    #[test]
    fn negative_reserve_amount() {
        let args = Args::try_parse_from([
            "haulbooks",
            "add-reserve",
            "--trip",
            "T-1",
            "--amount",
            "-50.00",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::AddReserve { amount, .. } if amount == Decimal::new(-5000, 2)
        ));
    }
}
