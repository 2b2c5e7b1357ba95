//! Command line arguments.

use chrono::{Datelike, NaiveDate};
use clap::Parser;

use crate::error::SyncError;

/// Payments before January 1st of this year were never invoiced through this tool.
pub const EARLIEST_START_YEAR: i32 = 2020;

#[derive(Parser, Debug)]
#[command(
    name = "invoice-sync",
    version,
    about = "Generate SmartBill invoices for Stripe payments",
    after_help = "\
Examples:
  invoice-sync 2020-07-01
  invoice-sync 2022-07-01 --dry-run

Credentials and company details are read from the environment or a .env file."
)]
pub struct Cli {
    /// Only payments created on or after this date (YYYY-MM-DD, UTC) are considered
    #[arg(value_parser = parse_start_date)]
    pub start_date: NaiveDate,

    /// Build and log the invoices without creating or marking anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn parse_start_date(raw: &str) -> Result<NaiveDate, SyncError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        SyncError::InvalidStartDate(format!("'{}' is not a date in YYYY-MM-DD format", raw))
    })?;

    if date.year() < EARLIEST_START_YEAR {
        return Err(SyncError::InvalidStartDate(format!(
            "{} is before {}-01-01",
            date, EARLIEST_START_YEAR
        )));
    }
    Ok(date)
}
