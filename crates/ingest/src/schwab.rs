use chrono::NaiveDate;
use qbofix_engine::{FileHeader, NoiseFilter};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::str::FromStr;
use thiserror::Error;

use crate::qbo::{self, BankProfile};

/// The QBO importer treats `<FITID>` and `<NAME>` as 31-character fields.
pub const FITID_LIMIT: usize = 31;
const NAME_LIMIT: usize = 31;

/// Section header separating pending rows (discarded) from posted ones.
const POSTED_HEADER: &str = "Posted Transactions";

/// Posted row layout:
/// `Date,Type,Check #,Description,Withdrawal (-),Deposit (+),RunningBalance`.
/// Dollar amounts carry a leading `$`, are always positive, and may be
/// quoted with thousands separators.
#[derive(Debug, Clone)]
struct PostedRow {
    date: NaiveDate,
    kind: String,
    check_number: String,
    description: String,
    withdrawal: String,
    deposit: String,
    running_balance: String,
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no posted transactions in export")]
    NoPostedTransactions,
    #[error("posted row has {found} columns, expected 7")]
    ShortRow { found: usize },
    #[error("unrecognized date `{0}`")]
    InvalidDate(String),
    #[error("invalid amount `{0}`")]
    InvalidAmount(String),
}

#[derive(Debug)]
pub struct ConvertedStatement {
    pub lines: Vec<String>,
    /// End date + configured account id, for naming the output artifact.
    pub header: FileHeader,
}

/// Convert a Schwab checking CSV export into a full tagged QBO statement.
///
/// Rows before the `Posted Transactions` section header are pending and
/// discarded. Posted rows arrive most-recent-first, so the first row's date
/// is the statement end date and the last row's date the start date.
pub fn convert_csv<R: Read>(
    data: R,
    filter: &NoiseFilter,
    bank: &BankProfile,
) -> Result<ConvertedStatement, ConvertError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    let mut in_posted = false;
    for result in reader.records() {
        let record = result?;
        let first = record.get(0).unwrap_or("").trim();
        if !in_posted {
            in_posted = first == POSTED_HEADER;
        } else if first.is_empty() || first == "Date" {
            // Blank separators and the repeated column-header row.
            continue;
        } else {
            rows.push(parse_row(&record)?);
        }
    }
    if rows.is_empty() {
        return Err(ConvertError::NoPostedTransactions);
    }

    let file_date = qbo_date(rows[0].date);
    let start_date = qbo_date(rows[rows.len() - 1].date);

    let mut lines: Vec<String> = qbo::FILE_HEADER.lines().map(String::from).collect();
    lines.push(format!("<DTSERVER>{file_date}120000[-6:CST]"));
    lines.extend(qbo::identity_section(bank).lines().map(String::from));
    lines.push(format!("<DTSTART>{start_date}"));
    lines.push(format!("<DTEND>{file_date}"));
    for row in &rows {
        statement_block(row, filter, &mut lines)?;
    }
    lines.extend(qbo::trailer_section(&file_date).lines().map(String::from));

    Ok(ConvertedStatement {
        lines,
        header: FileHeader {
            file_date,
            account_number: bank.account_id.clone(),
        },
    })
}

fn parse_row(record: &csv::StringRecord) -> Result<PostedRow, ConvertError> {
    if record.len() < 7 {
        return Err(ConvertError::ShortRow {
            found: record.len(),
        });
    }
    let field = |i: usize| record.get(i).unwrap_or("").trim().to_string();
    Ok(PostedRow {
        date: parse_date(&field(0))?,
        kind: field(1),
        check_number: field(2),
        description: field(3),
        withdrawal: field(4),
        deposit: field(5),
        running_balance: field(6),
    })
}

fn statement_block(
    row: &PostedRow,
    filter: &NoiseFilter,
    out: &mut Vec<String>,
) -> Result<(), ConvertError> {
    let is_check = row.kind == "CHECK";
    let (trntype, amount) = if is_check {
        ("CHECK", -parse_amount(&row.withdrawal)?)
    } else if !row.deposit.is_empty() {
        ("CREDIT", parse_amount(&row.deposit)?)
    } else {
        ("DEBIT", -parse_amount(&row.withdrawal)?)
    };

    let date = qbo_date(row.date);
    let description = filter.clean(&row.description);
    let fit_id = fit_id(&date, &amount, &row.running_balance, &description);

    out.push("<STMTTRN>".to_string());
    out.push(format!("<TRNTYPE>{trntype}"));
    out.push(format!("<DTPOSTED>{date}"));
    out.push(format!("<TRNAMT>{amount}"));
    out.push(format!("<FITID>{fit_id}"));
    if is_check {
        out.push(format!("<CHECKNUM>{}", row.check_number));
    }
    out.push(format!("<NAME>{}", truncate(&description, NAME_LIMIT)));
    out.push(format!("<MEMO>{description}"));
    out.push("</STMTTRN>".to_string());
    Ok(())
}

/// Transaction id the importer uses for duplicate detection. The bank's
/// running balance is the only per-row datum unique within a business day;
/// hashing it keeps the id repeatable across overlapping downloads while
/// hiding the balance itself.
fn fit_id(date: &str, amount: &Decimal, running_balance: &str, description: &str) -> String {
    let digest = Sha256::digest(running_balance.as_bytes());
    let short: String = digest[..4].iter().map(|b| format!("{b:02x}")).collect();
    truncate(&format!("{date}{amount}{short}{description}"), FITID_LIMIT)
}

fn qbo_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn parse_date(field: &str) -> Result<NaiveDate, ConvertError> {
    const FORMATS: [&str; 4] = ["%m/%d/%Y", "%m/%d/%y", "%Y-%m-%d", "%Y%m%d"];
    FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(field, f).ok())
        .ok_or_else(|| ConvertError::InvalidDate(field.to_string()))
}

fn parse_amount(field: &str) -> Result<Decimal, ConvertError> {
    let cleaned = field.trim_start_matches('$').replace(',', "");
    Decimal::from_str(&cleaned).map_err(|_| ConvertError::InvalidAmount(field.to_string()))
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
