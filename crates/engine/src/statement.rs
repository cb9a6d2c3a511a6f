use thiserror::Error;

use crate::filter::NoiseFilter;
use crate::record::TaggedRecord;
use crate::transform::transform_transaction;

pub const TRANSACTION_START: &str = "<STMTTRN>";
pub const TRANSACTION_END: &str = "</STMTTRN>";

const DATE_TAG: &str = "DTEND";
const ACCOUNT_TAG: &str = "ACCTID";

/// File-scoped fields captured while scanning, used only to name the output
/// artifact. Tags may repeat; the last occurrence wins.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub file_date: String,
    pub account_number: String,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            file_date: "nodate".to_string(),
            account_number: "nonumber".to_string(),
        }
    }
}

impl FileHeader {
    /// `{file_date}_{account_number}{extension}` — sentinels embed in the
    /// name rather than failing when the tags were never seen.
    pub fn output_filename(&self, extension: &str) -> String {
        format!("{}_{}{}", self.file_date, self.account_number, extension)
    }
}

#[derive(Error, Debug)]
pub enum RepairError {
    #[error("transaction block opened at line {start_line} is never closed")]
    UnterminatedBlock { start_line: usize },
}

#[derive(Debug)]
pub struct RepairedStatement {
    pub lines: Vec<String>,
    pub header: FileHeader,
}

/// Single pass over the statement: capture the header fields, pass
/// non-transaction lines through byte-for-byte, and run every
/// `<STMTTRN>`…`</STMTTRN>` block through the transaction transform.
///
/// Input exhausted mid-block is malformed input, reported with the block's
/// 1-based start line.
pub fn repair_statement<'a, I>(
    lines: I,
    filter: &NoiseFilter,
) -> Result<RepairedStatement, RepairError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = Vec::new();
    let mut header = FileHeader::default();
    let mut block: Option<Block<'a>> = None;

    for (idx, line) in lines.into_iter().enumerate() {
        let trimmed = line.trim();

        if let Some(value) = tag_value(trimmed, DATE_TAG) {
            header.file_date = value;
        } else if let Some(value) = tag_value(trimmed, ACCOUNT_TAG) {
            header.account_number = value;
        }

        match block.take() {
            None => {
                if trimmed.starts_with(TRANSACTION_START) {
                    block = Some(Block {
                        start_line: idx + 1,
                        start_marker: line,
                        inner: Vec::new(),
                    });
                } else {
                    out.push(line.to_string());
                }
            }
            Some(mut current) => {
                if trimmed.starts_with(TRANSACTION_END) {
                    let record = transform_transaction(
                        TaggedRecord::from_lines(current.inner.iter().copied()),
                        filter,
                    );
                    out.push(current.start_marker.to_string());
                    out.extend(record.to_lines());
                    out.push(line.to_string());
                } else {
                    current.inner.push(line);
                    block = Some(current);
                }
            }
        }
    }

    if let Some(current) = block {
        return Err(RepairError::UnterminatedBlock {
            start_line: current.start_line,
        });
    }

    Ok(RepairedStatement { lines: out, header })
}

struct Block<'a> {
    start_line: usize,
    start_marker: &'a str,
    inner: Vec<&'a str>,
}

/// Value of `<TAG>` at the start of `line`, with any closing tag stripped.
fn tag_value(line: &str, tag: &str) -> Option<String> {
    let rest = line.strip_prefix(&format!("<{tag}>"))?;
    let rest = rest.strip_suffix(&format!("</{tag}>")).unwrap_or(rest);
    Some(rest.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
OFXHEADER:100
DATA:OFXSGML
<OFX>
<SONRS>
<DTSERVER>20240131120000
</SONRS>
<CURDEF>USD
<BANKACCTFROM>
<BANKID>121202211
<ACCTID>440024090258
</BANKACCTFROM>
<BANKTRANLIST>
<DTSTART>20240101
<DTEND>20240131
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20240115
<TRNAMT>-49.99
<FITID>TXN001
<NAME>7734
<MEMO>CKCD POS DB GROCERY OUTLET
</STMTTRN>
<STMTTRN>
<TRNTYPE>CHECK
<DTPOSTED>20240120
<TRNAMT>-120.00
<FITID>TXN002
<CHECKNUM>1041
<REFNUM>900112
<NAME>CHECK PAID
<MEMO>CHECK PAID
</STMTTRN>
</BANKTRANLIST>
</OFX>";

    fn repair(input: &str) -> RepairedStatement {
        repair_statement(input.lines(), &NoiseFilter::default()).unwrap()
    }

    #[test]
    fn captures_header_fields() {
        let repaired = repair(SAMPLE);
        assert_eq!(repaired.header.file_date, "20240131");
        assert_eq!(repaired.header.account_number, "440024090258");
    }

    #[test]
    fn header_defaults_when_tags_absent() {
        let repaired = repair("OFXHEADER:100\n<OFX>\n</OFX>");
        assert_eq!(repaired.header, FileHeader::default());
        assert_eq!(
            repaired.header.output_filename(".qbo"),
            "nodate_nonumber.qbo"
        );
    }

    #[test]
    fn repeated_header_tag_last_occurrence_wins() {
        let repaired = repair("<DTEND>20240101\n<DTEND>20240228</DTEND>");
        assert_eq!(repaired.header.file_date, "20240228");
    }

    #[test]
    fn output_filename_from_header() {
        let repaired = repair(SAMPLE);
        assert_eq!(
            repaired.header.output_filename(".qbo"),
            "20240131_440024090258.qbo"
        );
    }

    #[test]
    fn lines_outside_blocks_pass_through_verbatim() {
        let repaired = repair(SAMPLE);
        for line in [
            "OFXHEADER:100",
            "DATA:OFXSGML",
            "<BANKID>121202211",
            "</BANKTRANLIST>",
            "</OFX>",
        ] {
            assert!(
                repaired.lines.iter().any(|l| l == line),
                "missing pass-through line {line:?}"
            );
        }
    }

    #[test]
    fn transforms_every_block() {
        let repaired = repair(SAMPLE);
        let starts = repaired
            .lines
            .iter()
            .filter(|l| l.trim() == TRANSACTION_START)
            .count();
        let ends = repaired
            .lines
            .iter()
            .filter(|l| l.trim() == TRANSACTION_END)
            .count();
        assert_eq!(starts, 2);
        assert_eq!(ends, 2);
        assert!(repaired.lines.contains(&"<NAME>GROCERY OUTLET".to_string()));
        assert!(repaired.lines.contains(&"<MEMO>7734".to_string()));
        // Second block hit the CHECK PAID collision.
        assert!(repaired.lines.contains(&"<NAME>1041".to_string()));
        assert!(repaired.lines.contains(&"<MEMO>900112".to_string()));
    }

    #[test]
    fn block_line_count_is_preserved() {
        let repaired = repair(SAMPLE);
        assert_eq!(repaired.lines.len(), SAMPLE.lines().count());
    }

    #[test]
    fn unterminated_block_is_a_structural_error() {
        let input = "<OFX>\n<STMTTRN>\n<TRNAMT>-1.00\n";
        let err = repair_statement(input.lines(), &NoiseFilter::default()).unwrap_err();
        assert!(matches!(
            err,
            RepairError::UnterminatedBlock { start_line: 2 }
        ));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let repaired = repair("");
        assert!(repaired.lines.is_empty());
        assert_eq!(repaired.header, FileHeader::default());
    }
}
