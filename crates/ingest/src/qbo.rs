use serde::{Deserialize, Serialize};

/// Bank identity embedded in generated statements. The defaults match the
/// FundsXpress signon block the bank's own QBO downloads carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BankProfile {
    pub org: String,
    pub fid: String,
    pub intu_bid: String,
    pub bank_id: String,
    pub account_id: String,
    pub account_type: String,
    pub currency: String,
}

impl Default for BankProfile {
    fn default() -> Self {
        Self {
            org: "FundsXpress, Inc".to_string(),
            fid: "19953".to_string(),
            intu_bid: "19953".to_string(),
            bank_id: "121202211".to_string(),
            account_id: "440024090258".to_string(),
            account_type: "CHECKING".to_string(),
            currency: "USD".to_string(),
        }
    }
}

/// Fixed signon preamble every generated file starts with.
pub const FILE_HEADER: &str = "\
OFXHEADER:100
DATA:OFXSGML
VERSION:102
SECURITY:NONE
ENCODING:USASCII
CHARSET:1252
COMPRESSION:NONE
OLDFILEUID:NONE
NEWFILEUID:NONE
<OFX>
<SIGNONMSGSRSV1>
<SONRS>
<STATUS>
<CODE>0
<SEVERITY>INFO
</STATUS>";

/// Signon tail and statement-response opening, through `<BANKTRANLIST>`.
pub fn identity_section(bank: &BankProfile) -> String {
    format!(
        "\
<LANGUAGE>ENG
<FI>
<ORG>{org}
<FID>{fid}
</FI>
<INTU.BID>{intu_bid}
</SONRS>
</SIGNONMSGSRSV1>
<BANKMSGSRSV1>
<STMTTRNRS>
<TRNUID>0
<STATUS>
<CODE>0
<SEVERITY>INFO
</STATUS>
<STMTRS>
<CURDEF>{currency}
<BANKACCTFROM>
<BANKID>{bank_id}
<ACCTID>{account_id}
<ACCTTYPE>{account_type}
</BANKACCTFROM>
<BANKTRANLIST>",
        org = bank.org,
        fid = bank.fid,
        intu_bid = bank.intu_bid,
        currency = bank.currency,
        bank_id = bank.bank_id,
        account_id = bank.account_id,
        account_type = bank.account_type,
    )
}

/// Ledger/available balance trailer closing the statement. Balances are
/// zeroed: the importer ignores them and the export does not carry a
/// statement-level balance.
pub fn trailer_section(file_date: &str) -> String {
    format!(
        "\
</BANKTRANLIST>
<LEDGERBAL>
<BALAMT>0
<DTASOF>{file_date}000000.000[-6:CST]
</LEDGERBAL>
<AVAILBAL>
<BALAMT>0
<DTASOF>{file_date}000000.000[-6:CST]
</AVAILBAL>
</STMTRS>
</STMTTRNRS>
</BANKMSGSRSV1>
</OFX>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_section_embeds_profile() {
        let section = identity_section(&BankProfile::default());
        assert!(section.contains("<ORG>FundsXpress, Inc"));
        assert!(section.contains("<ACCTID>440024090258"));
        assert!(section.ends_with("<BANKTRANLIST>"));
    }

    #[test]
    fn trailer_uses_file_date() {
        let trailer = trailer_section("20240131");
        assert!(trailer.contains("<DTASOF>20240131000000.000[-6:CST]"));
        assert!(trailer.ends_with("</OFX>"));
    }
}
