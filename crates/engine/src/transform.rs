use crate::filter::NoiseFilter;
use crate::record::TaggedRecord;

/// QuickBooks matches transactions on `<NAME>` and caps it at 32 characters.
pub const NAME_LIMIT: usize = 32;

const NAME: &str = "NAME";
const MEMO: &str = "MEMO";
const CHECKNUM: &str = "CHECKNUM";
const REFNUM: &str = "REFNUM";

const CHECK_PAID: &str = "CHECK PAID";

const NO_NAME: &str = "No Name";
const NO_MEMO: &str = "No Memo";
const NO_USEFUL_TEXT: &str = "no useful text";
const NO_CHECKNUM: &str = "No CheckNum";
const NO_REFNUM: &str = "No RefNum";

/// Rewrite one transaction's `<NAME>`/`<MEMO>` fields.
///
/// The bank puts the useful identifying text in the memo and a terse,
/// often useless value in the name, so the two swap roles: the cleaned,
/// truncated memo becomes the name, and the original name (assumed already
/// concise) becomes the memo. Missing fields get sentinel values rather
/// than errors, and a memo that cleans down to nothing gets a placeholder
/// instead of an empty name.
///
/// One recognized collision: when both fields read `CHECK PAID` neither
/// carries information, so the check number and reference number stand in
/// for them instead.
///
/// All other fields pass through unchanged, in their original order.
pub fn transform_transaction(mut record: TaggedRecord, filter: &NoiseFilter) -> TaggedRecord {
    let cleaned_memo = match record.get(MEMO) {
        Some(memo) => {
            let cleaned = filter.clean(memo);
            if cleaned.is_empty() {
                // The filter never invents content; a memo that was all
                // noise gets its placeholder here.
                NO_USEFUL_TEXT.to_string()
            } else {
                truncate(&cleaned, NAME_LIMIT)
            }
        }
        None => NO_MEMO.to_string(),
    };
    let original_name = record.get(NAME).unwrap_or(NO_NAME).to_string();

    if original_name == CHECK_PAID && cleaned_memo == CHECK_PAID {
        let checknum = record.get(CHECKNUM).unwrap_or(NO_CHECKNUM).to_string();
        let refnum = record.get(REFNUM).unwrap_or(NO_REFNUM).to_string();
        record.set(NAME, checknum);
        record.set(MEMO, refnum);
    } else {
        record.set(NAME, cleaned_memo);
        record.set(MEMO, original_name);
    }

    record
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
