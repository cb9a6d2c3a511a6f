/// One transaction's fields as an ordered tag → value mapping.
///
/// Re-serialization must reproduce the original line order, so entries live
/// in a `Vec` rather than a hash map. Writing to a tag that already exists
/// overwrites the value but keeps the tag's original position (last write
/// wins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaggedRecord {
    entries: Vec<(String, String)>,
}

impl TaggedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract tag/value pairs from raw statement lines.
    ///
    /// Each line splits at the first `>`. Lines that do not start with `<`
    /// or contain no `>` are not tags; they are silently dropped from the
    /// structured view. A matching closing tag on the same line is stripped
    /// from the value — banks emit both open and open/close styles.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut record = Self::new();
        for line in lines {
            let Some(rest) = line.trim().strip_prefix('<') else {
                continue;
            };
            let Some((tag, value)) = rest.split_once('>') else {
                continue;
            };
            let close = format!("</{tag}>");
            let value = value.strip_suffix(close.as_str()).unwrap_or(value);
            record.set(tag, value.trim());
        }
        record
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    /// Set a tag's value. An existing tag is overwritten in place; a new tag
    /// is appended after all existing ones.
    pub fn set(&mut self, tag: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| t == tag) {
            Some((_, v)) => *v = value,
            None => self.entries.push((tag.to_string(), value)),
        }
    }

    /// Serialize back to `<TAG>value` lines in original tag order.
    pub fn to_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(tag, value)| format!("<{tag}>{value}"))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tag_and_value() {
        let record = TaggedRecord::from_lines(["<NAME>ACME CORP", "<TRNAMT>-49.99"]);
        assert_eq!(record.get("NAME"), Some("ACME CORP"));
        assert_eq!(record.get("TRNAMT"), Some("-49.99"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn strips_matching_closing_tag() {
        let record = TaggedRecord::from_lines(["<DTEND>20240131</DTEND>"]);
        assert_eq!(record.get("DTEND"), Some("20240131"));
    }

    #[test]
    fn malformed_lines_are_dropped() {
        let record = TaggedRecord::from_lines([
            "no delimiters at all",
            "NAME>missing open",
            "<NOCLOSE",
            "<NAME>kept",
        ]);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("NAME"), Some("kept"));
    }

    #[test]
    fn repeated_tag_last_write_wins_keeps_position() {
        let record = TaggedRecord::from_lines(["<MEMO>first", "<FITID>123", "<MEMO>second"]);
        assert_eq!(record.get("MEMO"), Some("second"));
        assert_eq!(
            record.to_lines(),
            vec!["<MEMO>second".to_string(), "<FITID>123".to_string()]
        );
    }

    #[test]
    fn set_appends_new_tag_after_existing() {
        let mut record = TaggedRecord::from_lines(["<NAME>ACME"]);
        record.set("MEMO", "No Memo");
        assert_eq!(
            record.to_lines(),
            vec!["<NAME>ACME".to_string(), "<MEMO>No Memo".to_string()]
        );
    }

    #[test]
    fn empty_value_is_preserved() {
        let record = TaggedRecord::from_lines(["<MEMO>"]);
        assert_eq!(record.get("MEMO"), Some(""));
        assert_eq!(record.to_lines(), vec!["<MEMO>".to_string()]);
    }

    #[test]
    fn round_trip_preserves_order() {
        let lines = ["<TRNTYPE>DEBIT", "<DTPOSTED>20240115", "<TRNAMT>-12.00"];
        let record = TaggedRecord::from_lines(lines);
        assert_eq!(record.to_lines(), lines.map(String::from).to_vec());
    }
}
