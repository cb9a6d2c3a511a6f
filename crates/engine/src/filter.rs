use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single removal rule. Literal rules delete every occurrence of the
/// substring; pattern rules substitute every regex match with nothing.
#[derive(Debug, Clone)]
pub enum NoiseRule {
    Literal(String),
    Pattern(Regex),
}

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("invalid noise pattern `{pattern}`: {source}")]
    BadPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Serialized form of one removal rule as it appears in the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RuleSpec {
    Literal { literal: String },
    Pattern { pattern: String },
}

/// A phrase rewritten rather than removed, e.g. `BILL PAYMT` → `Bill Pay`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterConfig {
    #[serde(default = "default_rules")]
    pub remove: Vec<RuleSpec>,
    #[serde(default = "default_replacements")]
    pub replace: Vec<Replacement>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            remove: default_rules(),
            replace: default_replacements(),
        }
    }
}

/// Boilerplate the bank injects into memo text. Order is load-bearing: the
/// more specific `POS DB ` must run before `POS `, and the `DEBIT nnnn`
/// pattern before the bare `DEBIT` literal.
fn default_rules() -> Vec<RuleSpec> {
    let patterns = [r"DEBIT +\d{4}"];
    let literals = [
        "CKCD ",
        "AC-",
        "POS DB ",
        "POS ",
        "-ONLINE",
        "-ACH",
        "DEBIT",
        "CREDIT",
        "ACH",
        "MISCELLANEOUS",
        "PREAUTHORIZED",
        "PURCHASE TERMINAL",
        "ATM MERCHANT",
        "AUTOMATIC TRANSFER",
    ];
    patterns
        .iter()
        .map(|p| RuleSpec::Pattern {
            pattern: p.to_string(),
        })
        .chain(literals.iter().map(|l| RuleSpec::Literal {
            literal: l.to_string(),
        }))
        .collect()
}

fn default_replacements() -> Vec<Replacement> {
    vec![Replacement {
        from: "BILL PAYMT".to_string(),
        to: "Bill Pay".to_string(),
    }]
}

/// Removes configured boilerplate from descriptive text, then normalizes
/// whitespace. Rules run in configured order; the filter never invents
/// content (an empty result is the caller's problem).
pub struct NoiseFilter {
    rules: Vec<NoiseRule>,
    replacements: Vec<Replacement>,
    collapse: Regex,
}

impl NoiseFilter {
    pub fn new(rules: Vec<NoiseRule>, replacements: Vec<Replacement>) -> Self {
        // Infallible: the collapse pattern is a constant.
        let collapse = Regex::new(" {2,}").unwrap();
        Self {
            rules,
            replacements,
            collapse,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        let rules = config
            .remove
            .iter()
            .map(|spec| match spec {
                RuleSpec::Literal { literal } => Ok(NoiseRule::Literal(literal.clone())),
                RuleSpec::Pattern { pattern } => Regex::new(pattern)
                    .map(NoiseRule::Pattern)
                    .map_err(|source| FilterError::BadPattern {
                        pattern: pattern.clone(),
                        source,
                    }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules, config.replace.clone()))
    }

    /// Apply every rule in order, then collapse space runs and trim.
    /// Idempotent once a full pass has run.
    pub fn clean(&self, text: &str) -> String {
        let mut text = text.to_string();
        for rule in &self.rules {
            match rule {
                NoiseRule::Literal(noise) => text = text.replace(noise, ""),
                NoiseRule::Pattern(re) => text = re.replace_all(&text, "").into_owned(),
            }
        }
        for rep in &self.replacements {
            text = text.replace(&rep.from, &rep.to);
        }
        let text = self.collapse.replace_all(&text, " ");
        text.trim().to_string()
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        // The default rule set contains only valid patterns.
        Self::from_config(&FilterConfig::default()).unwrap()
    }
}
