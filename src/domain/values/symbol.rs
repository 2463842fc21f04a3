use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_SYMBOL_LEN: usize = 16;

/// An upper-cased ticker symbol. Index tickers such as `^VIX` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: &str) -> Result<Self, String> {
        let s = raw.trim().to_ascii_uppercase();
        if s.is_empty() {
            return Err("Symbol must not be empty".to_string());
        }
        if s.len() > MAX_SYMBOL_LEN {
            return Err(format!(
                "Symbol '{s}' is longer than {MAX_SYMBOL_LEN} characters"
            ));
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
        {
            return Err(format!("Invalid character '{bad}' in symbol '{s}'"));
        }
        Ok(Symbol(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a comma-separated list, dropping blanks and duplicates while
    /// keeping first-seen order.
    pub fn parse_list(raw: &str) -> Result<Vec<Symbol>, String> {
        let mut out: Vec<Symbol> = Vec::new();
        for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
            let sym = Symbol::new(part)?;
            if !out.contains(&sym) {
                out.push(sym);
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Symbol::new(&s)
    }
}

impl From<Symbol> for String {
    fn from(s: Symbol) -> Self {
        s.0
    }
}
