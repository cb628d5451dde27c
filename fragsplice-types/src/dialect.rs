use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source language of the generated byte-array declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    Rust,
    C,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Rust => "rust",
            Dialect::C => "c",
        })
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rust" | "rs" => Ok(Dialect::Rust),
            "c" => Ok(Dialect::C),
            other => Err(format!("unknown dialect '{other}' (expected rust or c)")),
        }
    }
}
