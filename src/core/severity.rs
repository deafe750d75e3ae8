use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

/// Impact of an incident. Declaration order is the listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::High => "Alto",
            Severity::Medium => "Medio",
            Severity::Low => "Bajo",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alto" | "high" => Ok(Severity::High),
            "medio" | "medium" => Ok(Severity::Medium),
            "bajo" | "low" => Ok(Severity::Low),
            _ => Err(ReportError::InvalidSeverity(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spanish_and_english_tokens_case_insensitively() {
        assert_eq!("Alto".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("  MEDIO ".parse::<Severity>().unwrap(), Severity::Medium);
        assert_eq!("bajo".parse::<Severity>().unwrap(), Severity::Low);
        assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("Medium".parse::<Severity>().unwrap(), Severity::Medium);
        assert_eq!("LOW".parse::<Severity>().unwrap(), Severity::Low);
    }

    #[test]
    fn rejects_unknown_tokens() {
        for s in ["", "critico", "urgent", "alta"] {
            assert!(matches!(
                s.parse::<Severity>(),
                Err(ReportError::InvalidSeverity(_))
            ));
        }
    }

    #[test]
    fn ordering_follows_declaration() {
        let mut levels = vec![Severity::Low, Severity::High, Severity::Medium];
        levels.sort();
        assert_eq!(levels, Severity::ALL.to_vec());
    }

    #[test]
    fn display_tokens_are_distinct() {
        let labels: Vec<String> = Severity::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(labels, vec!["Alto", "Medio", "Bajo"]);
    }
}
