use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One leg of the pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pomodoro,
    ShortBreak,
    LongBreak,
    ActiveRecall,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Pomodoro,
        Phase::ShortBreak,
        Phase::LongBreak,
        Phase::ActiveRecall,
    ];

    pub fn is_break(&self) -> bool {
        matches!(self, Phase::ShortBreak | Phase::LongBreak)
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Pomodoro => "Pomodoro",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
            Phase::ActiveRecall => "Active Recall",
        }
    }

    /// Stable identifier used in storage rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Pomodoro => "pomodoro",
            Phase::ShortBreak => "short_break",
            Phase::LongBreak => "long_break",
            Phase::ActiveRecall => "active_recall",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown phase: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_storage_identifiers() {
        for phase in Phase::ALL {
            assert_eq!(phase.as_str().parse::<Phase>().unwrap(), phase);
        }
        assert!("focus".parse::<Phase>().is_err());
    }

    #[test]
    fn only_short_and_long_are_breaks() {
        assert!(Phase::ShortBreak.is_break());
        assert!(Phase::LongBreak.is_break());
        assert!(!Phase::Pomodoro.is_break());
        assert!(!Phase::ActiveRecall.is_break());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Phase::ActiveRecall).unwrap();
        assert_eq!(json, "\"active_recall\"");
    }
}
