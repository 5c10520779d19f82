//! Judge feedback addressed to named researchers.
//!
//! Feedback lives in shared state as plain strings so the store stays
//! schema-free. Each entry is tagged with the round that produced it and the
//! researcher it is addressed to:
//!
//! ```text
//! [round 1][critic] find more about the later years scandals
//! [round 1][both] need more on later years
//! ```
//!
//! Researchers in round `n` only act on entries tagged `n - 1`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::researcher::Polarity;

/// Who a feedback entry is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTarget {
    Admirer,
    Critic,
    Both,
}

impl FeedbackTarget {
    pub fn addresses(self, polarity: Polarity) -> bool {
        match self {
            Self::Both => true,
            Self::Admirer => polarity == Polarity::Positive,
            Self::Critic => polarity == Polarity::Negative,
        }
    }
}

impl std::fmt::Display for FeedbackTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admirer => write!(f, "admirer"),
            Self::Critic => write!(f, "critic"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl FromStr for FeedbackTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admirer" => Ok(Self::Admirer),
            "critic" => Ok(Self::Critic),
            "both" => Ok(Self::Both),
            other => Err(format!("unknown feedback target '{other}'")),
        }
    }
}

/// One judge instruction for the next round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Round in which the judge wrote this.
    pub round: u32,
    pub target: FeedbackTarget,
    pub text: String,
}

impl Feedback {
    pub fn new(round: u32, target: FeedbackTarget, text: impl Into<String>) -> Self {
        Self {
            round,
            target,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[round {}][{}] {}", self.round, self.target, self.text)
    }
}

impl FromStr for Feedback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .trim()
            .strip_prefix("[round ")
            .ok_or_else(|| format!("missing round tag: {s}"))?;
        let (round, rest) = rest
            .split_once("][")
            .ok_or_else(|| format!("missing target tag: {s}"))?;
        let (target, text) = rest
            .split_once(']')
            .ok_or_else(|| format!("unterminated target tag: {s}"))?;

        Ok(Self {
            round: round
                .trim()
                .parse()
                .map_err(|e| format!("bad round '{round}': {e}"))?,
            target: target.parse()?,
            text: text.trim().to_string(),
        })
    }
}

/// Feedback texts from `round` addressed to `polarity`, in order.
///
/// Entries that do not parse are ignored: they cannot be attributed to a
/// round or a researcher.
pub fn feedback_for(entries: &[String], round: u32, polarity: Polarity) -> Vec<String> {
    entries
        .iter()
        .filter_map(|raw| raw.parse::<Feedback>().ok())
        .filter(|fb| fb.round == round && fb.target.addresses(polarity))
        .map(|fb| fb.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_agree() {
        let fb = Feedback::new(2, FeedbackTarget::Critic, "find more about later scandals");
        let encoded = fb.to_string();
        assert_eq!(encoded, "[round 2][critic] find more about later scandals");
        assert_eq!(encoded.parse::<Feedback>().unwrap(), fb);
    }

    #[test]
    fn parse_rejects_untagged_text() {
        assert!("need more on later years".parse::<Feedback>().is_err());
        assert!("[round x][both] hi".parse::<Feedback>().is_err());
        assert!("[round 1][jury] hi".parse::<Feedback>().is_err());
    }

    #[test]
    fn both_addresses_each_side() {
        assert!(FeedbackTarget::Both.addresses(Polarity::Positive));
        assert!(FeedbackTarget::Both.addresses(Polarity::Negative));
        assert!(FeedbackTarget::Admirer.addresses(Polarity::Positive));
        assert!(!FeedbackTarget::Admirer.addresses(Polarity::Negative));
        assert!(!FeedbackTarget::Critic.addresses(Polarity::Positive));
    }

    #[test]
    fn feedback_for_filters_round_and_target() {
        let entries = vec![
            "[round 1][admirer] early life".to_string(),
            "[round 2][critic] later scandals".to_string(),
            "[round 2][both] more dates".to_string(),
            "free text without tags".to_string(),
        ];
        assert_eq!(
            feedback_for(&entries, 2, Polarity::Negative),
            vec!["later scandals".to_string(), "more dates".to_string()]
        );
        assert_eq!(
            feedback_for(&entries, 2, Polarity::Positive),
            vec!["more dates".to_string()]
        );
        assert!(feedback_for(&entries, 0, Polarity::Positive).is_empty());
    }
}
