//! Diagnostic class labels.
//!
//! Both model families emit positional outputs indexed by [`ClassLabel::ALL`].
//! The order is part of the artifact contract and must never change.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of diagnostic categories.
pub const NUM_CLASSES: usize = 3;

/// One of the three diagnostic categories.
///
/// The derived ordering follows the positional order of model outputs, so a
/// `BTreeMap<ClassLabel, _>` iterates in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassLabel {
    /// Benign finding.
    Benign,
    /// Malignant finding.
    Malignant,
    /// Normal tissue.
    Normal,
}

impl ClassLabel {
    /// All labels in positional output order.
    pub const ALL: [ClassLabel; NUM_CLASSES] =
        [ClassLabel::Benign, ClassLabel::Malignant, ClassLabel::Normal];

    /// Returns the label at the given output position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the output position of this label.
    pub fn index(self) -> usize {
        match self {
            ClassLabel::Benign => 0,
            ClassLabel::Malignant => 1,
            ClassLabel::Normal => 2,
        }
    }

    /// Display name used in responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClassLabel::Benign => "Benign",
            ClassLabel::Malignant => "Malignant",
            ClassLabel::Normal => "Normal",
        }
    }
}

impl std::fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassLabel {
    type Err = String;

    /// Parses a label case-insensitively (`"benign"`, `"Benign"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown class label '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip_follows_output_order() {
        for (i, label) in ClassLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
            assert_eq!(ClassLabel::from_index(i), Some(*label));
        }
        assert_eq!(ClassLabel::from_index(NUM_CLASSES), None);
    }

    #[test]
    fn test_ordering_matches_positions() {
        assert!(ClassLabel::Benign < ClassLabel::Malignant);
        assert!(ClassLabel::Malignant < ClassLabel::Normal);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("malignant".parse::<ClassLabel>(), Ok(ClassLabel::Malignant));
        assert_eq!(" Normal ".parse::<ClassLabel>(), Ok(ClassLabel::Normal));
        assert!("cyst".parse::<ClassLabel>().is_err());
    }

    #[test]
    fn test_serializes_as_display_name() {
        assert_eq!(
            serde_json::to_string(&ClassLabel::Benign).unwrap(),
            "\"Benign\""
        );
    }
}
