//! Estimate card catalog.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// A card a player can lay down.
///
/// Variants are declared in catalog order, so the derived `Ord` sorts cards the
/// way they are shown on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EstimateOption {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "0.5")]
    Half,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "13")]
    Thirteen,
    #[serde(rename = "20")]
    Twenty,
    #[serde(rename = "40")]
    Forty,
    #[serde(rename = "100")]
    Hundred,
    #[serde(rename = "?")]
    Unsure,
    #[serde(rename = "☕")]
    Break,
}

impl EstimateOption {
    /// Every card, in catalog order.
    pub const ALL: [EstimateOption; 13] = [
        Self::Zero,
        Self::Half,
        Self::One,
        Self::Two,
        Self::Three,
        Self::Five,
        Self::Eight,
        Self::Thirteen,
        Self::Twenty,
        Self::Forty,
        Self::Hundred,
        Self::Unsure,
        Self::Break,
    ];

    /// The card face as stored and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::Half => "0.5",
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::Five => "5",
            Self::Eight => "8",
            Self::Thirteen => "13",
            Self::Twenty => "20",
            Self::Forty => "40",
            Self::Hundred => "100",
            Self::Unsure => "?",
            Self::Break => "☕",
        }
    }
}

impl fmt::Display for EstimateOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the catalog cards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown estimate card: {0}")]
pub struct UnknownEstimate(pub String);

impl FromStr for EstimateOption {
    type Err = UnknownEstimate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let card = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|option| option.as_str() == card)
            .ok_or_else(|| UnknownEstimate(s.to_string()))
    }
}
