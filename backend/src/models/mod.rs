//! Domain models for the ballbyball conversion pipeline.
//!
//! - [`MatchInfo`] - Match-level facts, one per source document
//! - [`DeliveryInfo`] - Ball-level facts, one per delivery bowled
//! - [`Wicket`] - A dismissal recorded on a delivery
//! - [`MatchType`], [`Gender`], [`WinMarginType`], [`TossDecision`] - Enumerated fields
//! - [`FlatRecord`] - The merged, validated output unit

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One output row: every match and delivery field keyed by name.
pub type FlatRecord = Map<String, Value>;

/// Balls in an over when the document does not say otherwise.
pub const DEFAULT_BALLS_PER_OVER: u32 = 6;

// =============================================================================
// Match Type
// =============================================================================

/// Format of the match.
///
/// Serialized as the source code string (`"T20"`, `"ODI"`, `"Test"`);
/// formats without a dedicated variant keep their original code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MatchType {
    T20,
    Odi,
    Test,
    Other(String),
}

impl MatchType {
    /// Parse a match type from its source code.
    pub fn from_code(code: &str) -> Self {
        match code {
            "T20" => Self::T20,
            "ODI" => Self::Odi,
            "Test" => Self::Test,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::T20 => "T20",
            Self::Odi => "ODI",
            Self::Test => "Test",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for MatchType {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<MatchType> for String {
    fn from(match_type: MatchType) -> Self {
        match match_type {
            MatchType::Other(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

// =============================================================================
// Small Enumerations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Men,
    Women,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Men => "men",
            Self::Women => "women",
        }
    }
}

/// Unit of a winning margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinMarginType {
    Runs,
    Wickets,
}

impl WinMarginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Runs => "runs",
            Self::Wickets => "wickets",
        }
    }
}

/// What the toss winner chose to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TossDecision {
    Bat,
    Field,
}

impl TossDecision {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "bat" => Some(Self::Bat),
            "field" => Some(Self::Field),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bat => "bat",
            Self::Field => "field",
        }
    }
}

// =============================================================================
// Match Info
// =============================================================================

/// Match-level facts shared by every delivery of a document.
///
/// Built once from the document's `info` section and never mutated afterwards;
/// the traversal hands out `&MatchInfo` to every delivery it produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchInfo {
    /// First day of play (`YYYY-MM-DD`).
    pub match_date: String,
    pub match_type: MatchType,
    pub venue: String,
    pub city: String,
    /// Both team names, in source order.
    pub teams: Vec<String>,
    pub winner: Option<String>,
    /// Present together with `win_margin_type`, or not at all.
    pub win_margin: Option<u32>,
    pub win_margin_type: Option<WinMarginType>,
    pub toss_winner: Option<String>,
    pub toss_decision: Option<TossDecision>,
    pub balls_per_over: u32,
    pub gender: Gender,
    /// Raw event metadata, passed through untouched.
    pub event: Map<String, Value>,
}

impl MatchInfo {
    /// The team that is not `team`, if `team` played this match.
    pub fn opponent_of(&self, team: &str) -> Option<&str> {
        if !self.teams.iter().any(|t| t == team) {
            return None;
        }
        self.teams.iter().map(String::as_str).find(|t| *t != team)
    }
}

// =============================================================================
// Delivery Info
// =============================================================================

/// A dismissal recorded on a delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wicket {
    pub kind: String,
    pub player_out: String,
    /// Fielders involved, in source order.
    #[serde(default)]
    pub fielders: Vec<String>,
}

/// Ball-level facts for one delivery, legal or not.
///
/// Extras categories and wickets are kept in full; the flat record only
/// reports the first of each (see [`DeliveryInfo::extras_type`] and
/// [`DeliveryInfo::primary_wicket`]).
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryInfo {
    pub innings_number: u32,
    pub batting_team: String,
    pub bowling_team: String,
    /// Zero-based over index.
    pub over_number: u32,
    /// One-based legal-ball slot within the over.
    pub ball_number: u32,
    pub batter: String,
    pub non_striker: String,
    pub bowler: String,
    pub runs_batter: u32,
    pub runs_extras: u32,
    pub runs_total: u32,
    /// Extras category keys, in source order.
    pub extras: Vec<String>,
    pub wickets: Vec<Wicket>,
}

impl DeliveryInfo {
    /// The reported extras category: the first key of the source mapping.
    pub fn extras_type(&self) -> Option<&str> {
        self.extras.first().map(String::as_str)
    }

    /// The reported dismissal: the first entry of the source sequence.
    pub fn primary_wicket(&self) -> Option<&Wicket> {
        self.wickets.first()
    }
}
