//! Innings → overs → deliveries traversal.
//!
//! Turns one [`MatchDocument`] into its flat records, in innings order, then
//! over order, then delivery order. Match facts are extracted once and lent to
//! every delivery; nothing is shared between documents, so documents can be
//! parsed on separate threads.
//!
//! # Ball numbering
//!
//! Within an over `ball_number` starts at 1 and only advances after a legal
//! delivery. Wides and no-balls are re-bowled, so they repeat the slot of the
//! ball that follows them:
//!
//! ```text
//! wide  legal  legal  noball  legal
//!   1     1      2      3       3
//! ```
//!
//! An over holding more legal deliveries than `balls_per_over` aborts the
//! document. The total count including illegal deliveries is not bounded.

pub mod gender;
pub mod match_info;

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{InvariantError, ParseResult, SourceError, SourceResult};
use crate::models::{DeliveryInfo, FlatRecord, MatchInfo, Wicket};
use crate::source::{self, MatchDocument, RawDelivery, RawInnings, RawOver};
use crate::transform::record::transform_record;

pub use gender::{EventNamePattern, GenderClassifier, WomensEventName};
pub use match_info::extract_match_info;

/// Extras keys that make a delivery illegal. `noballs` is the spelling used by
/// cricsheet exports; `noball` is accepted as well.
pub const ILLEGAL_EXTRAS: [&str; 3] = ["wides", "noball", "noballs"];

/// Converts match documents into flat delivery records.
pub struct MatchParser {
    classifier: Box<dyn GenderClassifier>,
}

impl Default for MatchParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchParser {
    /// Parser using the event-name gender heuristic.
    pub fn new() -> Self {
        Self::with_classifier(WomensEventName)
    }

    /// Parser with a custom gender classification.
    pub fn with_classifier(classifier: impl GenderClassifier + 'static) -> Self {
        Self {
            classifier: Box::new(classifier),
        }
    }

    /// Extract the match-level facts of a document.
    pub fn match_info(&self, document: &MatchDocument) -> SourceResult<MatchInfo> {
        extract_match_info(&document.info, self.classifier.as_ref())
    }

    /// Convert a typed document into flat records.
    pub fn parse_document(&self, document: &MatchDocument) -> ParseResult<Vec<FlatRecord>> {
        let match_info = self.match_info(document)?;

        let mut records = Vec::new();
        for (index, innings) in document.innings.iter().enumerate() {
            let innings_number = index as u32 + 1;
            process_innings(innings, innings_number, &match_info, &mut records)?;
        }
        Ok(records)
    }

    /// Convert a JSON value holding a whole document.
    pub fn parse_value(&self, value: Value) -> ParseResult<Vec<FlatRecord>> {
        let document = source::parse_document_value(value)?;
        self.parse_document(&document)
    }

    /// Read and convert one document file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> ParseResult<Vec<FlatRecord>> {
        let document = source::read_document(path)?;
        self.parse_document(&document)
    }

    /// Convert every `*.json` file of a directory, in file-name order.
    pub fn parse_directory<P: AsRef<Path>>(&self, dir: P) -> ParseResult<Vec<FlatRecord>> {
        let mut records = Vec::new();
        for path in json_files(dir.as_ref())? {
            records.extend(self.parse_file(&path)?);
        }
        Ok(records)
    }
}

/// The `*.json` files directly inside `dir`, sorted by name.
pub fn json_files(dir: &Path) -> SourceResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| SourceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == "json"))
        .collect();
    files.sort();
    Ok(files)
}

fn process_innings(
    innings: &RawInnings,
    innings_number: u32,
    match_info: &MatchInfo,
    records: &mut Vec<FlatRecord>,
) -> ParseResult<()> {
    let batting_team = innings.team.as_str();
    let bowling_team = match_info
        .opponent_of(batting_team)
        .ok_or_else(|| SourceError::UnknownTeam {
            team: batting_team.to_string(),
            teams: match_info.teams.clone(),
        })?;

    for over in &innings.overs {
        process_over(over, innings_number, batting_team, bowling_team, match_info, records)?;
    }
    Ok(())
}

fn process_over(
    over: &RawOver,
    innings_number: u32,
    batting_team: &str,
    bowling_team: &str,
    match_info: &MatchInfo,
    records: &mut Vec<FlatRecord>,
) -> ParseResult<()> {
    let limit = match_info.balls_per_over;
    let mut ball_number = 1;
    let mut legal_deliveries = 0;

    for raw in &over.deliveries {
        let legal = is_legal(raw);
        if legal && legal_deliveries == limit {
            return Err(InvariantError::OverOverflow { over: over.over, limit }.into());
        }

        let delivery = DeliveryInfo {
            innings_number,
            batting_team: batting_team.to_string(),
            bowling_team: bowling_team.to_string(),
            over_number: over.over,
            ball_number,
            batter: raw.batter.clone(),
            non_striker: raw.non_striker.clone(),
            bowler: raw.bowler.clone(),
            runs_batter: raw.runs.batter,
            runs_extras: raw.runs.extras,
            runs_total: raw.runs.total,
            extras: extras_of(raw),
            wickets: wickets_of(raw),
        };
        records.push(transform_record(match_info, &delivery)?);

        if legal {
            legal_deliveries += 1;
            ball_number += 1;
        }
    }
    Ok(())
}

/// A delivery is legal unless its extras name a wide or a no-ball.
pub fn is_legal(delivery: &RawDelivery) -> bool {
    match &delivery.extras {
        Some(extras) => !ILLEGAL_EXTRAS.iter().any(|key| extras.contains_key(*key)),
        None => true,
    }
}

fn extras_of(delivery: &RawDelivery) -> Vec<String> {
    delivery
        .extras
        .as_ref()
        .map(|extras| extras.keys().cloned().collect())
        .unwrap_or_default()
}

fn wickets_of(delivery: &RawDelivery) -> Vec<Wicket> {
    delivery
        .wickets
        .iter()
        .flatten()
        .map(|w| Wicket {
            kind: w.kind.clone(),
            player_out: w.player_out.clone(),
            fielders: w
                .fielders
                .iter()
                .flatten()
                .map(|f| f.name.clone())
                .collect(),
        })
        .collect()
}
