//! Merge match and delivery facts into one flat record, then validate it.
//!
//! # Checks
//!
//! | Check | Failure |
//! |-------|---------|
//! | every [`REQUIRED_FIELDS`] key present | [`InvariantError::MissingFields`] |
//! | each required field has its [`FieldKind`] | [`InvariantError::TypeMismatch`] |
//! | `runs_total == runs_batter + runs_extras` | [`InvariantError::RunsMismatch`] |
//! | `over_number >= 0` | [`InvariantError::NegativeOver`] |
//! | `1 <= ball_number <= balls_per_over` | [`InvariantError::BallOutOfRange`] |
//! | `innings_number >= 1` | [`InvariantError::InvalidInnings`] |
//! | player identifiers non-empty | [`InvariantError::EmptyField`] |
//!
//! After the checks the record is normalized: `extras_type` is cleared when no
//! extras were scored, and the wicket detail fields are cleared when there is
//! no `wicket_type`.

use serde_json::Value;

use crate::error::{InvariantError, InvariantResult};
use crate::models::{DeliveryInfo, FlatRecord, MatchInfo, DEFAULT_BALLS_PER_OVER};

/// Kind of value a required field must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    List,
    Object,
}

impl FieldKind {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Text => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::List => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Text => "a string",
            Self::Integer => "an integer",
            Self::List => "a list",
            Self::Object => "an object",
        }
    }
}

/// Fields every output record must carry, with their kinds.
pub const REQUIRED_FIELDS: &[(&str, FieldKind)] = &[
    ("match_date", FieldKind::Text),
    ("match_type", FieldKind::Text),
    ("venue", FieldKind::Text),
    ("city", FieldKind::Text),
    ("teams", FieldKind::List),
    ("gender", FieldKind::Text),
    ("event", FieldKind::Object),
    ("innings_number", FieldKind::Integer),
    ("batting_team", FieldKind::Text),
    ("bowling_team", FieldKind::Text),
    ("over_number", FieldKind::Integer),
    ("ball_number", FieldKind::Integer),
    ("batter", FieldKind::Text),
    ("non_striker", FieldKind::Text),
    ("bowler", FieldKind::Text),
    ("runs_batter", FieldKind::Integer),
    ("runs_extras", FieldKind::Integer),
    ("runs_total", FieldKind::Integer),
];

/// Fields that are always present in output but may be null.
pub const OPTIONAL_FIELDS: &[&str] = &[
    "winner",
    "win_margin",
    "win_margin_type",
    "toss_winner",
    "toss_decision",
    "balls_per_over",
    "extras_type",
    "wicket_type",
    "wicket_player_out",
    "wicket_fielders",
];

const PLAYER_FIELDS: [&str; 3] = ["batter", "non_striker", "bowler"];

/// Build the validated flat record for one delivery.
pub fn transform_record(
    match_info: &MatchInfo,
    delivery: &DeliveryInfo,
) -> InvariantResult<FlatRecord> {
    let mut record = match_fields(match_info);
    // delivery facts win on collision; there are none today
    record.extend(delivery_fields(delivery));
    validate_record(record)
}

/// Run every check on a flat record and return it normalized.
pub fn validate_record(mut record: FlatRecord) -> InvariantResult<FlatRecord> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|(name, _)| !record.contains_key(*name))
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(InvariantError::MissingFields(missing));
    }

    for (name, kind) in REQUIRED_FIELDS {
        if !kind.matches(&record[*name]) {
            return Err(InvariantError::TypeMismatch {
                field: name.to_string(),
                expected: kind.describe(),
            });
        }
    }

    let batter = integer(&record, "runs_batter")?;
    let extras = integer(&record, "runs_extras")?;
    let total = integer(&record, "runs_total")?;
    if total != batter + extras {
        return Err(InvariantError::RunsMismatch { batter, extras, total });
    }

    let over = integer(&record, "over_number")?;
    if over < 0 {
        return Err(InvariantError::NegativeOver(over));
    }

    let balls_per_over = record
        .get("balls_per_over")
        .and_then(Value::as_i64)
        .unwrap_or(i64::from(DEFAULT_BALLS_PER_OVER));
    let ball = integer(&record, "ball_number")?;
    if !(1..=balls_per_over).contains(&ball) {
        return Err(InvariantError::BallOutOfRange { ball, balls_per_over });
    }

    let innings = integer(&record, "innings_number")?;
    if innings < 1 {
        return Err(InvariantError::InvalidInnings(innings));
    }

    for field in PLAYER_FIELDS {
        if record[field].as_str().is_some_and(str::is_empty) {
            return Err(InvariantError::EmptyField(field.to_string()));
        }
    }

    normalize(&mut record, extras);
    Ok(record)
}

fn normalize(record: &mut FlatRecord, runs_extras: i64) {
    if runs_extras == 0 {
        record.insert("extras_type".into(), Value::Null);
    }

    let no_wicket = record.get("wicket_type").map_or(true, Value::is_null);
    if no_wicket {
        record.insert("wicket_player_out".into(), Value::Null);
        record.insert("wicket_fielders".into(), Value::Array(Vec::new()));
    }
}

fn integer(record: &FlatRecord, field: &str) -> InvariantResult<i64> {
    record
        .get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| InvariantError::TypeMismatch {
            field: field.to_string(),
            expected: FieldKind::Integer.describe(),
        })
}

fn text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, Value::from)
}

fn match_fields(info: &MatchInfo) -> FlatRecord {
    let mut obj = FlatRecord::new();
    obj.insert("match_date".into(), Value::from(info.match_date.as_str()));
    obj.insert("match_type".into(), Value::from(info.match_type.as_str()));
    obj.insert("venue".into(), Value::from(info.venue.as_str()));
    obj.insert("city".into(), Value::from(info.city.as_str()));
    obj.insert("teams".into(), Value::from(info.teams.clone()));
    obj.insert("winner".into(), text(info.winner.as_deref()));
    obj.insert("win_margin".into(), info.win_margin.map_or(Value::Null, Value::from));
    obj.insert(
        "win_margin_type".into(),
        text(info.win_margin_type.map(|t| t.as_str())),
    );
    obj.insert("toss_winner".into(), text(info.toss_winner.as_deref()));
    obj.insert(
        "toss_decision".into(),
        text(info.toss_decision.map(|d| d.as_str())),
    );
    obj.insert("balls_per_over".into(), Value::from(info.balls_per_over));
    obj.insert("gender".into(), Value::from(info.gender.as_str()));
    obj.insert("event".into(), Value::Object(info.event.clone()));
    obj
}

fn delivery_fields(delivery: &DeliveryInfo) -> FlatRecord {
    let wicket = delivery.primary_wicket();

    let mut obj = FlatRecord::new();
    obj.insert("innings_number".into(), Value::from(delivery.innings_number));
    obj.insert("batting_team".into(), Value::from(delivery.batting_team.as_str()));
    obj.insert("bowling_team".into(), Value::from(delivery.bowling_team.as_str()));
    obj.insert("over_number".into(), Value::from(delivery.over_number));
    obj.insert("ball_number".into(), Value::from(delivery.ball_number));
    obj.insert("batter".into(), Value::from(delivery.batter.as_str()));
    obj.insert("non_striker".into(), Value::from(delivery.non_striker.as_str()));
    obj.insert("bowler".into(), Value::from(delivery.bowler.as_str()));
    obj.insert("runs_batter".into(), Value::from(delivery.runs_batter));
    obj.insert("runs_extras".into(), Value::from(delivery.runs_extras));
    obj.insert("runs_total".into(), Value::from(delivery.runs_total));
    obj.insert("extras_type".into(), text(delivery.extras_type()));
    obj.insert("wicket_type".into(), text(wicket.map(|w| w.kind.as_str())));
    obj.insert(
        "wicket_player_out".into(),
        text(wicket.map(|w| w.player_out.as_str())),
    );
    obj.insert(
        "wicket_fielders".into(),
        Value::from(wicket.map(|w| w.fielders.clone()).unwrap_or_default()),
    );
    obj
}
