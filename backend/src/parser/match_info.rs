//! Match-level fact extraction from a document's `info` section.

use serde_json::{Map, Value};

use super::gender::GenderClassifier;
use crate::error::{SourceError, SourceResult};
use crate::models::{
    MatchInfo, MatchType, TossDecision, WinMarginType, DEFAULT_BALLS_PER_OVER,
};
use crate::source::{RawInfo, RawOutcome, RawToss};

/// Build the [`MatchInfo`] shared by every delivery of a document.
///
/// Missing required keys are already rejected by deserialization; this adds the
/// checks serde cannot express (non-empty dates, exactly two teams, a positive
/// over length, known toss decisions, integer margins).
pub fn extract_match_info(
    info: &RawInfo,
    classifier: &dyn GenderClassifier,
) -> SourceResult<MatchInfo> {
    let match_date = info
        .dates
        .first()
        .cloned()
        .ok_or_else(|| invalid("dates", "at least one date is required"))?;

    if info.teams.len() != 2 {
        return Err(invalid(
            "teams",
            format!("expected exactly two teams, found {}", info.teams.len()),
        ));
    }

    let (winner, win_margin, win_margin_type) = match &info.outcome {
        Some(outcome) => extract_outcome(outcome)?,
        None => (None, None, None),
    };

    let (toss_winner, toss_decision) = match &info.toss {
        Some(toss) => extract_toss(toss)?,
        None => (None, None),
    };

    let balls_per_over = info.balls_per_over.unwrap_or(DEFAULT_BALLS_PER_OVER);
    if balls_per_over == 0 {
        return Err(invalid("balls_per_over", "must be a positive integer"));
    }

    let event = info.event.clone().unwrap_or_default();
    let gender = classifier.classify(&event);

    Ok(MatchInfo {
        match_date,
        match_type: MatchType::from_code(&info.match_type),
        venue: info.venue.clone(),
        city: info.city.clone(),
        teams: info.teams.clone(),
        winner,
        win_margin,
        win_margin_type,
        toss_winner,
        toss_decision,
        balls_per_over,
        gender,
        event,
    })
}

/// Winner and margin. The margin is only read when a winner is declared, and a
/// `by` section with neither `runs` nor `wickets` leaves both margin fields empty.
fn extract_outcome(
    outcome: &RawOutcome,
) -> SourceResult<(Option<String>, Option<u32>, Option<WinMarginType>)> {
    let Some(winner) = outcome.winner.clone() else {
        return Ok((None, None, None));
    };

    let margin = match &outcome.by {
        Some(by) => margin_of(by)?,
        None => None,
    };

    Ok(match margin {
        Some((value, kind)) => (Some(winner), Some(value), Some(kind)),
        None => (Some(winner), None, None),
    })
}

fn margin_of(by: &Map<String, Value>) -> SourceResult<Option<(u32, WinMarginType)>> {
    let (key, kind) = if by.contains_key("runs") {
        ("runs", WinMarginType::Runs)
    } else if by.contains_key("wickets") {
        ("wickets", WinMarginType::Wickets)
    } else {
        return Ok(None);
    };

    let value = by
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| invalid(format!("outcome.by.{key}"), "must be a non-negative integer"))?;

    Ok(Some((value, kind)))
}

fn extract_toss(toss: &RawToss) -> SourceResult<(Option<String>, Option<TossDecision>)> {
    let decision = match toss.decision.as_deref() {
        Some(code) => Some(
            TossDecision::from_code(code)
                .ok_or_else(|| invalid("toss.decision", format!("unknown decision '{code}'")))?,
        ),
        None => None,
    };
    Ok((toss.winner.clone(), decision))
}

fn invalid(key: impl Into<String>, message: impl Into<String>) -> SourceError {
    SourceError::InvalidValue {
        key: key.into(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use crate::parser::gender::WomensEventName;
    use serde_json::json;

    fn raw_info(value: Value) -> RawInfo {
        serde_json::from_value(value).unwrap()
    }

    fn base() -> Value {
        json!({
            "dates": ["2025-05-12", "2025-05-13"],
            "match_type": "T20",
            "venue": "Terdthai Cricket Ground, Bangkok",
            "city": "Bangkok",
            "teams": ["Kuwait", "Bhutan"]
        })
    }

    #[test]
    fn test_defaults_without_optional_sections() {
        let info = extract_match_info(&raw_info(base()), &WomensEventName).unwrap();
        assert_eq!(info.match_date, "2025-05-12");
        assert_eq!(info.winner, None);
        assert_eq!(info.win_margin, None);
        assert_eq!(info.win_margin_type, None);
        assert_eq!(info.toss_winner, None);
        assert_eq!(info.toss_decision, None);
        assert_eq!(info.balls_per_over, 6);
        assert_eq!(info.gender, Gender::Men);
        assert!(info.event.is_empty());
    }

    #[test]
    fn test_winner_by_runs() {
        let mut v = base();
        v["outcome"] = json!({ "winner": "Kuwait", "by": { "runs": 35 } });
        let info = extract_match_info(&raw_info(v), &WomensEventName).unwrap();
        assert_eq!(info.winner.as_deref(), Some("Kuwait"));
        assert_eq!(info.win_margin, Some(35));
        assert_eq!(info.win_margin_type, Some(WinMarginType::Runs));
    }

    #[test]
    fn test_winner_by_wickets() {
        let mut v = base();
        v["outcome"] = json!({ "winner": "Bhutan", "by": { "wickets": 4 } });
        let info = extract_match_info(&raw_info(v), &WomensEventName).unwrap();
        assert_eq!(info.win_margin, Some(4));
        assert_eq!(info.win_margin_type, Some(WinMarginType::Wickets));
    }

    #[test]
    fn test_no_result_leaves_margin_empty() {
        let mut v = base();
        v["outcome"] = json!({ "result": "no result" });
        let info = extract_match_info(&raw_info(v), &WomensEventName).unwrap();
        assert_eq!(info.winner, None);
        assert_eq!(info.win_margin_type, None);

        // winner without a recognised margin unit
        let mut v = base();
        v["outcome"] = json!({ "winner": "Kuwait", "by": { "innings": 1 } });
        let info = extract_match_info(&raw_info(v), &WomensEventName).unwrap();
        assert_eq!(info.winner.as_deref(), Some("Kuwait"));
        assert_eq!(info.win_margin, None);
        assert_eq!(info.win_margin_type, None);
    }

    #[test]
    fn test_negative_margin_rejected() {
        let mut v = base();
        v["outcome"] = json!({ "winner": "Kuwait", "by": { "runs": -3 } });
        let err = extract_match_info(&raw_info(v), &WomensEventName).unwrap_err();
        assert!(err.to_string().contains("outcome.by.runs"));
    }

    #[test]
    fn test_toss_and_event() {
        let mut v = base();
        v["toss"] = json!({ "winner": "Bhutan", "decision": "field" });
        v["event"] = json!({ "name": "ICC Women's T20 World Cup Asia Qualifier", "match_number": 7 });
        v["balls_per_over"] = json!(5);
        let info = extract_match_info(&raw_info(v), &WomensEventName).unwrap();
        assert_eq!(info.toss_winner.as_deref(), Some("Bhutan"));
        assert_eq!(info.toss_decision, Some(TossDecision::Field));
        assert_eq!(info.balls_per_over, 5);
        assert_eq!(info.gender, Gender::Women);
        assert_eq!(info.event["match_number"], 7);
    }

    #[test]
    fn test_structural_rejections() {
        let mut v = base();
        v["dates"] = json!([]);
        assert!(extract_match_info(&raw_info(v), &WomensEventName).is_err());

        let mut v = base();
        v["teams"] = json!(["Kuwait"]);
        let err = extract_match_info(&raw_info(v), &WomensEventName).unwrap_err();
        assert!(err.to_string().contains("two teams"));

        let mut v = base();
        v["balls_per_over"] = json!(0);
        assert!(extract_match_info(&raw_info(v), &WomensEventName).is_err());

        let mut v = base();
        v["toss"] = json!({ "winner": "Kuwait", "decision": "bowl" });
        assert!(extract_match_info(&raw_info(v), &WomensEventName).is_err());
    }
}
