use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kingdom::Kingdom;

/// Lifecycle of a ruler application.
///
/// ```text
///  Draft ──creator──▶ Submitted ──moderator──▶ Approved | Rejected
///    │                    │
///    └──────creator───────┴──▶ Deleted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationState {
    Draft,
    Submitted,
    Approved,
    Rejected,
    Deleted,
}

/// Who is asking for a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionActor {
    Creator,
    Moderator,
}

impl ApplicationState {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationState::Draft => "Draft",
            ApplicationState::Submitted => "Submitted",
            ApplicationState::Approved => "Approved",
            ApplicationState::Rejected => "Rejected",
            ApplicationState::Deleted => "Deleted",
        }
    }

    pub fn can_transition(self, to: ApplicationState, actor: TransitionActor) -> bool {
        use ApplicationState::*;
        match actor {
            TransitionActor::Creator => matches!(
                (self, to),
                (Draft, Submitted) | (Draft, Deleted) | (Submitted, Deleted)
            ),
            TransitionActor::Moderator => matches!((self, to), (Submitted, Approved) | (Submitted, Rejected)),
        }
    }

    pub fn is_editable(self) -> bool {
        self == ApplicationState::Draft
    }
}

impl std::fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(ApplicationState::Draft),
            "Submitted" => Ok(ApplicationState::Submitted),
            "Approved" => Ok(ApplicationState::Approved),
            "Rejected" => Ok(ApplicationState::Rejected),
            "Deleted" => Ok(ApplicationState::Deleted),
            other => Err(format!("unknown application state '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct RulerApplication {
    pub id: i32,
    pub state: String,
    pub date_create: NaiveDate,
    pub date_send: Option<NaiveDate>,
    pub date_complete: Option<NaiveDate>,
    pub ruler: String,
    pub creator_refer: i32,
    pub moderator_refer: Option<i32>,
    #[serde(rename = "Check")]
    pub checked: bool,
}

impl RulerApplication {
    /// Rows are only written through `ApplicationState::as_str`, so an
    /// unparseable value means the row was edited by hand; treat it as deleted.
    pub fn state(&self) -> ApplicationState {
        self.state.parse().unwrap_or(ApplicationState::Deleted)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct KingdomFromApplication {
    pub kingdom: Kingdom,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApplicationWithKingdoms {
    pub application: RulerApplication,
    pub kingdoms: Vec<KingdomFromApplication>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApplicationState::*;

    #[test]
    fn creator_transitions() {
        assert!(Draft.can_transition(Submitted, TransitionActor::Creator));
        assert!(Draft.can_transition(Deleted, TransitionActor::Creator));
        assert!(Submitted.can_transition(Deleted, TransitionActor::Creator));
        assert!(!Draft.can_transition(Approved, TransitionActor::Creator));
        assert!(!Submitted.can_transition(Rejected, TransitionActor::Creator));
        assert!(!Approved.can_transition(Deleted, TransitionActor::Creator));
    }

    #[test]
    fn moderator_transitions() {
        assert!(Submitted.can_transition(Approved, TransitionActor::Moderator));
        assert!(Submitted.can_transition(Rejected, TransitionActor::Moderator));
        assert!(!Draft.can_transition(Approved, TransitionActor::Moderator));
        assert!(!Approved.can_transition(Rejected, TransitionActor::Moderator));
        assert!(!Submitted.can_transition(Deleted, TransitionActor::Moderator));
    }

    #[test]
    fn state_round_trips_through_text() {
        for state in [Draft, Submitted, Approved, Rejected, Deleted] {
            assert_eq!(state.as_str().parse::<ApplicationState>().unwrap(), state);
            assert_eq!(serde_json::to_value(state).unwrap(), state.as_str());
        }
        assert!("draft".parse::<ApplicationState>().is_err());
    }

    #[test]
    fn application_serializes_check_flag() {
        let app = RulerApplication {
            id: 3,
            state: "Submitted".into(),
            date_create: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            date_send: NaiveDate::from_ymd_opt(2024, 5, 2),
            date_complete: None,
            ruler: "Arthur".into(),
            creator_refer: 1,
            moderator_refer: None,
            checked: true,
        };
        let v = serde_json::to_value(&app).unwrap();
        assert_eq!(v["Check"], true);
        assert_eq!(v["DateSend"], "2024-05-02");
        assert!(v["DateComplete"].is_null());
        assert_eq!(app.state(), Submitted);
    }
}
