use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Where a student is relative to undergraduate study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Before,
    During,
    After,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Before, Stage::During, Stage::After];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Before => "before",
            Stage::During => "during",
            Stage::After => "after",
        }
    }

    pub fn parse(s: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.as_str() == s)
    }
}

/// Read-only view of the profile the onboarding flow writes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfileRow {
    pub user_id: String,
    pub stage: Option<String>,
    pub career_id: Option<String>,
    pub year: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfileRow {
    /// Stage, ignoring values the onboarding flow no longer writes.
    pub fn stage(&self) -> Option<Stage> {
        self.stage.as_deref().and_then(Stage::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_round_trips_through_str() {
        for stage in Stage::ALL {
            assert_eq!(Stage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::parse("graduated"), None);
    }

    #[test]
    fn test_stage_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Stage::During).unwrap(), "\"during\"");
    }

    #[test]
    fn test_unknown_profile_stage_is_ignored() {
        let row = UserProfileRow {
            user_id: "u1".to_string(),
            stage: Some("alumni".to_string()),
            career_id: None,
            year: None,
            updated_at: Utc::now(),
        };
        assert_eq!(row.stage(), None);
    }
}
