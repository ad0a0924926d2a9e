use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::{Error, FieldErrors, Result}, logic::types::TeamId};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct Team {
    #[serde(default)]
    pub id: TeamId,
    pub full_name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    // Paths of the images, served elsewhere.
    #[serde(default)]
    pub crest: Option<String>,
    #[serde(default)]
    pub home_kit: Option<String>,
    #[serde(default)]
    pub away_kit: Option<String>,
}

impl Team {
    pub fn build(name: &str) -> Self {
        Self {
            full_name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.require("full_name", &self.full_name);

        if let Some(short_name) = self.short_name.as_deref() {
            if short_name.chars().count() > 5 {
                errors.add("short_name", "must be at most 5 characters");
            }
        }

        errors.into_result()
    }

    // The short name if the team has one.
    pub fn display_name(&self) -> &str {
        match self.short_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.full_name,
        }
    }
}

// Rivalries go both ways, so each pair is stored once with the lower id first.
pub fn rivalry(team_id: TeamId, rival_id: TeamId) -> Result<(TeamId, TeamId)> {
    if team_id == rival_id {
        let mut errors = FieldErrors::new();
        errors.add("rival_id", "a team cannot be its own rival");
        return Err(Error::Validation(errors));
    }

    return Ok((team_id.min(rival_id), team_id.max(rival_id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rivalry_is_symmetric() {
        assert_eq!(rivalry(4, 2).unwrap(), rivalry(2, 4).unwrap());
        assert!(matches!(rivalry(3, 3), Err(Error::Validation(_))));
    }

    #[test]
    fn team_needs_a_name() {
        let team = Team::build("  ");
        let Err(Error::Validation(errors)) = team.validate() else { panic!("expected validation errors") };
        assert_eq!(errors.get("full_name"), Some("is required"));

        let mut team = Team::build("Northbridge Rovers");
        team.short_name = Some("NBR".to_string());
        assert!(team.validate().is_ok());
        assert_eq!(team.display_name(), "NBR");
    }
}
