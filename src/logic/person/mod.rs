pub mod player;
pub mod transfer;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{error::{FieldErrors, Result}, logic::types::PositionId};

// A position on the pitch, such as goalkeeper or striker.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct Position {
    #[serde(default)]
    pub id: PositionId,
    pub position_name: String,
    pub abbreviation: String,
}

impl Position {
    pub fn build(position_name: &str, abbreviation: &str) -> Self {
        Self {
            position_name: position_name.to_string(),
            abbreviation: abbreviation.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.require("position_name", &self.position_name);
        errors.require("abbreviation", &self.abbreviation);
        if self.abbreviation.chars().count() > 3 {
            errors.add("abbreviation", "must be at most 3 characters");
        }
        errors.into_result()
    }
}
