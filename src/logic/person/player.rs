use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

use crate::{error::{FieldErrors, Result}, logic::{time::{iso_date_format, years_between}, types::{PlayerId, PositionId, TeamId}}};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[derive(FromRow)]
pub struct Player {
    #[serde(default)]
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub shirt_number: Option<u8>,
    #[serde(default, with = "iso_date_format::option")]
    pub birth_date: Option<Date>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    // Current team. Free agents have none.
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub position_id: Option<PositionId>,

    #[sqlx(skip)]
    #[serde(default)]
    pub secondary_position_ids: Vec<PositionId>,
}

impl Player {
    pub fn build(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            ..Default::default()
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    // Age in whole years on the given day.
    pub fn age(&self, today: Date) -> Option<i32> {
        self.birth_date.map(|birth_date| years_between(birth_date, today))
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.require("first_name", &self.first_name);
        errors.require("last_name", &self.last_name);

        if let Some(number) = self.shirt_number {
            if !(1..=99).contains(&number) {
                errors.add("shirt_number", "must be between 1 and 99");
            }
        }

        errors.into_result()
    }

    // Drop duplicates and the primary position from the secondary positions.
    pub fn normalise_positions(&mut self) {
        let primary = self.position_id;
        let mut seen = Vec::new();
        self.secondary_position_ids.retain(|id| {
            let keep = Some(*id) != primary && !seen.contains(id);
            seen.push(*id);
            keep
        });
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn primary_position_is_never_secondary() {
        let mut player = Player::build("Ada", "Lindqvist");
        player.position_id = Some(3);
        player.secondary_position_ids = vec![3, 4, 4, 5];
        player.normalise_positions();
        assert_eq!(player.secondary_position_ids, vec![4, 5]);
    }

    #[test]
    fn shirt_numbers_are_limited() {
        let mut player = Player::build("Ada", "Lindqvist");
        player.shirt_number = Some(0);
        assert!(player.validate().is_err());
        player.shirt_number = Some(10);
        assert!(player.validate().is_ok());
    }

    #[test]
    fn age_counts_whole_years() {
        let mut player = Player::build("Ada", "Lindqvist");
        assert_eq!(player.age(date!(2025 - 01 - 01)), None);
        player.birth_date = Some(date!(2000 - 03 - 01));
        assert_eq!(player.age(date!(2025 - 02 - 28)), Some(24));
    }
}
