// Saved settings that new cups can be created from.
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::logic::{competition::{cup::{Cup, CupRules}, grouped_cup::{GroupFormat, GroupedCup}, ranking::RankCriteria}, types::TemplateId};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone)]
#[derive(FromRow)]
pub struct CupTemplate {
    #[serde(default)]
    pub id: TemplateId,
    pub name: String,
    #[sqlx(json)]
    pub rules: CupRules,
}

impl CupTemplate {
    pub fn build(name: &str, rules: CupRules) -> Self {
        Self {
            name: name.to_string(),
            rules,
            ..Default::default()
        }
    }

    // A new cup with the saved rules.
    pub fn instantiate(&self, name: &str) -> Cup {
        Cup::build(name, self.rules)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone)]
#[derive(FromRow)]
pub struct GroupedCupTemplate {
    #[serde(default)]
    pub id: TemplateId,
    pub name: String,
    #[sqlx(json)]
    pub format: GroupFormat,
    #[sqlx(json)]
    #[serde(default = "RankCriteria::defaults")]
    pub rank_criteria: Vec<RankCriteria>,
}

impl GroupedCupTemplate {
    pub fn build(name: &str, format: GroupFormat, rank_criteria: Vec<RankCriteria>) -> Self {
        Self {
            name: name.to_string(),
            format,
            rank_criteria,
            ..Default::default()
        }
    }

    pub fn instantiate(&self, name: &str) -> GroupedCup {
        GroupedCup::build(name, self.format, self.rank_criteria.clone())
    }
}
