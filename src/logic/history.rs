// News items and the league's history timeline.
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

use crate::{error::{FieldErrors, Result}, logic::{time::iso_date_format, types::HistoryEntryId}};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, Copy, PartialEq)]
#[derive(sqlx::Type)]
pub enum EntryKind {
    #[default]
    News,
    History,
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
#[derive(FromRow)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: HistoryEntryId,
    #[serde(with = "iso_date_format")]
    pub date: Date,
    #[serde(default)]
    pub kind: EntryKind,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl HistoryEntry {
    pub fn build(date: Date, kind: EntryKind, title: &str, body: &str) -> Self {
        Self {
            id: HistoryEntryId::default(),
            date,
            kind,
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.require("title", &self.title);
        errors.into_result()
    }
}
