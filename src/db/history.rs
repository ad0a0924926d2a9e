use crate::{db::{affected, Found}, error::Result, logic::{history::HistoryEntry, types::{Db, HistoryEntryId}}};

impl HistoryEntry {
    pub async fn fetch_from_db(db: &Db, id: HistoryEntryId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM HistoryEntry
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("history entry")
    }

    // The timeline, newest first.
    pub async fn fetch_all(db: &Db) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM HistoryEntry
            ORDER BY date DESC, id DESC"
        ).fetch_all(db).await?)
    }

    pub async fn save(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        self.id = sqlx::query_scalar(
            "INSERT INTO HistoryEntry (date, kind, title, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id"
        ).bind(self.date)
        .bind(self.kind)
        .bind(self.title.as_str())
        .bind(self.body.as_str())
        .fetch_one(db).await?;

        Ok(())
    }

    pub async fn update(&self, db: &Db) -> Result<()> {
        self.validate()?;
        let result = sqlx::query(
            "UPDATE HistoryEntry SET date = $1, kind = $2, title = $3, body = $4
            WHERE id = $5"
        ).bind(self.date)
        .bind(self.kind)
        .bind(self.title.as_str())
        .bind(self.body.as_str())
        .bind(self.id)
        .execute(db).await?;

        affected(result, "history entry")
    }

    pub async fn delete(db: &Db, id: HistoryEntryId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM HistoryEntry WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "history entry")
    }
}
