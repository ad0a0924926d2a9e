use time::Date;
use tracing::{info, warn};

use crate::{db::Found, error::Result, logic::{person::{player::Player, transfer::{self, Transfer}}, types::{Db, PlayerId, TeamId}}};

impl Transfer {
    // Every transfer of the player, oldest first.
    pub async fn fetch_for_player(db: &Db, player_id: PlayerId) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Transfer
            WHERE player_id = $1
            ORDER BY date, id"
        ).bind(player_id)
        .fetch_all(db).await?)
    }

    // Record the transfer and move the player to the new team.
    pub async fn record(&mut self, db: &Db) -> Result<()> {
        let mut tx = db.begin().await?;

        let current: Option<TeamId> = sqlx::query_scalar(
            "SELECT team_id FROM Player
            WHERE id = $1"
        ).bind(self.player_id)
        .fetch_optional(&mut *tx).await?
        .found("player")?;

        self.old_team_id = current;
        self.validate()?;

        self.id = sqlx::query_scalar(
            "INSERT INTO Transfer (player_id, old_team_id, new_team_id, date)
            VALUES ($1, $2, $3, $4)
            RETURNING id"
        ).bind(self.player_id)
        .bind(self.old_team_id)
        .bind(self.new_team_id)
        .bind(self.date)
        .fetch_one(&mut *tx).await?;

        sqlx::query(
            "UPDATE Player SET team_id = $1
            WHERE id = $2"
        ).bind(self.new_team_id)
        .bind(self.player_id)
        .execute(&mut *tx).await?;

        tx.commit().await?;
        info!("player {} moved to team {}", self.player_id, self.new_team_id);
        Ok(())
    }
}

impl Player {
    // The team the player played for on the given day.
    // Falls back to the current team if no transfer covers the day or the log cannot be read.
    pub async fn team_at_date(&self, db: &Db, date: Date) -> Option<TeamId> {
        match Transfer::fetch_for_player(db, self.id).await {
            Ok(transfers) => transfer::team_at_date(&transfers, date).or(self.team_id),
            Err(e) => {
                warn!("could not read the transfers of player {}: {e}", self.id);
                self.team_id
            }
        }
    }
}
