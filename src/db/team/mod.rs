use sqlx::{QueryBuilder, Sqlite};

use crate::{db::{affected, Found}, error::Result, logic::{person::player::Player, team::{self, Team}, types::{Db, TeamId}}};

impl Team {
    pub async fn fetch_from_db(db: &Db, id: TeamId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM Team
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("team")
    }

    // Fetch ALL teams from the database.
    pub async fn fetch_all(db: &Db) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Team
            ORDER BY full_name"
        ).fetch_all(db).await?)
    }

    // Fetch the teams with the given ids, for crest lookups.
    pub async fn fetch_many(db: &Db, ids: &[TeamId]) -> Result<Vec<Self>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM Team WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids.iter() {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        Ok(query.build_query_as().fetch_all(db).await?)
    }

    // Save a new team to the database.
    pub async fn save(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        self.id = sqlx::query_scalar(
            "INSERT INTO Team (full_name, short_name, crest, home_kit, away_kit)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id"
        ).bind(self.full_name.as_str())
        .bind(self.short_name.as_deref())
        .bind(self.crest.as_deref())
        .bind(self.home_kit.as_deref())
        .bind(self.away_kit.as_deref())
        .fetch_one(db).await?;

        Ok(())
    }

    pub async fn update(&self, db: &Db) -> Result<()> {
        self.validate()?;
        let result = sqlx::query(
            "UPDATE Team SET full_name = $1, short_name = $2, crest = $3, home_kit = $4, away_kit = $5
            WHERE id = $6"
        ).bind(self.full_name.as_str())
        .bind(self.short_name.as_deref())
        .bind(self.crest.as_deref())
        .bind(self.home_kit.as_deref())
        .bind(self.away_kit.as_deref())
        .bind(self.id)
        .execute(db).await?;

        affected(result, "team")
    }

    pub async fn delete(db: &Db, id: TeamId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM Team WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "team")
    }

    // Get every rival of the team, whichever way the rivalry was entered.
    pub async fn rivals(&self, db: &Db) -> Result<Vec<Team>> {
        Ok(sqlx::query_as(
            "SELECT Team.* FROM Rivalry
            INNER JOIN Team ON Team.id = CASE WHEN Rivalry.team_id = $1 THEN Rivalry.rival_id ELSE Rivalry.team_id END
            WHERE Rivalry.team_id = $1 OR Rivalry.rival_id = $1
            ORDER BY Team.full_name"
        ).bind(self.id)
        .fetch_all(db).await?)
    }

    // Adding a rivalry that already exists does nothing.
    pub async fn add_rival(db: &Db, team_id: TeamId, rival_id: TeamId) -> Result<()> {
        let (first, second) = team::rivalry(team_id, rival_id)?;
        sqlx::query(
            "INSERT OR IGNORE INTO Rivalry (team_id, rival_id)
            VALUES ($1, $2)"
        ).bind(first)
        .bind(second)
        .execute(db).await?;

        Ok(())
    }

    pub async fn remove_rival(db: &Db, team_id: TeamId, rival_id: TeamId) -> Result<()> {
        let (first, second) = team::rivalry(team_id, rival_id)?;
        sqlx::query(
            "DELETE FROM Rivalry
            WHERE team_id = $1 AND rival_id = $2"
        ).bind(first)
        .bind(second)
        .execute(db).await?;

        Ok(())
    }

    // Get every player in the roster.
    pub async fn players(&self, db: &Db) -> Result<Vec<Player>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Player
            WHERE team_id = $1
            ORDER BY shirt_number IS NULL, shirt_number, last_name"
        ).bind(self.id)
        .fetch_all(db).await?)
    }
}
