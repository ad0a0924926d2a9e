use rand::rngs::StdRng;
use sqlx::{types::Json, SqliteConnection};
use tracing::info;

use crate::{db::{affected, competition::cup, Found}, error::{Error, Result}, logic::{competition::{cup::Cup, grouped_cup::{self, GroupedCup, Poule, PouleGame}, round_robin, standings::{self, FixtureResult, Standing}}, game::Score, types::{Db, GroupedCupId, PouleGameId, PouleId, TeamId}}};

// Static read queries.
impl GroupedCup {
    pub async fn fetch_from_db(db: &Db, id: GroupedCupId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM GroupedCup
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("grouped cup")
    }

    pub async fn fetch_all(db: &Db) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM GroupedCup
            ORDER BY name"
        ).fetch_all(db).await?)
    }

    pub async fn team_ids(&self, db: &Db) -> Result<Vec<TeamId>> {
        Ok(sqlx::query_scalar(
            "SELECT team_id FROM GroupedCupTeam
            WHERE grouped_cup_id = $1
            ORDER BY seed"
        ).bind(self.id)
        .fetch_all(db).await?)
    }

    // The groups with their tables and games, in the order they were drawn.
    pub async fn poules(&self, db: &Db) -> Result<Vec<Poule>> {
        let mut poules: Vec<Poule> = sqlx::query_as(
            "SELECT * FROM Poule
            WHERE grouped_cup_id = $1
            ORDER BY id"
        ).bind(self.id)
        .fetch_all(db).await?;

        let mut conn = db.acquire().await?;
        for poule in poules.iter_mut() {
            poule.standings = Poule::fetch_standings(&mut conn, poule.id).await?;
            poule.games = Poule::fetch_games(&mut conn, poule.id).await?;
        }

        return Ok(poules);
    }
}

// Database write queries.
impl GroupedCup {
    pub async fn save(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        self.id = sqlx::query_scalar(
            "INSERT INTO GroupedCup (name, format, rank_criteria)
            VALUES ($1, $2, $3)
            RETURNING id"
        ).bind(self.name.as_str())
        .bind(Json(&self.format))
        .bind(Json(&self.rank_criteria))
        .fetch_one(db).await?;

        Ok(())
    }

    // The format is fixed once the groups are drawn.
    pub async fn update(&self, db: &Db) -> Result<()> {
        self.validate()?;
        let stored = Self::fetch_from_db(db, self.id).await?;
        if stored.is_generated && stored.format != self.format {
            return Err(Error::invalid_configuration("the format of a generated grouped cup cannot change"));
        }

        let result = sqlx::query(
            "UPDATE GroupedCup SET name = $1, format = $2, rank_criteria = $3
            WHERE id = $4"
        ).bind(self.name.as_str())
        .bind(Json(&self.format))
        .bind(Json(&self.rank_criteria))
        .bind(self.id)
        .execute(db).await?;

        affected(result, "grouped cup")
    }

    pub async fn delete(db: &Db, id: GroupedCupId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM GroupedCup WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "grouped cup")
    }

    pub async fn set_teams(&self, db: &Db, teams: &[TeamId]) -> Result<()> {
        let mut tx = db.begin().await?;
        if is_generated(&mut tx, self.id).await? {
            return Err(Error::invalid_configuration("the teams of a generated grouped cup cannot change"));
        }

        sqlx::query(
            "DELETE FROM GroupedCupTeam WHERE grouped_cup_id = $1"
        ).bind(self.id)
        .execute(&mut *tx).await?;

        for (seed, team_id) in teams.iter().enumerate() {
            sqlx::query(
                "INSERT INTO GroupedCupTeam (grouped_cup_id, team_id, seed)
                VALUES ($1, $2, $3)"
            ).bind(self.id)
            .bind(team_id)
            .bind(seed as u32 + 1)
            .execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // Draw the groups and schedule their games.
    pub async fn generate(&mut self, db: &Db, rng: &mut StdRng) -> Result<Vec<Poule>> {
        let teams = self.team_ids(db).await?;
        let groups = grouped_cup::draw(&teams, &self.format, rng)?;

        let mut tx = db.begin().await?;
        if is_generated(&mut tx, self.id).await? {
            return Err(Error::invalid_configuration("the groups have already been drawn"));
        }

        let mut game_count = 0;
        for (i, group) in groups.iter().enumerate() {
            let poule_id: PouleId = sqlx::query_scalar(
                "INSERT INTO Poule (grouped_cup_id, name)
                VALUES ($1, $2)
                RETURNING id"
            ).bind(self.id)
            .bind(grouped_cup::group_name(i))
            .fetch_one(&mut *tx).await?;

            for team_id in group.iter() {
                sqlx::query(
                    "INSERT INTO PouleTeam (poule_id, team_id)
                    VALUES ($1, $2)"
                ).bind(poule_id)
                .bind(team_id)
                .execute(&mut *tx).await?;
            }

            let fixtures = round_robin::generate(group, self.format.group_legs)?;
            for fixture in fixtures.iter() {
                sqlx::query(
                    "INSERT INTO PouleGame (poule_id, matchday, home_id, away_id)
                    VALUES ($1, $2, $3, $4)"
                ).bind(poule_id)
                .bind(fixture.matchday)
                .bind(fixture.home_id)
                .bind(fixture.away_id)
                .execute(&mut *tx).await?;
            }
            game_count += fixtures.len();

            Poule::recompute_standings(&mut tx, poule_id).await?;
        }

        sqlx::query(
            "UPDATE GroupedCup SET is_generated = TRUE
            WHERE id = $1"
        ).bind(self.id)
        .execute(&mut *tx).await?;
        tx.commit().await?;

        self.is_generated = true;
        info!("drew {} groups with {game_count} games for {}", groups.len(), self.name);
        return self.poules(db).await;
    }

    // Close the group stage and create the knockout phase from the qualifiers.
    pub async fn finalize(&mut self, db: &Db, rng: &mut StdRng) -> Result<Cup> {
        let mut tx = db.begin().await?;
        let stored: GroupedCup = sqlx::query_as(
            "SELECT * FROM GroupedCup WHERE id = $1"
        ).bind(self.id)
        .fetch_optional(&mut *tx).await?
        .found("grouped cup")?;

        if !stored.is_generated {
            return Err(Error::invalid_configuration("the groups have not been drawn yet"));
        }
        if stored.cup_id.is_some() {
            return Err(Error::invalid_configuration("the knockout phase already exists"));
        }

        let unfinished: u32 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM PouleGame
            INNER JOIN Poule ON Poule.id = PouleGame.poule_id
            WHERE Poule.grouped_cup_id = $1 AND NOT PouleGame.is_finished"
        ).bind(self.id)
        .fetch_one(&mut *tx).await?;
        if unfinished > 0 {
            return Err(Error::incomplete_result(format!("{unfinished} group games have not been played")));
        }

        // Draw order, so the seeding of the knockout does not depend on how group names sort.
        let poule_ids: Vec<PouleId> = sqlx::query_scalar(
            "SELECT id FROM Poule
            WHERE grouped_cup_id = $1
            ORDER BY id"
        ).bind(self.id)
        .fetch_all(&mut *tx).await?;

        let mut ranked_groups = Vec::new();
        for poule_id in poule_ids {
            ranked_groups.push(Poule::recompute_standings(&mut tx, poule_id).await?);
        }
        let teams = grouped_cup::qualifiers(&ranked_groups, stored.format.qualifiers_per_group)?;

        let mut knockout = Cup::build(&format!("{} Knockout", stored.name), stored.format.knockout_rules());
        knockout.grouped_cup_id = Some(self.id);
        knockout.id = sqlx::query_scalar(
            "INSERT INTO Cup (name, no_of_teams, random_pairing, rounds, legs, win_only, grouped_cup_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id"
        ).bind(knockout.name.as_str())
        .bind(knockout.rules.no_of_teams)
        .bind(knockout.rules.random_pairing)
        .bind(knockout.rules.rounds)
        .bind(knockout.rules.legs)
        .bind(knockout.rules.win_only)
        .bind(knockout.grouped_cup_id)
        .fetch_one(&mut *tx).await?;

        cup::insert_teams(&mut tx, knockout.id, &teams).await?;
        cup::generate_bracket(&mut tx, knockout.id, &teams, &knockout.rules, rng).await?;
        knockout.is_generated = true;

        sqlx::query(
            "UPDATE GroupedCup SET cup_id = $1
            WHERE id = $2"
        ).bind(knockout.id)
        .bind(self.id)
        .execute(&mut *tx).await?;
        tx.commit().await?;

        self.cup_id = Some(knockout.id);
        info!("{} qualifiers go through to {}", teams.len(), knockout.name);
        return Ok(knockout);
    }
}

impl Poule {
    pub async fn fetch_from_db(db: &Db, id: PouleId) -> Result<Self> {
        let mut poule: Poule = sqlx::query_as(
            "SELECT * FROM Poule
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("group")?;

        let mut conn = db.acquire().await?;
        poule.standings = Self::fetch_standings(&mut conn, id).await?;
        poule.games = Self::fetch_games(&mut conn, id).await?;
        return Ok(poule);
    }

    async fn fetch_standings(conn: &mut SqliteConnection, id: PouleId) -> Result<Vec<Standing>> {
        Ok(sqlx::query_as(
            "SELECT * FROM PouleTeam
            WHERE poule_id = $1
            ORDER BY ranking, team_id"
        ).bind(id)
        .fetch_all(&mut *conn).await?)
    }

    async fn fetch_games(conn: &mut SqliteConnection, id: PouleId) -> Result<Vec<PouleGame>> {
        Ok(sqlx::query_as(
            "SELECT * FROM PouleGame
            WHERE poule_id = $1
            ORDER BY matchday, id"
        ).bind(id)
        .fetch_all(&mut *conn).await?)
    }

    // Compute the table of the group from its games and store it. Returns the ranked rows.
    pub async fn recompute_standings(conn: &mut SqliteConnection, id: PouleId) -> Result<Vec<Standing>> {
        let parent: GroupedCup = sqlx::query_as(
            "SELECT GroupedCup.* FROM GroupedCup
            INNER JOIN Poule ON Poule.grouped_cup_id = GroupedCup.id
            WHERE Poule.id = $1"
        ).bind(id)
        .fetch_optional(&mut *conn).await?
        .found("group")?;

        let teams: Vec<TeamId> = sqlx::query_scalar(
            "SELECT team_id FROM PouleTeam
            WHERE poule_id = $1
            ORDER BY team_id"
        ).bind(id)
        .fetch_all(&mut *conn).await?;

        let results: Vec<FixtureResult> = Self::fetch_games(conn, id).await?
            .iter()
            .map(PouleGame::fixture_result)
            .collect();

        let table = standings::compute(&teams, &results, &parent.format.points, &parent.rank_criteria);
        for row in table.iter() {
            sqlx::query(
                "UPDATE PouleTeam SET ranking = $1, points = $2, played = $3, won = $4, drawn = $5, lost = $6,
                goals_for = $7, goals_against = $8, goal_difference = $9
                WHERE poule_id = $10 AND team_id = $11"
            ).bind(row.rank)
            .bind(row.points)
            .bind(row.played)
            .bind(row.won)
            .bind(row.drawn)
            .bind(row.lost)
            .bind(row.goals_for)
            .bind(row.goals_against)
            .bind(row.goal_difference)
            .bind(id)
            .bind(row.team_id)
            .execute(&mut *conn).await?;
        }

        return Ok(table);
    }
}

impl PouleGame {
    pub async fn fetch_from_db(db: &Db, id: PouleGameId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM PouleGame
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("group game")
    }

    // Enter the result and update the table of the group.
    pub async fn update_result(db: &Db, id: PouleGameId, score: &Score) -> Result<Self> {
        let mut tx = db.begin().await?;
        let mut game: PouleGame = sqlx::query_as(
            "SELECT * FROM PouleGame WHERE id = $1"
        ).bind(id)
        .fetch_optional(&mut *tx).await?
        .found("group game")?;
        game.apply(score);

        sqlx::query(
            "UPDATE PouleGame SET home_goals = $1, away_goals = $2, is_finished = $3
            WHERE id = $4"
        ).bind(game.home_goals)
        .bind(game.away_goals)
        .bind(game.is_finished)
        .bind(id)
        .execute(&mut *tx).await?;

        Poule::recompute_standings(&mut tx, game.poule_id).await?;
        tx.commit().await?;
        return Ok(game);
    }
}

async fn is_generated(conn: &mut SqliteConnection, id: GroupedCupId) -> Result<bool> {
    sqlx::query_scalar(
        "SELECT is_generated FROM GroupedCup WHERE id = $1"
    ).bind(id)
    .fetch_optional(&mut *conn).await?
    .found("grouped cup")
}
