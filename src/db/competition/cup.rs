use rand::rngs::StdRng;
use sqlx::SqliteConnection;
use tracing::{info, warn};

use crate::{db::{affected, Found}, error::{Error, Result}, logic::{competition::cup::{advancement::{self, Advancement}, bracket, Bracket, Cup, CupGame, CupRound, CupRules}, game::Score, types::{CupGameId, CupId, CupRoundId, Db, TeamId}}};

// Static read queries.
impl Cup {
    pub async fn fetch_from_db(db: &Db, id: CupId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM Cup
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("cup")
    }

    // Every cup, knockout phases of grouped cups included.
    pub async fn fetch_all(db: &Db) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Cup
            ORDER BY name"
        ).fetch_all(db).await?)
    }

    // The rounds and games of a cup, first round first.
    pub async fn bracket(&self, db: &Db) -> Result<Bracket> {
        let mut conn = db.acquire().await?;
        load_bracket(&mut conn, self.id).await
    }

    // Participants in seed order.
    pub async fn team_ids(&self, db: &Db) -> Result<Vec<TeamId>> {
        Ok(sqlx::query_scalar(
            "SELECT team_id FROM CupTeam
            WHERE cup_id = $1
            ORDER BY seed"
        ).bind(self.id)
        .fetch_all(db).await?)
    }
}

// Database write queries.
impl Cup {
    pub async fn save(&mut self, db: &Db) -> Result<()> {
        self.validate()?;
        self.id = sqlx::query_scalar(
            "INSERT INTO Cup (name, no_of_teams, random_pairing, rounds, legs, win_only, grouped_cup_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id"
        ).bind(self.name.as_str())
        .bind(self.rules.no_of_teams)
        .bind(self.rules.random_pairing)
        .bind(self.rules.rounds)
        .bind(self.rules.legs)
        .bind(self.rules.win_only)
        .bind(self.grouped_cup_id)
        .fetch_one(db).await?;

        Ok(())
    }

    // Rename the cup or change its rules. The rules are fixed once the bracket exists.
    pub async fn update(&self, db: &Db) -> Result<()> {
        self.validate()?;
        let stored = Self::fetch_from_db(db, self.id).await?;
        if stored.is_generated && stored.rules != self.rules {
            return Err(Error::invalid_configuration("the rules of a generated cup cannot change"));
        }

        let result = sqlx::query(
            "UPDATE Cup SET name = $1, no_of_teams = $2, random_pairing = $3, rounds = $4, legs = $5, win_only = $6
            WHERE id = $7"
        ).bind(self.name.as_str())
        .bind(self.rules.no_of_teams)
        .bind(self.rules.random_pairing)
        .bind(self.rules.rounds)
        .bind(self.rules.legs)
        .bind(self.rules.win_only)
        .bind(self.id)
        .execute(db).await?;

        affected(result, "cup")
    }

    pub async fn delete(db: &Db, id: CupId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM Cup WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "cup")
    }

    // Replace the participants. The order of the list is the seeding.
    pub async fn set_teams(&self, db: &Db, teams: &[TeamId]) -> Result<()> {
        let mut tx = db.begin().await?;
        if is_generated(&mut tx, self.id).await? {
            return Err(Error::invalid_configuration("the teams of a generated cup cannot change"));
        }

        sqlx::query(
            "DELETE FROM CupTeam WHERE cup_id = $1"
        ).bind(self.id)
        .execute(&mut *tx).await?;
        insert_teams(&mut tx, self.id, teams).await?;

        tx.commit().await?;
        Ok(())
    }

    // Draw the bracket from the participants and save every round.
    // Byes are resolved straight away, so their teams already sit in the second round.
    pub async fn generate(&mut self, db: &Db, rng: &mut StdRng) -> Result<Bracket> {
        let teams = self.team_ids(db).await?;

        let mut tx = db.begin().await?;
        if is_generated(&mut tx, self.id).await? {
            return Err(Error::invalid_configuration("the cup has already been generated"));
        }
        let bracket = generate_bracket(&mut tx, self.id, &teams, &self.rules, rng).await?;
        tx.commit().await?;

        self.is_generated = true;
        info!("generated cup {} with {} ties over {} rounds", self.name, bracket.tie_count(), bracket.rounds.len());
        return Ok(bracket);
    }

    // Move the winners of a round on to the next one.
    pub async fn advance_round(&mut self, db: &Db, round_id: CupRoundId) -> Result<Advancement> {
        let mut tx = db.begin().await?;
        let number: u8 = sqlx::query_scalar(
            "SELECT round_number FROM CupRound
            WHERE id = $1 AND cup_id = $2"
        ).bind(round_id)
        .bind(self.id)
        .fetch_optional(&mut *tx).await?
        .found("cup round")?;

        let mut bracket = load_bracket(&mut tx, self.id).await?;
        let advancement = advancement::advance_from(&mut bracket, number, &self.rules)?;
        save_slots(&mut tx, &bracket).await?;
        save_winner(&mut tx, self.id, advancement.champion).await?;
        tx.commit().await?;

        self.winner_id = advancement.champion;
        return Ok(advancement);
    }

    // Work out every tie again from the results, first round first.
    pub async fn recompute(&mut self, db: &Db) -> Result<Option<TeamId>> {
        let mut tx = db.begin().await?;
        let mut bracket = load_bracket(&mut tx, self.id).await?;
        let champion = advancement::recompute(&mut bracket, &self.rules)?;

        save_slots(&mut tx, &bracket).await?;
        save_winner(&mut tx, self.id, champion).await?;
        tx.commit().await?;

        self.winner_id = champion;
        info!("recomputed cup {}", self.name);
        return Ok(champion);
    }
}

impl CupGame {
    pub async fn fetch_from_db(db: &Db, id: CupGameId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM CupGame
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("cup game")
    }

    // Enter the result of a leg and advance its round and every round after it.
    // A result that leaves the tie undecidable is still saved, the tie just waits for a shootout.
    pub async fn update_result(db: &Db, id: CupGameId, score: &Score) -> Result<Self> {
        let mut tx = db.begin().await?;
        let mut game: CupGame = sqlx::query_as(
            "SELECT * FROM CupGame WHERE id = $1"
        ).bind(id)
        .fetch_optional(&mut *tx).await?
        .found("cup game")?;
        game.apply(score)?;

        sqlx::query(
            "UPDATE CupGame SET home_goals = $1, away_goals = $2, home_penalties = $3, away_penalties = $4, is_finished = $5
            WHERE id = $6"
        ).bind(game.home_goals)
        .bind(game.away_goals)
        .bind(game.home_penalties)
        .bind(game.away_penalties)
        .bind(game.is_finished)
        .bind(game.id)
        .execute(&mut *tx).await?;

        readvance(&mut tx, game.id).await?;
        tx.commit().await?;

        return Self::fetch_from_db(db, id).await;
    }
}

// Advance the round of a cup game and the rounds after it, after the game's result changed.
// Ties that cannot be decided are logged and left without a winner.
pub(crate) async fn readvance(conn: &mut SqliteConnection, game_id: CupGameId) -> Result<Advancement> {
    let (cup_id, number): (CupId, u8) = sqlx::query_as(
        "SELECT CupRound.cup_id, CupRound.round_number FROM CupGame
        JOIN CupRound ON CupRound.id = CupGame.round_id
        WHERE CupGame.id = $1"
    ).bind(game_id)
    .fetch_optional(&mut *conn).await?
    .found("cup game")?;
    let rules: CupRules = sqlx::query_as(
        "SELECT * FROM Cup WHERE id = $1"
    ).bind(cup_id)
    .fetch_one(&mut *conn).await?;

    let mut bracket = load_bracket(conn, cup_id).await?;
    let advancement = advancement::advance_from(&mut bracket, number, &rules)?;
    for (position, reason) in advancement.incomplete.iter() {
        warn!("tie {position} of round {number} in cup {cup_id} not decided: {reason}");
    }

    save_slots(conn, &bracket).await?;
    save_winner(conn, cup_id, advancement.champion).await?;
    return Ok(advancement);
}

async fn is_generated(conn: &mut SqliteConnection, cup_id: CupId) -> Result<bool> {
    sqlx::query_scalar(
        "SELECT is_generated FROM Cup WHERE id = $1"
    ).bind(cup_id)
    .fetch_optional(&mut *conn).await?
    .found("cup")
}

pub(crate) async fn insert_teams(conn: &mut SqliteConnection, cup_id: CupId, teams: &[TeamId]) -> Result<()> {
    for (seed, team_id) in teams.iter().enumerate() {
        sqlx::query(
            "INSERT INTO CupTeam (cup_id, team_id, seed)
            VALUES ($1, $2, $3)"
        ).bind(cup_id)
        .bind(team_id)
        .bind(seed as u32 + 1)
        .execute(&mut *conn).await?;
    }
    Ok(())
}

// Build, resolve the byes of and save a bracket, then mark the cup generated.
pub(crate) async fn generate_bracket(conn: &mut SqliteConnection, cup_id: CupId, teams: &[TeamId], rules: &CupRules, rng: &mut StdRng) -> Result<Bracket> {
    let mut bracket = bracket::build(teams, rules, rng)?;
    advancement::advance(&mut bracket, 1, rules)?;
    insert_bracket(conn, cup_id, &mut bracket).await?;

    sqlx::query(
        "UPDATE Cup SET is_generated = TRUE
        WHERE id = $1"
    ).bind(cup_id)
    .execute(&mut *conn).await?;

    return Ok(bracket);
}

pub(crate) async fn load_bracket(conn: &mut SqliteConnection, cup_id: CupId) -> Result<Bracket> {
    let mut rounds: Vec<CupRound> = sqlx::query_as(
        "SELECT * FROM CupRound
        WHERE cup_id = $1
        ORDER BY round_number"
    ).bind(cup_id)
    .fetch_all(&mut *conn).await?;

    for round in rounds.iter_mut() {
        round.games = sqlx::query_as(
            "SELECT * FROM CupGame
            WHERE round_id = $1
            ORDER BY position, is_first_leg DESC"
        ).bind(round.id)
        .fetch_all(&mut *conn).await?;
    }

    return Ok(Bracket { rounds });
}

// Save a freshly built bracket, linking the two legs of every tie.
async fn insert_bracket(conn: &mut SqliteConnection, cup_id: CupId, bracket: &mut Bracket) -> Result<()> {
    for round in bracket.rounds.iter_mut() {
        round.cup_id = cup_id;
        round.id = sqlx::query_scalar(
            "INSERT INTO CupRound (cup_id, round_number, round_name)
            VALUES ($1, $2, $3)
            RETURNING id"
        ).bind(cup_id)
        .bind(round.number)
        .bind(round.name.as_str())
        .fetch_one(&mut *conn).await?;

        for game in round.games.iter_mut() {
            game.round_id = round.id;
            game.id = sqlx::query_scalar(
                "INSERT INTO CupGame (round_id, position, home_id, away_id, is_first_leg, is_fake, is_finished, winner_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id"
            ).bind(game.round_id)
            .bind(game.position)
            .bind(game.home_id)
            .bind(game.away_id)
            .bind(game.is_first_leg)
            .bind(game.is_fake)
            .bind(game.is_finished)
            .bind(game.winner_id)
            .fetch_one(&mut *conn).await?;
        }

        let links: Vec<(CupGameId, CupGameId)> = round.ties().iter()
            .filter_map(|tie| tie.second.map(|second| (tie.first.id, second.id)))
            .collect();

        // Each leg points at the other one.
        for (first_id, second_id) in links {
            for (id, other_id) in [(first_id, second_id), (second_id, first_id)] {
                sqlx::query(
                    "UPDATE CupGame SET return_game_id = $1
                    WHERE id = $2"
                ).bind(other_id)
                .bind(id)
                .execute(&mut *conn).await?;

                if let Some(game) = round.games.iter_mut().find(|g| g.id == id) {
                    game.return_game_id = Some(other_id);
                }
            }
        }
    }

    Ok(())
}

// Write the teams and winners of every game back.
async fn save_slots(conn: &mut SqliteConnection, bracket: &Bracket) -> Result<()> {
    for game in bracket.rounds.iter().flat_map(|r| r.games.iter()) {
        sqlx::query(
            "UPDATE CupGame SET home_id = $1, away_id = $2, winner_id = $3
            WHERE id = $4"
        ).bind(game.home_id)
        .bind(game.away_id)
        .bind(game.winner_id)
        .bind(game.id)
        .execute(&mut *conn).await?;
    }
    Ok(())
}

async fn save_winner(conn: &mut SqliteConnection, cup_id: CupId, winner_id: Option<TeamId>) -> Result<()> {
    sqlx::query(
        "UPDATE Cup SET winner_id = $1
        WHERE id = $2"
    ).bind(winner_id)
    .bind(cup_id)
    .execute(&mut *conn).await?;

    Ok(())
}
