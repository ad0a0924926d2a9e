// Statistics read from the recorded events.
use std::collections::BTreeMap;

use futures::TryStreamExt;
use sqlx::FromRow;

use crate::{error::Result, logic::{game::event::{Card, Goal}, league::Season, person::player::Player, stats::{CompetitionKind, CompetitionStats, LeaderRow, PlayerStats, SeasonStats}, types::{Db, SeasonId}}};

const LEADER_LIMIT: u32 = 10;

// Identify and name the competition an event was recorded in: league season, cup, or grouped cup.
fn labelled_events(table: &str, player_filter: &str) -> String {
    format!(
        "SELECT {table}.*,
            CASE WHEN Season.id IS NOT NULL THEN 'Season' WHEN Cup.id IS NOT NULL THEN 'Cup' ELSE 'GroupedCup' END AS kind,
            COALESCE(Season.id, Cup.id, GroupedCup.id) AS competition_id,
            COALESCE(League.name || ' ' || Season.name, Cup.name, GroupedCup.name) AS competition
        FROM {table}
        LEFT JOIN Game ON Game.id = {table}.game_id
        LEFT JOIN Matchday ON Matchday.id = Game.matchday_id
        LEFT JOIN Season ON Season.id = Matchday.season_id
        LEFT JOIN League ON League.id = Season.league_id
        LEFT JOIN CupGame ON CupGame.id = {table}.cup_game_id
        LEFT JOIN CupRound ON CupRound.id = CupGame.round_id
        LEFT JOIN Cup ON Cup.id = CupRound.cup_id
        LEFT JOIN PouleGame ON PouleGame.id = {table}.poule_game_id
        LEFT JOIN Poule ON Poule.id = PouleGame.poule_id
        LEFT JOIN GroupedCup ON GroupedCup.id = Poule.grouped_cup_id
        WHERE {player_filter}
        ORDER BY {table}.id"
    )
}

#[derive(FromRow)]
struct Label {
    kind: CompetitionKind,
    competition_id: u32,
    competition: String,
}

impl Label {
    fn key(&self) -> (CompetitionKind, u32) {
        (self.kind, self.competition_id)
    }
}

#[derive(FromRow)]
struct LabelledGoal {
    #[sqlx(flatten)]
    goal: Goal,
    #[sqlx(flatten)]
    label: Label,
}

#[derive(FromRow)]
struct LabelledCard {
    #[sqlx(flatten)]
    card: Card,
    #[sqlx(flatten)]
    label: Label,
}

#[derive(Default)]
struct Events {
    name: String,
    goals: Vec<Goal>,
    cards: Vec<Card>,
    man_of_the_match: u16,
}

impl Player {
    // Goals, assists, cards and awards of the player, per competition.
    pub async fn stats(&self, db: &Db) -> Result<Vec<CompetitionStats>> {
        let mut by_competition: BTreeMap<(CompetitionKind, u32), Events> = BTreeMap::new();

        let query = labelled_events("Goal", "Goal.scorer_id = $1 OR Goal.assist_id = $1");
        let mut goals = sqlx::query_as::<_, LabelledGoal>(&query)
            .bind(self.id)
            .fetch(db);
        while let Some(row) = goals.try_next().await? {
            events_of(&mut by_competition, row.label).goals.push(row.goal);
        }
        drop(goals);

        let query = labelled_events("Card", "Card.player_id = $1");
        let mut cards = sqlx::query_as::<_, LabelledCard>(&query)
            .bind(self.id)
            .fetch(db);
        while let Some(row) = cards.try_next().await? {
            events_of(&mut by_competition, row.label).cards.push(row.card);
        }
        drop(cards);

        let awards: Vec<(Label, u16)> = sqlx::query_as::<_, (CompetitionKind, u32, String, u16)>(
            "SELECT 'Season', Season.id, League.name || ' ' || Season.name, COUNT(*) FROM Game
            INNER JOIN Matchday ON Matchday.id = Game.matchday_id
            INNER JOIN Season ON Season.id = Matchday.season_id
            INNER JOIN League ON League.id = Season.league_id
            WHERE Game.man_of_the_match_id = $1
            GROUP BY Season.id"
        ).bind(self.id)
        .fetch_all(db).await?
        .into_iter()
        .map(|(kind, competition_id, competition, count)| (Label { kind, competition_id, competition }, count))
        .collect();
        for (label, count) in awards {
            events_of(&mut by_competition, label).man_of_the_match = count;
        }

        return Ok(by_competition.into_iter()
            .map(|((kind, competition_id), events)| CompetitionStats {
                kind,
                competition_id,
                stats: PlayerStats::tally(self.id, &events.goals, &events.cards, events.man_of_the_match),
                competition: events.name,
            })
            .collect());
    }
}

fn events_of(by_competition: &mut BTreeMap<(CompetitionKind, u32), Events>, label: Label) -> &mut Events {
    let events = by_competition.entry(label.key()).or_default();
    events.name = label.competition;
    return events;
}

impl Season {
    pub async fn top_scorers(db: &Db, id: SeasonId) -> Result<Vec<LeaderRow>> {
        Ok(sqlx::query_as(
            "SELECT Player.id AS player_id, Player.first_name, Player.last_name, Player.team_id, COUNT(*) AS total
            FROM Goal
            INNER JOIN Game ON Game.id = Goal.game_id
            INNER JOIN Matchday ON Matchday.id = Game.matchday_id
            INNER JOIN Player ON Player.id = Goal.scorer_id
            WHERE Matchday.season_id = $1 AND Goal.goal_type != 'OwnGoal'
            GROUP BY Player.id
            ORDER BY total DESC, Player.last_name, Player.first_name
            LIMIT $2"
        ).bind(id)
        .bind(LEADER_LIMIT)
        .fetch_all(db).await?)
    }

    pub async fn top_assists(db: &Db, id: SeasonId) -> Result<Vec<LeaderRow>> {
        Ok(sqlx::query_as(
            "SELECT Player.id AS player_id, Player.first_name, Player.last_name, Player.team_id, COUNT(*) AS total
            FROM Goal
            INNER JOIN Game ON Game.id = Goal.game_id
            INNER JOIN Matchday ON Matchday.id = Game.matchday_id
            INNER JOIN Player ON Player.id = Goal.assist_id
            WHERE Matchday.season_id = $1
            GROUP BY Player.id
            ORDER BY total DESC, Player.last_name, Player.first_name
            LIMIT $2"
        ).bind(id)
        .bind(LEADER_LIMIT)
        .fetch_all(db).await?)
    }

    pub async fn stats(&self, db: &Db) -> Result<SeasonStats> {
        Ok(SeasonStats {
            top_scorers: Self::top_scorers(db, self.id).await?,
            top_assists: Self::top_assists(db, self.id).await?,
        })
    }
}
