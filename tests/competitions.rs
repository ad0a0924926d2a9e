use league_manager_lib::{db, error::Error, logic::{competition::{cup::{Cup, CupGame, CupRules}, grouped_cup::{GroupFormat, GroupedCup, PouleGame}}, game::{event::Goal, Game, Score}, league::{League, Season}, person::player::Player, stats::CompetitionKind, team::Team, types::{Db, TeamId}}};
use rand::{rngs::StdRng, SeedableRng};

async fn teams(db: &Db, count: usize) -> Vec<TeamId> {
    let mut ids = Vec::new();
    for i in 1..=count {
        let mut team = Team::build(&format!("Team {i}"));
        team.save(db).await.unwrap();
        ids.push(team.id);
    }
    ids
}

// Enter a home win for every unplayed game of a round.
async fn play_round(db: &Db, games: &[CupGame]) {
    for game in games.iter().filter(|g| !g.is_fake) {
        CupGame::update_result(db, game.id, &Score::build(2, 0, true)).await.unwrap();
    }
}

#[tokio::test]
async fn a_cup_is_played_to_the_end() {
    let db = db::memory().await.unwrap();
    let ids = teams(&db, 4).await;

    let mut cup = Cup::build("Spring Cup", CupRules::build(4, false, None, 1, false));
    cup.save(&db).await.unwrap();
    cup.set_teams(&db, &ids).await.unwrap();

    let bracket = cup.generate(&db, &mut StdRng::seed_from_u64(1)).await.unwrap();
    assert_eq!(bracket.rounds.len(), 2);
    assert_eq!(bracket.rounds[0].games.len(), 2);

    play_round(&db, &bracket.rounds[0].games).await;

    // Winning the first round moves both home teams into the final.
    let bracket = cup.bracket(&db).await.unwrap();
    let semi_winners: Vec<Option<TeamId>> = bracket.rounds[0].games.iter().map(|g| g.home_id).collect();
    let final_game = &bracket.rounds[1].games[0];
    assert_eq!(vec![final_game.home_id, final_game.away_id], semi_winners);

    CupGame::update_result(&db, final_game.id, &Score::build(1, 0, true)).await.unwrap();
    let cup = Cup::fetch_from_db(&db, cup.id).await.unwrap();
    assert_eq!(cup.winner_id, final_game.home_id);
}

#[tokio::test]
async fn byes_go_straight_through() {
    let db = db::memory().await.unwrap();
    let ids = teams(&db, 3).await;

    let mut cup = Cup::build("Odd Cup", CupRules::build(3, false, None, 1, false));
    cup.save(&db).await.unwrap();
    cup.set_teams(&db, &ids).await.unwrap();
    let bracket = cup.generate(&db, &mut StdRng::seed_from_u64(2)).await.unwrap();

    let byes: Vec<&CupGame> = bracket.rounds[0].games.iter().filter(|g| g.is_fake).collect();
    assert_eq!(byes.len(), 1);

    let stored = cup.bracket(&db).await.unwrap();
    let final_game = &stored.rounds[1].games[0];
    let through = byes[0].winner_id;
    assert!(final_game.home_id == through || final_game.away_id == through);

    // Byes take no results.
    let result = CupGame::update_result(&db, byes[0].id, &Score::build(1, 0, true)).await;
    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
}

#[tokio::test]
async fn a_generated_cup_keeps_its_teams() {
    let db = db::memory().await.unwrap();
    let ids = teams(&db, 2).await;

    let mut cup = Cup::build("Final Only", CupRules::build(2, false, None, 1, false));
    cup.save(&db).await.unwrap();
    cup.set_teams(&db, &ids).await.unwrap();
    cup.generate(&db, &mut StdRng::seed_from_u64(3)).await.unwrap();

    assert!(matches!(cup.set_teams(&db, &ids[..1]).await, Err(Error::InvalidConfiguration(_))));
    assert!(matches!(cup.generate(&db, &mut StdRng::seed_from_u64(3)).await, Err(Error::InvalidConfiguration(_))));
}

#[tokio::test]
async fn a_grouped_cup_ends_in_a_knockout() {
    let db = db::memory().await.unwrap();
    let ids = teams(&db, 8).await;

    let format = GroupFormat { no_of_teams: 8, no_of_groups: 2, qualifiers_per_group: 2, ..Default::default() };
    let mut grouped_cup = GroupedCup::build("Winter Cup", format, Vec::new());
    grouped_cup.save(&db).await.unwrap();
    grouped_cup.set_teams(&db, &ids).await.unwrap();

    let mut rng = StdRng::seed_from_u64(4);
    let poules = grouped_cup.generate(&db, &mut rng).await.unwrap();
    assert_eq!(poules.len(), 2);
    assert!(poules.iter().all(|p| p.games.len() == 6));

    // The knockout cannot start while group games are unplayed.
    let early = grouped_cup.finalize(&db, &mut rng).await;
    assert!(matches!(early, Err(Error::IncompleteResult(_))));

    for poule in poules.iter() {
        for game in poule.games.iter() {
            PouleGame::update_result(&db, game.id, &Score::build(1, 0, true)).await.unwrap();
        }
    }

    let knockout = grouped_cup.finalize(&db, &mut rng).await.unwrap();
    assert_eq!(knockout.grouped_cup_id, Some(grouped_cup.id));
    assert_eq!(knockout.team_ids(&db).await.unwrap().len(), 4);
    assert_eq!(knockout.bracket(&db).await.unwrap().rounds.len(), 2);

    assert!(matches!(grouped_cup.finalize(&db, &mut rng).await, Err(Error::InvalidConfiguration(_))));
}

#[tokio::test]
async fn goals_update_the_score_and_table() {
    let db = db::memory().await.unwrap();
    let ids = teams(&db, 2).await;

    let mut league = League::build("Premier");
    league.save(&db).await.unwrap();
    let mut season = Season::build(league.id, "2025-2026");
    season.save(&db).await.unwrap();
    season.generate_schedule(&db, &ids, 1, None).await.unwrap();

    let mut game: Game = season.games(&db).await.unwrap().remove(0);
    let mut goal = Goal { game_id: Some(game.id), team_id: game.home_id, ..Default::default() };
    goal.record(&db).await.unwrap();

    let stored = Game::fetch_from_db(&db, game.id).await.unwrap();
    assert_eq!((stored.home_goals, stored.away_goals), (1, 0));

    game = stored;
    game.is_finished = true;
    game.update(&db).await.unwrap();
    let table = season.standings(&db).await.unwrap();
    assert_eq!(table[0].team_id, game.home_id);
    assert_eq!(table[0].points, 3);

    Goal::remove(&db, goal.id).await.unwrap();
    let stored = Game::fetch_from_db(&db, game.id).await.unwrap();
    assert_eq!(stored.home_goals, 0);

    // Only the two teams of the match can score in it.
    let mut stray = Goal { game_id: Some(game.id), team_id: 999, ..Default::default() };
    assert!(matches!(stray.record(&db).await, Err(Error::Validation(_))));
}

#[tokio::test]
async fn both_legs_point_at_each_other() {
    let db = db::memory().await.unwrap();
    let ids = teams(&db, 2).await;

    let mut cup = Cup::build("Home and Away", CupRules::build(2, false, None, 2, false));
    cup.save(&db).await.unwrap();
    cup.set_teams(&db, &ids).await.unwrap();
    let bracket = cup.generate(&db, &mut StdRng::seed_from_u64(5)).await.unwrap();

    let stored = cup.bracket(&db).await.unwrap();
    for games in [&bracket.rounds[0].games, &stored.rounds[0].games] {
        let first = games.iter().find(|g| g.is_first_leg).unwrap();
        let second = games.iter().find(|g| !g.is_first_leg).unwrap();
        assert_eq!(first.return_game_id, Some(second.id));
        assert_eq!(second.return_game_id, Some(first.id));
    }
}

#[tokio::test]
async fn a_drawn_tie_does_not_hold_up_the_rest_of_the_round() {
    let db = db::memory().await.unwrap();
    let ids = teams(&db, 4).await;

    let mut cup = Cup::build("Win Only", CupRules::build(4, false, None, 1, true));
    cup.save(&db).await.unwrap();
    cup.set_teams(&db, &ids).await.unwrap();
    let bracket = cup.generate(&db, &mut StdRng::seed_from_u64(6)).await.unwrap();
    let (drawn, decided) = (&bracket.rounds[0].games[0], &bracket.rounds[0].games[1]);

    // Level without a shootout: saved, but nobody goes through.
    let stored = CupGame::update_result(&db, drawn.id, &Score::build(1, 1, true)).await.unwrap();
    assert!(stored.is_finished);
    assert_eq!(stored.winner_id, None);

    CupGame::update_result(&db, decided.id, &Score::build(2, 0, true)).await.unwrap();
    let final_game = cup.bracket(&db).await.unwrap().rounds[1].games[0].clone();
    assert_eq!((final_game.home_id, final_game.away_id), (None, decided.home_id));

    // The shootout settles it.
    let shootout = Score { home_penalties: Some(4), away_penalties: Some(3), ..Score::build(1, 1, true) };
    CupGame::update_result(&db, drawn.id, &shootout).await.unwrap();
    let final_game = cup.bracket(&db).await.unwrap().rounds[1].games[0].clone();
    assert_eq!((final_game.home_id, final_game.away_id), (drawn.home_id, decided.home_id));
}

#[tokio::test]
async fn reopening_the_final_takes_the_title_back() {
    let db = db::memory().await.unwrap();
    let ids = teams(&db, 2).await;

    let mut cup = Cup::build("Reopened", CupRules::build(2, false, None, 1, false));
    cup.save(&db).await.unwrap();
    cup.set_teams(&db, &ids).await.unwrap();
    let bracket = cup.generate(&db, &mut StdRng::seed_from_u64(7)).await.unwrap();
    let final_game = &bracket.rounds[0].games[0];

    CupGame::update_result(&db, final_game.id, &Score::build(3, 1, true)).await.unwrap();
    assert_eq!(Cup::fetch_from_db(&db, cup.id).await.unwrap().winner_id, final_game.home_id);

    let stored = CupGame::update_result(&db, final_game.id, &Score::build(0, 0, false)).await.unwrap();
    assert_eq!(stored.winner_id, None);
    assert_eq!(Cup::fetch_from_db(&db, cup.id).await.unwrap().winner_id, None);
}

#[tokio::test]
async fn cup_goals_change_who_goes_through() {
    let db = db::memory().await.unwrap();
    let ids = teams(&db, 2).await;

    let mut cup = Cup::build("Late Drama", CupRules::build(2, false, None, 1, false));
    cup.save(&db).await.unwrap();
    cup.set_teams(&db, &ids).await.unwrap();
    let bracket = cup.generate(&db, &mut StdRng::seed_from_u64(8)).await.unwrap();
    let final_game = bracket.rounds[0].games[0].clone();
    let away_id = final_game.away_id.unwrap();

    CupGame::update_result(&db, final_game.id, &Score::build(1, 0, true)).await.unwrap();
    assert_eq!(Cup::fetch_from_db(&db, cup.id).await.unwrap().winner_id, final_game.home_id);

    let mut goals = Vec::new();
    for _ in 0..2 {
        let mut goal = Goal { cup_game_id: Some(final_game.id), team_id: away_id, ..Default::default() };
        goal.record(&db).await.unwrap();
        goals.push(goal);
    }

    let stored = CupGame::fetch_from_db(&db, final_game.id).await.unwrap();
    assert_eq!((stored.home_goals, stored.away_goals), (1, 2));
    assert_eq!(stored.winner_id, Some(away_id));
    assert_eq!(Cup::fetch_from_db(&db, cup.id).await.unwrap().winner_id, Some(away_id));

    // Taking one back leaves a draw, which nobody wins without a shootout.
    Goal::remove(&db, goals[1].id).await.unwrap();
    assert_eq!(Cup::fetch_from_db(&db, cup.id).await.unwrap().winner_id, None);
}

#[tokio::test]
async fn group_winners_meet_runners_up_from_the_other_group() {
    let db = db::memory().await.unwrap();
    let ids = teams(&db, 8).await;

    // Without a random draw, even places go to group A and odd places to group B.
    let format = GroupFormat { no_of_teams: 8, no_of_groups: 2, qualifiers_per_group: 2, ..Default::default() };
    let mut grouped_cup = GroupedCup::build("Seeded Cup", format, Vec::new());
    grouped_cup.save(&db).await.unwrap();
    grouped_cup.set_teams(&db, &ids).await.unwrap();

    let mut rng = StdRng::seed_from_u64(9);
    let poules = grouped_cup.generate(&db, &mut rng).await.unwrap();

    // The team added first always wins, so each group finishes in the order its teams were added.
    for game in poules.iter().flat_map(|p| p.games.iter()) {
        let score = match game.home_id < game.away_id {
            true => Score::build(1, 0, true),
            false => Score::build(0, 1, true),
        };
        PouleGame::update_result(&db, game.id, &score).await.unwrap();
    }

    let stored: Vec<Vec<TeamId>> = grouped_cup.poules(&db).await.unwrap().iter()
        .map(|p| p.standings.iter().map(|s| s.team_id).collect())
        .collect();
    assert_eq!(stored[0], vec![ids[0], ids[2], ids[4], ids[6]]);
    assert_eq!(stored[1], vec![ids[1], ids[3], ids[5], ids[7]]);

    let knockout = grouped_cup.finalize(&db, &mut rng).await.unwrap();
    assert_eq!(knockout.team_ids(&db).await.unwrap(), vec![ids[0], ids[1], ids[2], ids[3]]);

    let first_round = &knockout.bracket(&db).await.unwrap().rounds[0];
    let ties: Vec<(Option<TeamId>, Option<TeamId>)> = first_round.games.iter().map(|g| (g.home_id, g.away_id)).collect();
    assert_eq!(ties, vec![(Some(ids[0]), Some(ids[3])), (Some(ids[1]), Some(ids[2]))]);
}

#[tokio::test]
async fn cups_with_the_same_name_keep_separate_stats() {
    let db = db::memory().await.unwrap();
    let ids = teams(&db, 2).await;

    let mut player = Player::build("Anna", "Virtanen");
    player.team_id = Some(ids[0]);
    player.save(&db).await.unwrap();

    let mut cup_ids = Vec::new();
    for (seed, goals) in [(10, 1), (11, 2)] {
        let mut cup = Cup::build("Charity Shield", CupRules::build(2, false, None, 1, false));
        cup.save(&db).await.unwrap();
        cup.set_teams(&db, &ids).await.unwrap();
        let bracket = cup.generate(&db, &mut StdRng::seed_from_u64(seed)).await.unwrap();
        let final_game = &bracket.rounds[0].games[0];

        for _ in 0..goals {
            let mut goal = Goal { cup_game_id: Some(final_game.id), team_id: ids[0], scorer_id: Some(player.id), ..Default::default() };
            goal.record(&db).await.unwrap();
        }
        cup_ids.push(cup.id);
    }

    let stats = player.stats(&db).await.unwrap();
    assert_eq!(stats.len(), 2);
    assert!(stats.iter().all(|s| s.kind == CompetitionKind::Cup && s.competition == "Charity Shield"));

    let goals: Vec<(u32, u16)> = stats.iter().map(|s| (s.competition_id, s.stats.goals)).collect();
    assert_eq!(goals, vec![(cup_ids[0], 1), (cup_ids[1], 2)]);
}
