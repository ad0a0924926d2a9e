use axum::{extract::{Path, State}, http::StatusCode, routing::{get, post, put}, Json, Router};
use serde::Deserialize;

use crate::{error::Result, logic::{competition::{cup::{advancement::Advancement, Bracket, Cup, CupGame, CupRules}, grouped_cup::{GroupFormat, GroupedCup, Poule, PouleGame}, ranking::RankCriteria, template::{CupTemplate, GroupedCupTemplate}}, game::Score, types::{CupGameId, CupId, CupRoundId, GroupedCupId, PouleGameId, TeamId, TemplateId}}, routes::{draw_rng, AppState}};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cups", get(list_cups).post(create_cup))
        .route("/cups/:id", put(update_cup).delete(delete_cup))
        .route("/cups/:id/teams", get(cup_teams).put(set_cup_teams))
        .route("/cups/:id/generate", post(generate_cup))
        .route("/cups/:id/rounds/:round_id/advance", post(advance_round))
        .route("/cups/:id/recompute", post(recompute_cup))
        .route("/cup-games/:id", put(update_cup_game))
        .route("/cup-templates", get(list_cup_templates).post(create_cup_template))
        .route("/cup-templates/:id", put(update_cup_template).delete(delete_cup_template))
        .route("/cup-templates/:id/instantiate", post(instantiate_cup_template))
        .route("/grouped-cups", get(list_grouped_cups).post(create_grouped_cup))
        .route("/grouped-cups/:id", put(update_grouped_cup).delete(delete_grouped_cup))
        .route("/grouped-cups/:id/teams", get(grouped_cup_teams).put(set_grouped_cup_teams))
        .route("/grouped-cups/:id/generate", post(generate_grouped_cup))
        .route("/grouped-cups/:id/finalize", post(finalize_grouped_cup))
        .route("/poule-games/:id", put(update_poule_game))
        .route("/grouped-cup-templates", get(list_grouped_cup_templates).post(create_grouped_cup_template))
        .route("/grouped-cup-templates/:id", put(update_grouped_cup_template).delete(delete_grouped_cup_template))
        .route("/grouped-cup-templates/:id/instantiate", post(instantiate_grouped_cup_template))
}

#[derive(Deserialize)]
struct CupForm {
    name: String,
    #[serde(flatten)]
    rules: CupRules,
}

#[derive(Deserialize)]
struct GroupedCupForm {
    name: String,
    format: GroupFormat,
    #[serde(default)]
    rank_criteria: Vec<RankCriteria>,
}

#[derive(Deserialize)]
struct TeamsForm {
    teams: Vec<TeamId>,
}

#[derive(Deserialize)]
struct NameForm {
    name: String,
}

// Cups.

async fn list_cups(State(state): State<AppState>) -> Result<Json<Vec<Cup>>> {
    Ok(Json(Cup::fetch_all(&state.db).await?))
}

async fn create_cup(State(state): State<AppState>, Json(form): Json<CupForm>) -> Result<(StatusCode, Json<Cup>)> {
    let mut cup = Cup::build(&form.name, form.rules);
    cup.save(&state.db).await?;
    Ok((StatusCode::CREATED, Json(cup)))
}

async fn update_cup(State(state): State<AppState>, Path(id): Path<CupId>, Json(form): Json<CupForm>) -> Result<Json<Cup>> {
    let mut cup = Cup::fetch_from_db(&state.db, id).await?;
    cup.name = form.name;
    cup.rules = form.rules;
    cup.update(&state.db).await?;
    Ok(Json(cup))
}

async fn delete_cup(State(state): State<AppState>, Path(id): Path<CupId>) -> Result<StatusCode> {
    Cup::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cup_teams(State(state): State<AppState>, Path(id): Path<CupId>) -> Result<Json<Vec<TeamId>>> {
    let cup = Cup::fetch_from_db(&state.db, id).await?;
    Ok(Json(cup.team_ids(&state.db).await?))
}

async fn set_cup_teams(State(state): State<AppState>, Path(id): Path<CupId>, Json(form): Json<TeamsForm>) -> Result<StatusCode> {
    let cup = Cup::fetch_from_db(&state.db, id).await?;
    cup.set_teams(&state.db, &form.teams).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn generate_cup(State(state): State<AppState>, Path(id): Path<CupId>) -> Result<(StatusCode, Json<Bracket>)> {
    let mut cup = Cup::fetch_from_db(&state.db, id).await?;
    let bracket = cup.generate(&state.db, &mut draw_rng()).await?;
    Ok((StatusCode::CREATED, Json(bracket)))
}

async fn advance_round(State(state): State<AppState>, Path((id, round_id)): Path<(CupId, CupRoundId)>) -> Result<Json<Advancement>> {
    let mut cup = Cup::fetch_from_db(&state.db, id).await?;
    Ok(Json(cup.advance_round(&state.db, round_id).await?))
}

async fn recompute_cup(State(state): State<AppState>, Path(id): Path<CupId>) -> Result<Json<Cup>> {
    let mut cup = Cup::fetch_from_db(&state.db, id).await?;
    cup.recompute(&state.db).await?;
    Ok(Json(cup))
}

async fn update_cup_game(State(state): State<AppState>, Path(id): Path<CupGameId>, Json(score): Json<Score>) -> Result<Json<CupGame>> {
    Ok(Json(CupGame::update_result(&state.db, id, &score).await?))
}

// Cup templates.

async fn list_cup_templates(State(state): State<AppState>) -> Result<Json<Vec<CupTemplate>>> {
    Ok(Json(CupTemplate::fetch_all(&state.db).await?))
}

async fn create_cup_template(State(state): State<AppState>, Json(mut template): Json<CupTemplate>) -> Result<(StatusCode, Json<CupTemplate>)> {
    template.save(&state.db).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

async fn update_cup_template(State(state): State<AppState>, Path(id): Path<TemplateId>, Json(mut template): Json<CupTemplate>) -> Result<Json<CupTemplate>> {
    template.id = id;
    template.update(&state.db).await?;
    Ok(Json(template))
}

async fn delete_cup_template(State(state): State<AppState>, Path(id): Path<TemplateId>) -> Result<StatusCode> {
    CupTemplate::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn instantiate_cup_template(State(state): State<AppState>, Path(id): Path<TemplateId>, Json(form): Json<NameForm>) -> Result<(StatusCode, Json<Cup>)> {
    let template = CupTemplate::fetch_from_db(&state.db, id).await?;
    Ok((StatusCode::CREATED, Json(template.create_cup(&state.db, &form.name).await?)))
}

// Grouped cups.

async fn list_grouped_cups(State(state): State<AppState>) -> Result<Json<Vec<GroupedCup>>> {
    Ok(Json(GroupedCup::fetch_all(&state.db).await?))
}

async fn create_grouped_cup(State(state): State<AppState>, Json(form): Json<GroupedCupForm>) -> Result<(StatusCode, Json<GroupedCup>)> {
    let mut grouped_cup = GroupedCup::build(&form.name, form.format, form.rank_criteria);
    grouped_cup.save(&state.db).await?;
    Ok((StatusCode::CREATED, Json(grouped_cup)))
}

async fn update_grouped_cup(State(state): State<AppState>, Path(id): Path<GroupedCupId>, Json(form): Json<GroupedCupForm>) -> Result<Json<GroupedCup>> {
    let mut grouped_cup = GroupedCup::fetch_from_db(&state.db, id).await?;
    grouped_cup.name = form.name;
    grouped_cup.format = form.format;
    if !form.rank_criteria.is_empty() {
        grouped_cup.rank_criteria = form.rank_criteria;
    }
    grouped_cup.update(&state.db).await?;
    Ok(Json(grouped_cup))
}

async fn delete_grouped_cup(State(state): State<AppState>, Path(id): Path<GroupedCupId>) -> Result<StatusCode> {
    GroupedCup::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn grouped_cup_teams(State(state): State<AppState>, Path(id): Path<GroupedCupId>) -> Result<Json<Vec<TeamId>>> {
    let grouped_cup = GroupedCup::fetch_from_db(&state.db, id).await?;
    Ok(Json(grouped_cup.team_ids(&state.db).await?))
}

async fn set_grouped_cup_teams(State(state): State<AppState>, Path(id): Path<GroupedCupId>, Json(form): Json<TeamsForm>) -> Result<StatusCode> {
    let grouped_cup = GroupedCup::fetch_from_db(&state.db, id).await?;
    grouped_cup.set_teams(&state.db, &form.teams).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn generate_grouped_cup(State(state): State<AppState>, Path(id): Path<GroupedCupId>) -> Result<(StatusCode, Json<Vec<Poule>>)> {
    let mut grouped_cup = GroupedCup::fetch_from_db(&state.db, id).await?;
    let poules = grouped_cup.generate(&state.db, &mut draw_rng()).await?;
    Ok((StatusCode::CREATED, Json(poules)))
}

async fn finalize_grouped_cup(State(state): State<AppState>, Path(id): Path<GroupedCupId>) -> Result<(StatusCode, Json<Cup>)> {
    let mut grouped_cup = GroupedCup::fetch_from_db(&state.db, id).await?;
    let knockout = grouped_cup.finalize(&state.db, &mut draw_rng()).await?;
    Ok((StatusCode::CREATED, Json(knockout)))
}

async fn update_poule_game(State(state): State<AppState>, Path(id): Path<PouleGameId>, Json(score): Json<Score>) -> Result<Json<PouleGame>> {
    Ok(Json(PouleGame::update_result(&state.db, id, &score).await?))
}

// Grouped cup templates.

async fn list_grouped_cup_templates(State(state): State<AppState>) -> Result<Json<Vec<GroupedCupTemplate>>> {
    Ok(Json(GroupedCupTemplate::fetch_all(&state.db).await?))
}

async fn create_grouped_cup_template(State(state): State<AppState>, Json(mut template): Json<GroupedCupTemplate>) -> Result<(StatusCode, Json<GroupedCupTemplate>)> {
    template.save(&state.db).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

async fn update_grouped_cup_template(State(state): State<AppState>, Path(id): Path<TemplateId>, Json(mut template): Json<GroupedCupTemplate>) -> Result<Json<GroupedCupTemplate>> {
    template.id = id;
    template.update(&state.db).await?;
    Ok(Json(template))
}

async fn delete_grouped_cup_template(State(state): State<AppState>, Path(id): Path<TemplateId>) -> Result<StatusCode> {
    GroupedCupTemplate::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn instantiate_grouped_cup_template(State(state): State<AppState>, Path(id): Path<TemplateId>, Json(form): Json<NameForm>) -> Result<(StatusCode, Json<GroupedCup>)> {
    let template = GroupedCupTemplate::fetch_from_db(&state.db, id).await?;
    Ok((StatusCode::CREATED, Json(template.create_grouped_cup(&state.db, &form.name).await?)))
}
