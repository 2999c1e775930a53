//! Hunters API endpoints

use api_types::hunter::{HunterListParams, HunterNew, HunterUpdate, HunterView};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{Hunter, HunterChanges};

fn race_to_engine(race: api_types::Race) -> engine::Race {
    match race {
        api_types::Race::Human => engine::Race::Human,
        api_types::Race::Elf => engine::Race::Elf,
        api_types::Race::Dwarf => engine::Race::Dwarf,
        api_types::Race::Halfling => engine::Race::Halfling,
        api_types::Race::Sorcerer => engine::Race::Sorcerer,
        api_types::Race::Unknown => engine::Race::Unknown,
    }
}

fn race_to_api(race: engine::Race) -> api_types::Race {
    match race {
        engine::Race::Human => api_types::Race::Human,
        engine::Race::Elf => api_types::Race::Elf,
        engine::Race::Dwarf => api_types::Race::Dwarf,
        engine::Race::Halfling => api_types::Race::Halfling,
        engine::Race::Sorcerer => api_types::Race::Sorcerer,
        engine::Race::Unknown => api_types::Race::Unknown,
    }
}

fn view(hunter: Hunter) -> HunterView {
    HunterView {
        id: hunter.id,
        name: hunter.name,
        race: race_to_api(hunter.race),
        location: hunter.location,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<HunterNew>,
) -> Result<(StatusCode, Json<HunterView>), ServerError> {
    let hunter = state
        .engine
        .new_hunter(&payload.name, race_to_engine(payload.race), &payload.location)
        .await?;

    Ok((StatusCode::CREATED, Json(view(hunter))))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<HunterListParams>,
) -> Result<Json<Vec<HunterView>>, ServerError> {
    let hunters = state.engine.list_hunters(params.name.as_deref()).await?;
    Ok(Json(hunters.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HunterView>, ServerError> {
    let hunter = state.engine.hunter(id).await?;
    Ok(Json(view(hunter)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<HunterUpdate>,
) -> Result<Json<HunterView>, ServerError> {
    let changes = HunterChanges {
        name: payload.name,
        race: payload.race.map(race_to_engine),
        location: payload.location,
    };
    let hunter = state.engine.update_hunter(id, changes).await?;
    Ok(Json(view(hunter)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HunterView>, ServerError> {
    let hunter = state.engine.delete_hunter(id).await?;
    Ok(Json(view(hunter)))
}
