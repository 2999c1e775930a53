//! Goods API endpoints

use api_types::good::{GoodListParams, GoodNew, GoodUpdate, GoodView};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{Good, GoodChanges, GoodFilter};

fn material_to_engine(material: api_types::Material) -> engine::Material {
    match material {
        api_types::Material::Steel => engine::Material::Steel,
        api_types::Material::Wood => engine::Material::Wood,
        api_types::Material::Stone => engine::Material::Stone,
        api_types::Material::Iron => engine::Material::Iron,
        api_types::Material::Leather => engine::Material::Leather,
        api_types::Material::Cloth => engine::Material::Cloth,
        api_types::Material::Glass => engine::Material::Glass,
        api_types::Material::Bronze => engine::Material::Bronze,
        api_types::Material::Silver => engine::Material::Silver,
        api_types::Material::Gold => engine::Material::Gold,
        api_types::Material::Unknown => engine::Material::Unknown,
    }
}

fn material_to_api(material: engine::Material) -> api_types::Material {
    match material {
        engine::Material::Steel => api_types::Material::Steel,
        engine::Material::Wood => api_types::Material::Wood,
        engine::Material::Stone => api_types::Material::Stone,
        engine::Material::Iron => api_types::Material::Iron,
        engine::Material::Leather => api_types::Material::Leather,
        engine::Material::Cloth => api_types::Material::Cloth,
        engine::Material::Glass => api_types::Material::Glass,
        engine::Material::Bronze => api_types::Material::Bronze,
        engine::Material::Silver => api_types::Material::Silver,
        engine::Material::Gold => api_types::Material::Gold,
        engine::Material::Unknown => api_types::Material::Unknown,
    }
}

fn view(good: Good) -> GoodView {
    GoodView {
        id: good.id,
        name: good.name,
        description: good.description,
        material: material_to_api(good.material),
        weight: good.weight,
        stock: good.stock,
        value: good.value,
    }
}

/// Handle requests for adding a new good to the store.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GoodNew>,
) -> Result<(StatusCode, Json<GoodView>), ServerError> {
    let good = state
        .engine
        .new_good(
            &payload.name,
            &payload.description,
            material_to_engine(payload.material),
            payload.weight,
            payload.stock,
            payload.value,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(good))))
}

/// Handle requests for listing goods, honoring the optional filters.
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<GoodListParams>,
) -> Result<Json<Vec<GoodView>>, ServerError> {
    let filter = GoodFilter {
        name: params.name,
        description: params.description,
        material: params.material.map(material_to_engine),
    };
    let goods = state.engine.list_goods(&filter).await?;

    Ok(Json(goods.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoodView>, ServerError> {
    let good = state.engine.good(id).await?;
    Ok(Json(view(good)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GoodUpdate>,
) -> Result<Json<GoodView>, ServerError> {
    let changes = GoodChanges {
        name: payload.name,
        description: payload.description,
        material: payload.material.map(material_to_engine),
        weight: payload.weight,
        stock: payload.stock,
        value: payload.value,
    };
    let good = state.engine.update_good(id, changes).await?;
    Ok(Json(view(good)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoodView>, ServerError> {
    let good = state.engine.delete_good(id).await?;
    Ok(Json(view(good)))
}
