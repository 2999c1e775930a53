//! Merchants API endpoints

use api_types::merchant::{MerchantListParams, MerchantNew, MerchantUpdate, MerchantView};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{Merchant, MerchantChanges};

fn kind_to_engine(kind: api_types::MerchantKind) -> engine::MerchantKind {
    match kind {
        api_types::MerchantKind::Blacksmith => engine::MerchantKind::Blacksmith,
        api_types::MerchantKind::Alchemist => engine::MerchantKind::Alchemist,
        api_types::MerchantKind::Herbalist => engine::MerchantKind::Herbalist,
        api_types::MerchantKind::General => engine::MerchantKind::General,
        api_types::MerchantKind::Smuggler => engine::MerchantKind::Smuggler,
        api_types::MerchantKind::Unknown => engine::MerchantKind::Unknown,
    }
}

fn kind_to_api(kind: engine::MerchantKind) -> api_types::MerchantKind {
    match kind {
        engine::MerchantKind::Blacksmith => api_types::MerchantKind::Blacksmith,
        engine::MerchantKind::Alchemist => api_types::MerchantKind::Alchemist,
        engine::MerchantKind::Herbalist => api_types::MerchantKind::Herbalist,
        engine::MerchantKind::General => api_types::MerchantKind::General,
        engine::MerchantKind::Smuggler => api_types::MerchantKind::Smuggler,
        engine::MerchantKind::Unknown => api_types::MerchantKind::Unknown,
    }
}

fn view(merchant: Merchant) -> MerchantView {
    MerchantView {
        id: merchant.id,
        name: merchant.name,
        kind: kind_to_api(merchant.kind),
        location: merchant.location,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MerchantNew>,
) -> Result<(StatusCode, Json<MerchantView>), ServerError> {
    let merchant = state
        .engine
        .new_merchant(&payload.name, kind_to_engine(payload.kind), &payload.location)
        .await?;

    Ok((StatusCode::CREATED, Json(view(merchant))))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<MerchantListParams>,
) -> Result<Json<Vec<MerchantView>>, ServerError> {
    let merchants = state.engine.list_merchants(params.name.as_deref()).await?;
    Ok(Json(merchants.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MerchantView>, ServerError> {
    let merchant = state.engine.merchant(id).await?;
    Ok(Json(view(merchant)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MerchantUpdate>,
) -> Result<Json<MerchantView>, ServerError> {
    let changes = MerchantChanges {
        name: payload.name,
        kind: payload.kind.map(kind_to_engine),
        location: payload.location,
    };
    let merchant = state.engine.update_merchant(id, changes).await?;
    Ok(Json(view(merchant)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MerchantView>, ServerError> {
    let merchant = state.engine.delete_merchant(id).await?;
    Ok(Json(view(merchant)))
}
