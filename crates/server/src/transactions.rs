//! Transaction API endpoints
//!
//! A transaction is created against a named counterparty and named goods;
//! resolution of both happens inside the engine, so the handlers here only
//! translate between the wire types and the engine calls.

use api_types::transaction::{
    LineNew, LineView, TransactionListParams, TransactionNew, TransactionUpdate, TransactionView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::{LineRequest, Transaction, TransactionFilter};

fn direction_to_engine(direction: api_types::Direction) -> engine::Direction {
    match direction {
        api_types::Direction::Buy => engine::Direction::Buy,
        api_types::Direction::Sell => engine::Direction::Sell,
    }
}

fn direction_to_api(direction: engine::Direction) -> api_types::Direction {
    match direction {
        engine::Direction::Buy => api_types::Direction::Buy,
        engine::Direction::Sell => api_types::Direction::Sell,
    }
}

fn role_to_engine(role: api_types::CounterpartyRole) -> engine::CounterpartyRole {
    match role {
        api_types::CounterpartyRole::Hunter => engine::CounterpartyRole::Hunter,
        api_types::CounterpartyRole::Merchant => engine::CounterpartyRole::Merchant,
    }
}

fn role_to_api(role: engine::CounterpartyRole) -> api_types::CounterpartyRole {
    match role {
        engine::CounterpartyRole::Hunter => api_types::CounterpartyRole::Hunter,
        engine::CounterpartyRole::Merchant => api_types::CounterpartyRole::Merchant,
    }
}

fn requests(goods: &[LineNew]) -> Vec<LineRequest> {
    goods
        .iter()
        .map(|line| LineRequest {
            name: line.name.clone(),
            quantity: line.amount,
        })
        .collect()
}

fn view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        involved_type: role_to_api(tx.counterparty.role()),
        involved_id: tx.counterparty.id(),
        direction: direction_to_api(tx.counterparty.direction()),
        date: tx.occurred_at,
        total_value: tx.total_value,
        goods: tx
            .lines
            .into_iter()
            .map(|line| LineView {
                good_id: line.good_id,
                quantity: line.quantity,
            })
            .collect(),
    }
}

/// Handle requests for recording a new transaction.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let tx = state
        .engine
        .create_transaction(
            &requests(&payload.goods),
            &payload.involved_name,
            role_to_engine(payload.involved_type),
            direction_to_engine(payload.direction),
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(tx))))
}

/// Handle requests for listing transactions, newest first.
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<TransactionListParams>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let filter = TransactionFilter {
        involved_name: params.involved_name,
        direction: params.direction.map(direction_to_engine),
        from: params.from,
        to: params.to,
    };
    let txs = state.engine.list_transactions(&filter).await?;

    Ok(Json(txs.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id).await?;
    Ok(Json(view(tx)))
}

/// Handle requests for changing line quantities on a transaction.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .update_transaction(id, &requests(&payload.goods), Utc::now())
        .await?;
    Ok(Json(view(tx)))
}

/// Handle requests for deleting a transaction and reversing its stock
/// effect.
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.delete_transaction(id).await?;
    Ok(Json(view(tx)))
}
