use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod goods;
mod hunters;
mod merchants;
mod server;
mod transactions;

pub mod types {
    pub mod good {
        pub use api_types::good::{GoodListParams, GoodNew, GoodUpdate, GoodView};
    }

    pub mod hunter {
        pub use api_types::hunter::{HunterListParams, HunterNew, HunterUpdate, HunterView};
    }

    pub mod merchant {
        pub use api_types::merchant::{
            MerchantListParams, MerchantNew, MerchantUpdate, MerchantView,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{
            LineNew, LineView, TransactionListParams, TransactionNew, TransactionUpdate,
            TransactionView,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
pub(crate) struct Error {
    pub(crate) error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) | EngineError::NoProcessableGoods => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidRoleDirection(_)
        | EngineError::InsufficientStock(_)
        | EngineError::IrreversibleDelete(_)
        | EngineError::NoUpdateApplied
        | EngineError::Validation(_)
        | EngineError::StockConflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_no_processable_goods_maps_to_404() {
        let res = ServerError::from(EngineError::NoProcessableGoods).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_role_direction_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidRoleDirection(
            "merchant cannot buy".to_string(),
        ))
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_insufficient_stock_maps_to_422() {
        let res =
            ServerError::from(EngineError::InsufficientStock("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_irreversible_delete_maps_to_422() {
        let res =
            ServerError::from(EngineError::IrreversibleDelete("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
