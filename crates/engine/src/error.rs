//! The module contains the errors the engine can throw.
//!
//! The transaction ledger surfaces:
//!
//! - [`InvalidRoleDirection`] when a hunter tries to sell or a merchant to buy.
//! - [`NoProcessableGoods`] when none of the requested goods lines resolved.
//! - [`InsufficientStock`] when a quantity update would drive stock negative.
//! - [`IrreversibleDelete`] when undoing a sell would drive stock negative.
//! - [`NoUpdateApplied`] when an update request changed nothing.
//!
//!  [`InvalidRoleDirection`]: EngineError::InvalidRoleDirection
//!  [`NoProcessableGoods`]: EngineError::NoProcessableGoods
//!  [`InsufficientStock`]: EngineError::InsufficientStock
//!  [`IrreversibleDelete`]: EngineError::IrreversibleDelete
//!  [`NoUpdateApplied`]: EngineError::NoUpdateApplied
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("A hunter can only buy and a merchant can only sell: {0}")]
    InvalidRoleDirection(String),
    #[error("No goods could be processed for this transaction")]
    NoProcessableGoods,
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),
    #[error("Deleting would leave negative stock: {0}")]
    IrreversibleDelete(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Update did not modify any transaction line")]
    NoUpdateApplied,
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Concurrent stock change detected: {0}")]
    StockConflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidRoleDirection(a), Self::InvalidRoleDirection(b)) => a == b,
            (Self::NoProcessableGoods, Self::NoProcessableGoods) => true,
            (Self::InsufficientStock(a), Self::InsufficientStock(b)) => a == b,
            (Self::IrreversibleDelete(a), Self::IrreversibleDelete(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::NoUpdateApplied, Self::NoUpdateApplied) => true,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::StockConflict(a), Self::StockConflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
