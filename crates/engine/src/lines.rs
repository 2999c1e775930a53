//! Transaction lines.
//!
//! A [`Line`] records how many units of one good moved in a
//! [`Transaction`](crate::Transaction). The line references the good, it does
//! not own it: deleting a transaction never deletes goods, it only reverses
//! their stock.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub good_id: Uuid,
    pub quantity: i64,
}

impl Line {
    pub fn new(transaction_id: Uuid, good_id: Uuid, quantity: i64) -> ResultEngine<Self> {
        if quantity < 1 {
            return Err(EngineError::Validation(
                "line quantity must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            transaction_id,
            good_id,
            quantity,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transaction_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub good_id: String,
    pub quantity: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Transactions,
    #[sea_orm(
        belongs_to = "super::goods::Entity",
        from = "Column::GoodId",
        to = "super::goods::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Goods,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::goods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Line> for ActiveModel {
    fn from(line: &Line) -> Self {
        Self {
            id: ActiveValue::Set(line.id.to_string()),
            transaction_id: ActiveValue::Set(line.transaction_id.to_string()),
            good_id: ActiveValue::Set(line.good_id.to_string()),
            quantity: ActiveValue::Set(line.quantity),
        }
    }
}

impl TryFrom<Model> for Line {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::Validation("invalid line id".to_string()))?,
            transaction_id: Uuid::parse_str(&model.transaction_id)
                .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?,
            good_id: Uuid::parse_str(&model.good_id)
                .map_err(|_| EngineError::KeyNotFound("good not exists".to_string()))?,
            quantity: model.quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity_rejected() {
        let err = Line::new(Uuid::new_v4(), Uuid::new_v4(), 0).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
