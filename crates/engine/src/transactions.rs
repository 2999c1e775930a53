//! Transaction primitives.
//!
//! A `Transaction` is one completed exchange between the trading post and a
//! counterparty. It changes good stock via one or more
//! [`Line`](crate::lines::Line)s.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

use super::lines;

/// Direction of an exchange, seen from the trading post.
///
/// A buy removes stock from the post (a hunter acquires goods); a sell adds
/// stock (a merchant supplies goods).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(EngineError::Validation(format!(
                "invalid direction: {other}"
            ))),
        }
    }
}

/// Declared role of the counterparty in an incoming request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterpartyRole {
    Hunter,
    Merchant,
}

impl CounterpartyRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hunter => "hunter",
            Self::Merchant => "merchant",
        }
    }
}

impl TryFrom<&str> for CounterpartyRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "hunter" => Ok(Self::Hunter),
            "merchant" => Ok(Self::Merchant),
            other => Err(EngineError::Validation(format!(
                "invalid counterparty role: {other}"
            ))),
        }
    }
}

/// Resolved reference to the hunter or merchant side of a transaction.
///
/// The variant carries the direction with it: a hunter only ever buys and a
/// merchant only ever sells, so an invalid pairing cannot be constructed once
/// resolution has happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Counterparty {
    Hunter { hunter_id: Uuid },
    Merchant { merchant_id: Uuid },
}

impl Counterparty {
    pub fn role(self) -> CounterpartyRole {
        match self {
            Self::Hunter { .. } => CounterpartyRole::Hunter,
            Self::Merchant { .. } => CounterpartyRole::Merchant,
        }
    }

    /// The direction implied by the counterparty role.
    pub fn direction(self) -> Direction {
        match self {
            Self::Hunter { .. } => Direction::Buy,
            Self::Merchant { .. } => Direction::Sell,
        }
    }

    pub fn id(self) -> Uuid {
        match self {
            Self::Hunter { hunter_id } => hunter_id,
            Self::Merchant { merchant_id } => merchant_id,
        }
    }
}

/// One completed exchange.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub counterparty: Counterparty,
    pub occurred_at: DateTime<Utc>,
    /// Derived sum of `quantity * good.value` over the resolved lines, using
    /// each good's unit value at resolution time. Never client-supplied.
    pub total_value: i64,
    pub lines: Vec<lines::Line>,
}

impl Transaction {
    pub fn new(
        counterparty: Counterparty,
        occurred_at: DateTime<Utc>,
        total_value: i64,
    ) -> ResultEngine<Self> {
        if total_value < 0 {
            return Err(EngineError::Validation(
                "total_value must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            counterparty,
            occurred_at,
            total_value,
            lines: Vec::new(),
        })
    }

    pub fn direction(&self) -> Direction {
        self.counterparty.direction()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub counterparty_role: String,
    pub counterparty_id: String,
    pub direction: String,
    pub occurred_at: DateTimeUtc,
    pub total_value: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lines::Entity")]
    Lines,
}

impl Related<super::lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            counterparty_role: ActiveValue::Set(tx.counterparty.role().as_str().to_string()),
            counterparty_id: ActiveValue::Set(tx.counterparty.id().to_string()),
            direction: ActiveValue::Set(tx.direction().as_str().to_string()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            total_value: ActiveValue::Set(tx.total_value),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let counterparty_id = Uuid::parse_str(&model.counterparty_id)
            .map_err(|_| EngineError::KeyNotFound("counterparty not exists".to_string()))?;
        let counterparty = match CounterpartyRole::try_from(model.counterparty_role.as_str())? {
            CounterpartyRole::Hunter => Counterparty::Hunter {
                hunter_id: counterparty_id,
            },
            CounterpartyRole::Merchant => Counterparty::Merchant {
                merchant_id: counterparty_id,
            },
        };

        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?,
            counterparty,
            occurred_at: model.occurred_at,
            total_value: model.total_value,
            lines: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counterparty_implies_direction() {
        let hunter = Counterparty::Hunter {
            hunter_id: Uuid::new_v4(),
        };
        let merchant = Counterparty::Merchant {
            merchant_id: Uuid::new_v4(),
        };

        assert_eq!(hunter.direction(), Direction::Buy);
        assert_eq!(merchant.direction(), Direction::Sell);
    }

    #[test]
    fn negative_total_rejected() {
        let err = Transaction::new(
            Counterparty::Hunter {
                hunter_id: Uuid::new_v4(),
            },
            Utc::now(),
            -1,
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
    }
}
