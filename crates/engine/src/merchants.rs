//! The module contains the `Merchant` struct and its implementation.
//!
//! A merchant is the selling counterparty of a transaction, symmetric to
//! [`Hunter`](crate::Hunter) on the buying side.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, hunters::UNKNOWN_LOCATION};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantKind {
    Blacksmith,
    Alchemist,
    Herbalist,
    General,
    Smuggler,
    #[default]
    Unknown,
}

impl MerchantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blacksmith => "blacksmith",
            Self::Alchemist => "alchemist",
            Self::Herbalist => "herbalist",
            Self::General => "general",
            Self::Smuggler => "smuggler",
            Self::Unknown => "unknown",
        }
    }
}

impl TryFrom<&str> for MerchantKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "blacksmith" => Ok(Self::Blacksmith),
            "alchemist" => Ok(Self::Alchemist),
            "herbalist" => Ok(Self::Herbalist),
            "general" => Ok(Self::General),
            "smuggler" => Ok(Self::Smuggler),
            "unknown" => Ok(Self::Unknown),
            other => Err(EngineError::Validation(format!(
                "invalid merchant kind: {other}"
            ))),
        }
    }
}

/// A selling counterparty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: Uuid,
    pub name: String,
    pub kind: MerchantKind,
    pub location: String,
}

impl Merchant {
    pub fn new(name: String, kind: MerchantKind, location: String) -> ResultEngine<Self> {
        let merchant = Self {
            id: Uuid::new_v4(),
            name,
            kind,
            location,
        };
        crate::validation::merchant_rules().check(&merchant)?;
        Ok(merchant)
    }

    /// Build the placeholder merchant the counterparty resolver creates for
    /// an unknown name on a sell.
    pub fn auto_created(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            kind: MerchantKind::Unknown,
            location: UNKNOWN_LOCATION.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "merchants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub kind: String,
    pub location: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Merchant> for ActiveModel {
    fn from(merchant: &Merchant) -> Self {
        Self {
            id: ActiveValue::Set(merchant.id.to_string()),
            name: ActiveValue::Set(merchant.name.clone()),
            kind: ActiveValue::Set(merchant.kind.as_str().to_string()),
            location: ActiveValue::Set(merchant.location.clone()),
        }
    }
}

impl TryFrom<Model> for Merchant {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("merchant not exists".to_string()))?,
            name: model.name,
            kind: MerchantKind::try_from(model.kind.as_str()).unwrap_or_default(),
            location: model.location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trip() {
        for kind in [
            MerchantKind::Blacksmith,
            MerchantKind::Alchemist,
            MerchantKind::Herbalist,
            MerchantKind::General,
            MerchantKind::Smuggler,
            MerchantKind::Unknown,
        ] {
            assert_eq!(MerchantKind::try_from(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn auto_created_uses_placeholders() {
        let merchant = Merchant::auto_created("Hattori".to_string());

        assert_eq!(merchant.kind, MerchantKind::Unknown);
        assert_eq!(merchant.location, UNKNOWN_LOCATION);
    }
}
