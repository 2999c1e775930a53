//! The module contains the `Hunter` struct and its implementation.
//!
//! A hunter is the buying counterparty of a transaction. Hunters are created
//! explicitly through the API or implicitly by the counterparty resolver when
//! a buy transaction names someone unknown.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Placeholder location for auto-created counterparties.
pub const UNKNOWN_LOCATION: &str = "Unknown";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Halfling,
    Sorcerer,
    #[default]
    Unknown,
}

impl Race {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Elf => "elf",
            Self::Dwarf => "dwarf",
            Self::Halfling => "halfling",
            Self::Sorcerer => "sorcerer",
            Self::Unknown => "unknown",
        }
    }
}

impl TryFrom<&str> for Race {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "human" => Ok(Self::Human),
            "elf" => Ok(Self::Elf),
            "dwarf" => Ok(Self::Dwarf),
            "halfling" => Ok(Self::Halfling),
            "sorcerer" => Ok(Self::Sorcerer),
            "unknown" => Ok(Self::Unknown),
            other => Err(EngineError::Validation(format!("invalid race: {other}"))),
        }
    }
}

/// A buying counterparty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hunter {
    pub id: Uuid,
    pub name: String,
    pub race: Race,
    pub location: String,
}

impl Hunter {
    pub fn new(name: String, race: Race, location: String) -> ResultEngine<Self> {
        let hunter = Self {
            id: Uuid::new_v4(),
            name,
            race,
            location,
        };
        crate::validation::hunter_rules().check(&hunter)?;
        Ok(hunter)
    }

    /// Build the placeholder hunter the counterparty resolver creates for an
    /// unknown name on a buy.
    pub fn auto_created(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            race: Race::Unknown,
            location: UNKNOWN_LOCATION.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "hunters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub race: String,
    pub location: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Hunter> for ActiveModel {
    fn from(hunter: &Hunter) -> Self {
        Self {
            id: ActiveValue::Set(hunter.id.to_string()),
            name: ActiveValue::Set(hunter.name.clone()),
            race: ActiveValue::Set(hunter.race.as_str().to_string()),
            location: ActiveValue::Set(hunter.location.clone()),
        }
    }
}

impl TryFrom<Model> for Hunter {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("hunter not exists".to_string()))?,
            name: model.name,
            race: Race::try_from(model.race.as_str()).unwrap_or_default(),
            location: model.location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_created_uses_placeholders() {
        let hunter = Hunter::auto_created("Geralt".to_string());

        assert_eq!(hunter.race, Race::Unknown);
        assert_eq!(hunter.location, UNKNOWN_LOCATION);
    }

    #[test]
    fn new_hunter_runs_validation() {
        let err = Hunter::new("geralt".to_string(), Race::Human, "Rivia".to_string()).unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
    }
}
