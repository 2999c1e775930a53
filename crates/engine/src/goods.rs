//! The module contains the `Good` struct and its implementation.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Placeholder description for goods created implicitly by a sell.
pub const AUTO_CREATED_DESCRIPTION: &str = "Created automatically by a sell transaction";
/// Placeholder weight for goods created implicitly by a sell.
pub const AUTO_CREATED_WEIGHT: f64 = 10.0;
/// Placeholder unit value (in crowns) for goods created implicitly by a sell.
pub const AUTO_CREATED_VALUE: i64 = 100;

/// Material a good is made of.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Steel,
    Wood,
    Stone,
    Iron,
    Leather,
    Cloth,
    Glass,
    Bronze,
    Silver,
    Gold,
    #[default]
    Unknown,
}

impl Material {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Steel => "steel",
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Iron => "iron",
            Self::Leather => "leather",
            Self::Cloth => "cloth",
            Self::Glass => "glass",
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Unknown => "unknown",
        }
    }
}

impl TryFrom<&str> for Material {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "steel" => Ok(Self::Steel),
            "wood" => Ok(Self::Wood),
            "stone" => Ok(Self::Stone),
            "iron" => Ok(Self::Iron),
            "leather" => Ok(Self::Leather),
            "cloth" => Ok(Self::Cloth),
            "glass" => Ok(Self::Glass),
            "bronze" => Ok(Self::Bronze),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "unknown" => Ok(Self::Unknown),
            other => Err(EngineError::Validation(format!(
                "invalid material: {other}"
            ))),
        }
    }
}

/// A tradeable item.
///
/// Stock is the number of units currently held by the trading post; it never
/// goes negative as an observable state. The unit value is an integer amount
/// of crowns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Good {
    /// Stable identifier, generated once and persisted so the good can be
    /// renamed without breaking transaction references.
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub material: Material,
    pub weight: f64,
    pub stock: i64,
    pub value: i64,
}

impl Good {
    pub fn new(
        name: String,
        description: String,
        material: Material,
        weight: f64,
        stock: i64,
        value: i64,
    ) -> ResultEngine<Self> {
        let good = Self {
            id: Uuid::new_v4(),
            name,
            description,
            material,
            weight,
            stock,
            value,
        };
        crate::validation::good_rules().check(&good)?;
        crate::validation::good_stock_rule().check(&good)?;
        Ok(good)
    }

    /// Build the placeholder good a sell transaction creates for an unknown
    /// name. Stock starts at the quantity sold.
    pub fn auto_created(name: String, stock: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description: AUTO_CREATED_DESCRIPTION.to_string(),
            material: Material::Unknown,
            weight: AUTO_CREATED_WEIGHT,
            stock,
            value: AUTO_CREATED_VALUE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub material: String,
    pub weight: f64,
    pub stock: i64,
    pub value: i64,
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

impl From<&Good> for ActiveModel {
    fn from(good: &Good) -> Self {
        Self {
            id: ActiveValue::Set(good.id.to_string()),
            name: ActiveValue::Set(good.name.clone()),
            description: ActiveValue::Set(good.description.clone()),
            material: ActiveValue::Set(good.material.as_str().to_string()),
            weight: ActiveValue::Set(good.weight),
            stock: ActiveValue::Set(good.stock),
            value: ActiveValue::Set(good.value),
        }
    }
}

impl TryFrom<Model> for Good {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("good not exists".to_string()))?,
            name: model.name,
            description: model.description,
            material: Material::try_from(model.material.as_str()).unwrap_or_default(),
            weight: model.weight,
            stock: model.stock,
            value: model.value,
        })
    }
}
