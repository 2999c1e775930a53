use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

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

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Buy,
    Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterpartyRole {
    Hunter,
    Merchant,
}

pub mod good {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoodNew {
        pub name: String,
        pub description: String,
        pub material: Material,
        pub weight: f64,
        pub stock: i64,
        pub value: i64,
    }

    /// Whitelisted PATCH body; unknown fields are rejected so a client
    /// cannot smuggle in non-updatable columns.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct GoodUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub material: Option<Material>,
        pub weight: Option<f64>,
        pub stock: Option<i64>,
        pub value: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoodView {
        pub id: Uuid,
        pub name: String,
        pub description: String,
        pub material: Material,
        pub weight: f64,
        pub stock: i64,
        pub value: i64,
    }

    /// Query-string filters for listing goods.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GoodListParams {
        pub name: Option<String>,
        pub description: Option<String>,
        pub material: Option<Material>,
    }
}

pub mod hunter {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HunterNew {
        pub name: String,
        pub race: Race,
        pub location: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct HunterUpdate {
        pub name: Option<String>,
        pub race: Option<Race>,
        pub location: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HunterView {
        pub id: Uuid,
        pub name: String,
        pub race: Race,
        pub location: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct HunterListParams {
        pub name: Option<String>,
    }
}

pub mod merchant {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MerchantNew {
        pub name: String,
        pub kind: MerchantKind,
        pub location: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct MerchantUpdate {
        pub name: Option<String>,
        pub kind: Option<MerchantKind>,
        pub location: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MerchantView {
        pub id: Uuid,
        pub name: String,
        pub kind: MerchantKind,
        pub location: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MerchantListParams {
        pub name: Option<String>,
    }
}

pub mod transaction {
    use super::*;

    /// One requested goods line; the good is named, not referenced by id.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LineNew {
        pub name: String,
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub goods: Vec<LineNew>,
        pub involved_name: String,
        pub involved_type: CounterpartyRole,
        pub direction: Direction,
    }

    /// PATCH body: only quantity changes for goods already on the
    /// transaction are honored.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct TransactionUpdate {
        pub goods: Vec<LineNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LineView {
        pub good_id: Uuid,
        pub quantity: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub involved_type: CounterpartyRole,
        pub involved_id: Uuid,
        pub direction: Direction,
        pub date: DateTime<Utc>,
        pub total_value: i64,
        pub goods: Vec<LineView>,
    }

    /// Query-string filters for listing transactions.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListParams {
        pub involved_name: Option<String>,
        pub direction: Option<Direction>,
        pub from: Option<DateTime<Utc>>,
        pub to: Option<DateTime<Utc>>,
    }
}
