use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Login row shared by every profile kind.
///
/// The `role_id` column selects which profile table holds the rest of the
/// identity; exactly one profile row exists per login.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "useraccount")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Globally unique; the lookup key for authentication flows.
    #[sea_orm(unique)]
    pub email: String,

    /// Already hashed by the calling auth flow; opaque at this layer.
    pub password: String,

    pub phone: Option<String>,

    pub role_id: i32,

    #[sea_orm(column_name = "createdat")]
    pub created_at: DateTime<Utc>,

    #[sea_orm(column_name = "updatedat")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::customer::Entity")]
    Customer,
    #[sea_orm(has_one = "super::employee::Entity")]
    Employee,
    #[sea_orm(has_one = "super::manager::Entity")]
    Manager,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::manager::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Manager.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Profile kind stored in `useraccount.role_id`.
///
/// The three kinds are mutually exclusive per identity; dispatch happens in
/// a single `match` at the directory boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer = 1,
    Employee = 2,
    Manager = 3,
}

impl UserRole {
    /// Maps a stored `role_id`. Unknown values are a data-integrity gap and
    /// map to `None` rather than panicking.
    pub const fn from_id(role_id: i32) -> Option<Self> {
        match role_id {
            1 => Some(Self::Customer),
            2 => Some(Self::Employee),
            3 => Some(Self::Manager),
            _ => None,
        }
    }

    pub const fn id(self) -> i32 {
        self as i32
    }
}
