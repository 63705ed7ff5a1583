use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `listings` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Nightly price. Read by the booking flow, never written by it.
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub location: String,
    pub country: String,
    pub category: Categories,
    pub owner_id: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Categories {
    #[sea_orm(string_value = "beach")]
    Beach,
    #[sea_orm(string_value = "mountain")]
    Mountain,
    #[sea_orm(string_value = "villa")]
    Villa,
    #[sea_orm(string_value = "trending")]
    Trending,
    #[sea_orm(string_value = "city")]
    City,
    #[sea_orm(string_value = "camping")]
    Camping,
    #[sea_orm(string_value = "luxury")]
    Luxury,
    #[sea_orm(string_value = "historic")]
    Historic,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Owner,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateListing {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub country: String,
    pub category: Option<Categories>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateListing {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub category: Option<Categories>,
}
