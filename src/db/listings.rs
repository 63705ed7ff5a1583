use sea_orm::*;
use uuid::Uuid;

use crate::models::listings::{self, Categories, CreateListing, UpdateListing};

/// Insert a new listing owned by the given user.
pub async fn insert_listing(
    db: &DatabaseConnection,
    input: CreateListing,
    owner_id: Uuid,
) -> Result<listings::Model, DbErr> {
    let new_listing = listings::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        description: Set(input.description),
        price: Set(input.price),
        location: Set(input.location),
        country: Set(input.country),
        category: Set(input.category.unwrap_or(Categories::Other)),
        owner_id: Set(owner_id),
        created_at: Set(chrono::Utc::now()),
    };

    new_listing.insert(db).await
}

/// Fetch all listings, newest first.
pub async fn get_all_listings(db: &DatabaseConnection) -> Result<Vec<listings::Model>, DbErr> {
    listings::Entity::find()
        .order_by_desc(listings::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch a single listing by ID.
pub async fn get_listing_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<listings::Model>, DbErr> {
    listings::Entity::find_by_id(id).one(db).await
}

/// Fetch all listings owned by a user.
pub async fn get_listings_by_owner(
    db: &DatabaseConnection,
    owner_id: Uuid,
) -> Result<Vec<listings::Model>, DbErr> {
    listings::Entity::find()
        .filter(listings::Column::OwnerId.eq(owner_id))
        .all(db)
        .await
}

/// Update an existing listing. Existing bookings keep their frozen
/// `total_price` even when the nightly price changes here.
pub async fn update_listing(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateListing,
) -> Result<listings::Model, DbErr> {
    let listing = listings::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Listing not found".to_string()))?;

    let mut active: listings::ActiveModel = listing.into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    if let Some(price) = input.price {
        active.price = Set(price);
    }
    if let Some(location) = input.location {
        active.location = Set(location);
    }
    if let Some(country) = input.country {
        active.country = Set(country);
    }
    if let Some(category) = input.category {
        active.category = Set(category);
    }

    active.update(db).await
}

/// Delete a listing. Bookings are left in place; the booking flow tolerates
/// orphaned listing references.
pub async fn delete_listing(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    listings::Entity::delete_by_id(id).exec(db).await
}
