use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::auth::policy;
use crate::db::bookings as booking_db;
use crate::db::listings as listing_db;
use crate::error::ApiError;
use crate::models::listings::{CreateListing, UpdateListing};
use crate::models::users::Roles;

/// GET /api/listings — browse all listings (public).
pub async fn get_listings(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, ApiError> {
    let listings = listing_db::get_all_listings(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(listings))
}

/// GET /api/listings/{id} — view one listing (public).
pub async fn get_listing(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let listing_id = path.into_inner();
    let listing = listing_db::get_listing_by_id(db.get_ref(), listing_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Listing {listing_id} not found")))?;
    Ok(HttpResponse::Ok().json(listing))
}

/// GET /api/listings/{id}/booked-dates — non-canceled stay ranges, so a
/// booking calendar can grey out taken dates (public).
pub async fn get_booked_dates(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let listing_id = path.into_inner();
    let ranges = booking_db::get_booked_ranges(db.get_ref(), listing_id).await?;
    Ok(HttpResponse::Ok().json(ranges))
}

/// POST /api/listings — create a listing (owner role required).
pub async fn create_listing(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateListing>,
) -> Result<HttpResponse, ApiError> {
    policy::require_role(&user.0, Roles::Owner)?;

    let input = body.into_inner();
    if input.price <= 0.0 {
        return Err(ApiError::Validation(
            "nightly price must be positive".to_string(),
        ));
    }

    let listing = listing_db::insert_listing(db.get_ref(), input, user.0.id).await?;
    Ok(HttpResponse::Created().json(listing))
}

/// PUT /api/listings/{id} — edit a listing (its owner only). Price edits do
/// not touch existing bookings; their totals were frozen at creation.
pub async fn update_listing(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateListing>,
) -> Result<HttpResponse, ApiError> {
    let listing_id = path.into_inner();
    policy::require_listing_owner(db.get_ref(), listing_id, user.0.id).await?;

    let input = body.into_inner();
    if matches!(input.price, Some(p) if p <= 0.0) {
        return Err(ApiError::Validation(
            "nightly price must be positive".to_string(),
        ));
    }

    let updated = listing_db::update_listing(db.get_ref(), listing_id, input).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/listings/{id} — remove a listing (its owner only). Bookings
/// referencing it are kept; the booking flow tolerates the orphan reference.
pub async fn delete_listing(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let listing_id = path.into_inner();
    policy::require_listing_owner(db.get_ref(), listing_id, user.0.id).await?;

    listing_db::delete_listing(db.get_ref(), listing_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Listing {listing_id} deleted"),
    })))
}
