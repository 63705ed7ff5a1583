//! Capability checks run before every booking transition.
//!
//! Each check either proves the caller holds the required capability and
//! returns the records it had to load, or fails with `NotAuthorized` /
//! `NotFound` before any state is touched.

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::bookings as booking_db;
use crate::db::listings as listing_db;
use crate::error::ApiError;
use crate::models::users::{self, Roles};
use crate::models::{bookings, listings};

/// Require a coarse role on the caller (e.g. owner-only surfaces).
pub fn require_role(user: &users::Model, role: Roles) -> Result<(), ApiError> {
    if user.role == role || user.role == Roles::Admin {
        Ok(())
    } else {
        Err(ApiError::NotAuthorized(format!(
            "this operation requires the {role:?} role"
        )))
    }
}

/// Require that the caller owns the listing; returns it for further use.
pub async fn require_listing_owner(
    db: &DatabaseConnection,
    listing_id: Uuid,
    user_id: Uuid,
) -> Result<listings::Model, ApiError> {
    let listing = listing_db::get_listing_by_id(db, listing_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Listing {listing_id} not found")))?;

    if listing.owner_id != user_id {
        return Err(ApiError::NotAuthorized(
            "you do not own this listing".to_string(),
        ));
    }
    Ok(listing)
}

/// A booking together with the caller's relationship to it. The listing is
/// `None` when it has been deleted out from under the booking; the booking
/// user's capabilities survive that, the owner's do not.
pub struct BookingAccess {
    pub booking: bookings::Model,
    pub listing: Option<listings::Model>,
    pub is_booking_user: bool,
    pub is_listing_owner: bool,
}

/// Load a booking and establish which side of it the caller is on. Does not
/// reject by itself (beyond `NotFound`); callers state which capability they
/// need via the `require_*` methods.
pub async fn load_booking_access(
    db: &DatabaseConnection,
    booking_id: Uuid,
    user: &users::Model,
) -> Result<BookingAccess, ApiError> {
    let booking = booking_db::get_booking_by_id(db, booking_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Booking {booking_id} not found")))?;

    let listing = listing_db::get_listing_by_id(db, booking.listing_id).await?;

    let is_booking_user = booking.user_id == user.id;
    let is_listing_owner = listing
        .as_ref()
        .is_some_and(|l| l.owner_id == user.id);

    Ok(BookingAccess {
        booking,
        listing,
        is_booking_user,
        is_listing_owner,
    })
}

impl BookingAccess {
    /// Confirm is owner-only.
    pub fn require_listing_owner(&self) -> Result<(), ApiError> {
        if self.is_listing_owner {
            Ok(())
        } else {
            Err(ApiError::NotAuthorized(
                "only the listing owner may do this".to_string(),
            ))
        }
    }

    /// Cancel and delete belong to either party of the booking, never to an
    /// unrelated owner-role account.
    pub fn require_party(&self) -> Result<(), ApiError> {
        if self.is_booking_user || self.is_listing_owner {
            Ok(())
        } else {
            Err(ApiError::NotAuthorized(
                "you are not a party to this booking".to_string(),
            ))
        }
    }

    /// Invoices are visible to either party and to admins.
    pub fn require_party_or_admin(&self, user: &users::Model) -> Result<(), ApiError> {
        if user.role == Roles::Admin {
            return Ok(());
        }
        self.require_party()
    }
}
