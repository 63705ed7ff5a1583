use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::auth::policy;
use crate::db::bookings as booking_db;
use crate::db::listings as listing_db;
use crate::error::ApiError;
use crate::models::bookings::{
    BookingStatus, CreateBooking, PaymentStatus, amount_minor_units, nights, refund_due,
    stay_total, validate_stay,
};
use crate::models::users::Roles;
use crate::notify::Notifier;
use crate::payments::{self, CURRENCY, PaymentGateway};

/// POST /api/bookings/listings/{id}/order — start the booking flow.
///
/// Validates the stay, runs the advisory availability check, and creates a
/// payment order for the frozen total. No booking exists yet; the client
/// completes payment out-of-band and returns via `verify_payment`.
pub async fn create_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    gateway: web::Data<Arc<dyn PaymentGateway>>,
    path: web::Path<Uuid>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let listing_id = path.into_inner();
    let stay = body.into_inner();

    let today = chrono::Utc::now().date_naive();
    validate_stay(stay.start_date, stay.end_date, stay.guests, today)?;

    let listing = listing_db::get_listing_by_id(db.get_ref(), listing_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Listing {listing_id} not found")))?;

    if listing.owner_id == user.0.id {
        return Err(ApiError::NotAuthorized(
            "you cannot book your own listing".to_string(),
        ));
    }

    // Advisory check: tells the client early that the dates are taken. The
    // authoritative check happens again at verify time, because another party
    // can book while this client is off paying.
    if booking_db::find_conflicting(db.get_ref(), listing_id, stay.start_date, stay.end_date)
        .await?
        .is_some()
    {
        return Err(ApiError::SlotConflict);
    }

    let n = nights(stay.start_date, stay.end_date);
    let total_price = stay_total(listing.price, n);
    let amount = amount_minor_units(total_price);

    let receipt = format!("booking_{}", chrono::Utc::now().timestamp_millis());
    let order = gateway.create_order(amount, CURRENCY, &receipt).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "order_id": order.order_id,
        "amount": order.amount_minor_units,
        "currency": order.currency,
        "total_price": total_price,
        "nights": n,
        "listing_id": listing_id,
        "start_date": stay.start_date,
        "end_date": stay.end_date,
        "guests": stay.guests,
    })))
}

/// POST /api/bookings/verify-payment — finish the booking flow.
///
/// Verifies the gateway signature, re-validates the stay, and performs the
/// authoritative availability check by inserting under the overlap exclusion
/// constraint. Only then does a booking exist, `pending` and `paid`.
pub async fn verify_payment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    gateway: web::Data<Arc<dyn PaymentGateway>>,
    notifier: web::Data<Arc<dyn Notifier>>,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    let payment = body.into_inner();

    // Signature mismatch is an ordinary rejection, nothing was persisted and
    // no funds were at risk (capture requires a valid signature upstream).
    if !gateway.verify_signature(&payment.order_id, &payment.payment_id, &payment.signature) {
        return Err(ApiError::PaymentVerificationFailed);
    }

    let listing = listing_db::get_listing_by_id(db.get_ref(), payment.listing_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Listing {} not found", payment.listing_id)))?;

    let today = chrono::Utc::now().date_naive();
    validate_stay(payment.start_date, payment.end_date, payment.guests, today)?;

    if listing.owner_id == user.0.id {
        return Err(ApiError::NotAuthorized(
            "you cannot book your own listing".to_string(),
        ));
    }

    // Price is re-read and frozen here; later listing price edits never
    // change this booking's total.
    let n = nights(payment.start_date, payment.end_date);
    let total_price = stay_total(listing.price, n);

    // The signature only proves the client paid the order they named; the
    // order itself must cover this stay's total, or a cheap order could be
    // attached to a pricier booking.
    let order = gateway.fetch_order(&payment.order_id).await?;
    if !payments::order_matches_stay(&order, total_price) {
        return Err(ApiError::Validation(
            "the paid order does not match the requested stay".to_string(),
        ));
    }

    let input = CreateBooking {
        user_id: user.0.id,
        listing_id: listing.id,
        start_date: payment.start_date,
        end_date: payment.end_date,
        guests: payment.guests,
        total_price,
        payment_id: payment.payment_id,
        payment_order_id: payment.order_id,
    };

    // Authoritative check: the insert races against concurrent bookings under
    // the database's exclusion constraint, so at most one of them wins.
    let booking = match booking_db::insert_booking(db.get_ref(), input).await {
        Ok(booking) => booking,
        Err(e) if booking_db::is_overlap_violation(&e) => {
            // Payment was already captured; the gateway's idempotent refund
            // covers the client. The distinct error tells them so.
            return Err(ApiError::SlotConflict);
        }
        Err(e) => return Err(e.into()),
    };

    notifier
        .notify(
            user.0.id,
            &format!(
                "Your booking for \"{}\" has been created and is awaiting host confirmation.",
                listing.title
            ),
            "/bookings",
        )
        .await;
    notifier
        .notify(
            listing.owner_id,
            &format!("You have a new booking request for \"{}\".", listing.title),
            "/bookings/owner",
        )
        .await;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Payment verified & booking created",
        "booking_id": booking.id,
    })))
}

/// GET /api/bookings — the authenticated user's bookings, newest first.
pub async fn get_my_bookings(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let bookings = booking_db::get_bookings_by_user_id(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

/// GET /api/bookings/owner — bookings across all of the caller's listings.
pub async fn get_owner_bookings(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    policy::require_role(&user.0, Roles::Owner)?;

    let listings = listing_db::get_listings_by_owner(db.get_ref(), user.0.id).await?;
    let listing_ids = listings.iter().map(|l| l.id).collect();
    let bookings = booking_db::get_bookings_for_listings(db.get_ref(), listing_ids).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

/// PATCH /api/bookings/{id}/confirm — the listing owner accepts a pending
/// booking.
pub async fn confirm_booking(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Arc<dyn Notifier>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let booking_id = path.into_inner();

    let access = policy::load_booking_access(db.get_ref(), booking_id, &user.0).await?;
    access.require_listing_owner()?;

    if access.booking.status != BookingStatus::Pending {
        return Err(ApiError::Validation(format!(
            "booking is already {:?}; only pending bookings can be confirmed",
            access.booking.status
        )));
    }

    let updated = booking_db::update_status_guarded(
        db.get_ref(),
        booking_id,
        access.booking.version,
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        None,
    )
    .await?
    .ok_or(ApiError::VersionConflict)?;

    if let Some(listing) = &access.listing {
        notifier
            .notify(
                access.booking.user_id,
                &format!(
                    "Your booking for \"{}\" has been confirmed by the host.",
                    listing.title
                ),
                "/bookings",
            )
            .await;
    }

    Ok(HttpResponse::Ok().json(updated))
}

/// PATCH /api/bookings/{id}/cancel — the booking user or the listing owner
/// cancels.
///
/// An owner canceling a paid booking triggers an automatic refund attempt.
/// If the refund call fails, the cancellation still goes through: the payment
/// status stays `paid` and the response carries a warning telling the actor
/// to involve support.
pub async fn cancel_booking(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    gateway: web::Data<Arc<dyn PaymentGateway>>,
    notifier: web::Data<Arc<dyn Notifier>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let booking_id = path.into_inner();

    let access = policy::load_booking_access(db.get_ref(), booking_id, &user.0).await?;
    access.require_party()?;

    if !matches!(
        access.booking.status,
        BookingStatus::Pending | BookingStatus::Confirmed
    ) {
        return Err(ApiError::Validation(format!(
            "booking is already {:?} and cannot be canceled",
            access.booking.status
        )));
    }

    let mut new_payment_status = None;
    let mut warning: Option<&str> = None;

    if refund_due(
        access.is_listing_owner,
        access.booking.payment_status,
        access.booking.payment_id.as_deref(),
    ) {
        let payment_id = access.booking.payment_id.as_deref().unwrap_or_default();
        let amount = amount_minor_units(access.booking.total_price);
        match gateway.refund(payment_id, amount).await {
            Ok(refund) => {
                tracing::info!(%booking_id, refund_id = %refund.refund_id, "refund issued on owner cancel");
                new_payment_status = Some(PaymentStatus::Refunded);
            }
            Err(e) => {
                tracing::warn!(%booking_id, error = %e, "refund failed; booking cancels anyway");
                warning =
                    Some("Refund could not be processed automatically. Please contact support.");
            }
        }
    }

    let updated = booking_db::update_status_guarded(
        db.get_ref(),
        booking_id,
        access.booking.version,
        access.booking.status,
        BookingStatus::Canceled,
        new_payment_status,
    )
    .await?
    .ok_or(ApiError::VersionConflict)?;

    let listing_title = access
        .listing
        .as_ref()
        .map(|l| l.title.as_str())
        .unwrap_or("your stay");
    let by_host = if access.is_listing_owner {
        " by the host"
    } else {
        ""
    };
    notifier
        .notify(
            access.booking.user_id,
            &format!("Your booking for \"{listing_title}\" was canceled{by_host}."),
            "/bookings",
        )
        .await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Booking canceled successfully",
        "warning": warning,
        "booking": updated,
    })))
}

/// DELETE /api/bookings/{id} — hard-remove a booking record.
///
/// Scoped to the booking's own user or the listing's owner; an unrelated
/// owner-role account is rejected.
pub async fn delete_booking(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let booking_id = path.into_inner();

    let access = policy::load_booking_access(db.get_ref(), booking_id, &user.0).await?;
    access.require_party()?;

    booking_db::delete_booking(db.get_ref(), booking_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Booking {booking_id} deleted"),
    })))
}

/// GET /api/bookings/{id}/invoice — invoice data for a booking, visible to
/// either party or an admin. All amounts come off the booking row (frozen at
/// creation), never the listing's current price.
pub async fn get_invoice(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let booking_id = path.into_inner();

    let access = policy::load_booking_access(db.get_ref(), booking_id, &user.0).await?;
    access.require_party_or_admin(&user.0)?;

    let booking = &access.booking;
    let n = nights(booking.start_date, booking.end_date).max(1);
    let nightly_rate = booking.total_price / n as f64;

    let guest = crate::db::users::get_user_by_id(db.get_ref(), booking.user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "booking_id": booking.id,
        "guest": guest.map(|u| serde_json::json!({
            "name": u.display_name.or(u.username),
            "email": u.email,
        })),
        "listing": access.listing.as_ref().map(|l| serde_json::json!({
            "title": l.title,
            "location": l.location,
            "country": l.country,
        })),
        "check_in": booking.start_date,
        "check_out": booking.end_date,
        "nights": n,
        "guests": booking.guests,
        "status": booking.status,
        "lines": [
            { "description": "Nightly Rate", "qty": n, "price": nightly_rate, "total": booking.total_price },
            { "description": "Cleaning Fee", "total": 0.0 },
            { "description": "Taxes", "total": 0.0 },
        ],
        "total_paid": booking.total_price,
        "payment": {
            "payment_id": booking.payment_id,
            "order_id": booking.payment_order_id,
            "status": booking.payment_status,
        },
        "issued_at": chrono::Utc::now(),
    })))
}

// ── Request DTOs ──

/// Request body for POST /api/bookings/listings/{id}/order.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateOrderRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: i32,
}

/// Request body for POST /api/bookings/verify-payment — the payment proof the
/// client brings back from the gateway, plus the stay it paid for.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: i32,
}
