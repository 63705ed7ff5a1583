pub mod auth;
pub mod bookings;
pub mod listings;
pub mod notifications;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(
        web::scope("/auth")
            .route("/me", web::get().to(auth::me))
            .route("/complete-profile", web::post().to(auth::complete_profile)),
    );

    // ── Listing routes (reads are public, writes require the owner) ──
    cfg.service(
        web::scope("/listings")
            .route("", web::get().to(listings::get_listings))
            .route("", web::post().to(listings::create_listing))
            .route("/{id}", web::get().to(listings::get_listing))
            .route("/{id}", web::put().to(listings::update_listing))
            .route("/{id}", web::delete().to(listings::delete_listing))
            .route("/{id}/booked-dates", web::get().to(listings::get_booked_dates)),
    );

    // ── Booking routes (all protected — require valid JWT) ──
    cfg.service(
        web::scope("/bookings")
            .route("", web::get().to(bookings::get_my_bookings))
            .route("/owner", web::get().to(bookings::get_owner_bookings))
            .route("/listings/{id}/order", web::post().to(bookings::create_order))
            .route("/verify-payment", web::post().to(bookings::verify_payment))
            .route("/{id}/confirm", web::patch().to(bookings::confirm_booking))
            .route("/{id}/cancel", web::patch().to(bookings::cancel_booking))
            .route("/{id}", web::delete().to(bookings::delete_booking))
            .route("/{id}/invoice", web::get().to(bookings::get_invoice)),
    );

    // ── Notification routes (always scoped to the authenticated user) ──
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(notifications::get_notifications))
            .route("/{id}/read", web::patch().to(notifications::mark_read))
            .route("/{id}", web::delete().to(notifications::delete_notification)),
    );
}
