pub mod bookings;
pub mod listings;
pub mod notifications;
pub mod users;
