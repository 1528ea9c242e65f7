pub mod auth;
pub mod bookings;
pub mod coupons;
pub mod points;
pub mod profiles;
