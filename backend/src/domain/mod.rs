//! # Domain Module
//!
//! Entity-specific behaviour on top of the generic record stores:
//!
//! - **Users**: registration, login checks, role lookup and password reset
//! - **Accommodations**: id assignment, booking and owner-only deletion
//! - **Restaurants**: cuisine filtering and deletion by name
//!
//! Services return plain data and outcome values. Presenting them to a
//! person is left to the caller.

pub mod accommodation_service;
pub mod credentials;
pub mod restaurant_service;
pub mod user_service;

pub use accommodation_service::{AccommodationService, BookingOutcome};
pub use credentials::{hash_password, PasswordResetStorage};
pub use restaurant_service::RestaurantService;
pub use user_service::UserService;
