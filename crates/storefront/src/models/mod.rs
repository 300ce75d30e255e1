//! Domain models for the storefront.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartItem};
pub use order::{Order, OrderItem};
pub use product::{Collection, Product};

/// Session storage keys.
///
/// Centralized so the auth extractor and the login/logout handlers never
/// disagree on key names.
pub mod session_keys {
    /// The authenticated user's ID.
    pub const USER_ID: &str = "user_id";
}
