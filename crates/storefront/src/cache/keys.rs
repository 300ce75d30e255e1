//! Deterministic cache key construction.
//!
//! Keys are namespaced as `<domain>:<part>:<part>...`. The prefix vocabulary
//! (`product`, `products`, `collection`, `collections`, `home`, `checkout`,
//! `cart`, `orders`) is a design contract kept consistent by the
//! constructors below; callers should not format keys by hand.

use marigold_core::UserId;

/// Delimiter between key parts.
const DELIMITER: char = ':';

/// Join a prefix and ordered parts into a cache key.
///
/// Pure function: the same logical query always yields the same key.
#[must_use]
pub fn build_key(prefix: &str, parts: &[&str]) -> String {
    let mut key = String::from(prefix);
    for part in parts {
        key.push(DELIMITER);
        key.push_str(part);
    }
    key
}

/// Key for a single product: `product:<slug>`.
#[must_use]
pub fn product(slug: &str) -> String {
    build_key("product", &[slug])
}

/// Key for the product listing: `products:all`.
#[must_use]
pub fn product_list() -> String {
    build_key("products", &["all"])
}

/// Key for a single collection (with its products): `collection:<slug>`.
#[must_use]
pub fn collection(slug: &str) -> String {
    build_key("collection", &[slug])
}

/// Key for the collection listing: `collections:all`.
#[must_use]
pub fn collection_list() -> String {
    build_key("collections", &["all"])
}

/// Key for the homepage aggregate: `home:v1`.
#[must_use]
pub fn home() -> String {
    build_key("home", &["v1"])
}

/// Key for a user's checkout summary: `checkout:<user_id>`.
#[must_use]
pub fn checkout(user_id: UserId) -> String {
    build_key("checkout", &[&user_id.to_string()])
}

/// Key for a user's cart view: `cart:<user_id>`.
#[must_use]
pub fn cart(user_id: UserId) -> String {
    build_key("cart", &[&user_id.to_string()])
}

/// Key for a user's order list: `orders:<user_id>`.
#[must_use]
pub fn orders(user_id: UserId) -> String {
    build_key("orders", &[&user_id.to_string()])
}

/// Key for a single order view: `orders:<user_id>:<order_number>`.
#[must_use]
pub fn order(user_id: UserId, order_number: &str) -> String {
    build_key("orders", &[&user_id.to_string(), order_number])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_key_joins_with_delimiter() {
        assert_eq!(build_key("product", &["ceramic-mug"]), "product:ceramic-mug");
        assert_eq!(build_key("orders", &["7", "ORD-1"]), "orders:7:ORD-1");
    }

    #[test]
    fn test_build_key_deterministic() {
        assert_eq!(build_key("a", &["b", "c"]), build_key("a", &["b", "c"]));
    }

    #[test]
    fn test_per_user_keys_are_distinct() {
        let u1 = UserId::new(1);
        let u2 = UserId::new(2);
        assert_ne!(checkout(u1), checkout(u2));
        assert_ne!(checkout(u1), cart(u1));
        assert_ne!(cart(u1), orders(u1));
    }
}
