//! Demo data seeding command.
//!
//! Inserts a small catalog (collections + products) for local development
//! and integration testing. Idempotent: re-running updates prices and names
//! in place.

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{CommandError, database_url};

/// A seed product: slug, name, price (paise), image, collection slugs.
const PRODUCTS: &[(&str, &str, i64, &[&str])] = &[
    ("ceramic-mug", "Ceramic Mug", 49900, &["kitchen"]),
    ("steel-tumbler", "Steel Tumbler", 89900, &["kitchen", "travel"]),
    ("linen-apron", "Linen Apron", 129900, &["kitchen"]),
    ("canvas-tote", "Canvas Tote", 69900, &["travel"]),
    ("walnut-tray", "Walnut Serving Tray", 219900, &["kitchen", "home"]),
    ("wool-throw", "Wool Throw Blanket", 349900, &["home"]),
    ("brass-bottle", "Brass Water Bottle", 159900, &["travel", "home"]),
    ("jute-doormat", "Jute Doormat", 79900, &["home"]),
];

const COLLECTIONS: &[(&str, &str)] = &[
    ("kitchen", "Kitchen"),
    ("travel", "Travel"),
    ("home", "Home"),
];

/// Seed the database with demo catalog data.
///
/// # Errors
///
/// Returns `CommandError` if the database URL is missing or a query fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to storefront database...");
    let pool = PgPool::connect(&database_url).await?;

    seed_collections(&pool).await?;
    seed_products(&pool).await?;

    tracing::info!("Seed complete: {} collections, {} products", COLLECTIONS.len(), PRODUCTS.len());
    Ok(())
}

async fn seed_collections(pool: &PgPool) -> Result<(), CommandError> {
    for (slug, name) in COLLECTIONS {
        sqlx::query(
            r"
            INSERT INTO storefront.collections (slug, name)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
            ",
        )
        .bind(slug)
        .bind(name)
        .execute(pool)
        .await?;
    }

    Ok(())
}

async fn seed_products(pool: &PgPool) -> Result<(), CommandError> {
    for (slug, name, price_paise, collection_slugs) in PRODUCTS {
        let price = Decimal::new(*price_paise, 2);

        sqlx::query(
            r"
            INSERT INTO storefront.products (slug, name, description, price, image_url, collection_ids)
            VALUES (
                $1, $2, $3, $4, $5,
                ARRAY(SELECT id FROM storefront.collections WHERE slug = ANY($6))
            )
            ON CONFLICT (slug) DO UPDATE SET
                name = EXCLUDED.name,
                price = EXCLUDED.price,
                collection_ids = EXCLUDED.collection_ids,
                updated_at = now()
            ",
        )
        .bind(slug)
        .bind(name)
        .bind(format!("{name} from the Marigold demo catalog."))
        .bind(price)
        .bind(format!("https://cdn.marigold.dev/products/{slug}.jpg"))
        .bind(collection_slugs.iter().map(ToString::to_string).collect::<Vec<_>>())
        .execute(pool)
        .await?;
    }

    Ok(())
}
