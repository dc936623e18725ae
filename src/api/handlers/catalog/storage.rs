//! Database helpers for the catalog resources.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use tracing::Instrument;

use super::types::{
    CategoryResponse, CategoryWithCount, ProductListItem, ProductResponse, ProductWithReviews,
    ReviewListItem, ReviewResponse,
};
use crate::api::handlers::users::utils::is_foreign_key_violation;

/// Outcome of a write that references a parent row.
#[derive(Debug)]
pub(super) enum UpsertOutcome<T> {
    Saved(T),
    /// The referenced parent (category or product) does not exist.
    MissingParent,
}

fn db_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

// Categories

pub(super) async fn fetch_categories(pool: &PgPool) -> Result<Vec<CategoryResponse>> {
    let query = "SELECT id, name FROM categories ORDER BY id";
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to list categories")?;

    Ok(rows
        .into_iter()
        .map(|row| CategoryResponse {
            id: row.get("id"),
            name: row.get("name"),
        })
        .collect())
}

pub(super) async fn fetch_categories_with_count(pool: &PgPool) -> Result<Vec<CategoryWithCount>> {
    let query = r"
        SELECT c.id, c.name, COUNT(p.id) AS products_count
        FROM categories c
        LEFT JOIN products p ON p.category_id = c.id
        GROUP BY c.id, c.name
        ORDER BY c.id
    ";
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to list categories with counts")?;

    Ok(rows
        .into_iter()
        .map(|row| CategoryWithCount {
            id: row.get("id"),
            name: row.get("name"),
            products_count: row.get("products_count"),
        })
        .collect())
}

pub(super) async fn insert_category(pool: &PgPool, name: &str) -> Result<CategoryResponse> {
    let query = "INSERT INTO categories (name) VALUES ($1) RETURNING id, name";
    let row = sqlx::query(query)
        .bind(name)
        .fetch_one(pool)
        .instrument(db_span("INSERT", query))
        .await
        .context("failed to insert category")?;

    Ok(CategoryResponse {
        id: row.get("id"),
        name: row.get("name"),
    })
}

pub(super) async fn fetch_category(pool: &PgPool, id: i64) -> Result<Option<CategoryResponse>> {
    let query = "SELECT id, name FROM categories WHERE id = $1";
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to fetch category")?;

    Ok(row.map(|row| CategoryResponse {
        id: row.get("id"),
        name: row.get("name"),
    }))
}

pub(super) async fn update_category(
    pool: &PgPool,
    id: i64,
    name: &str,
) -> Result<Option<CategoryResponse>> {
    let query = "UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name";
    let row = sqlx::query(query)
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .instrument(db_span("UPDATE", query))
        .await
        .context("failed to update category")?;

    Ok(row.map(|row| CategoryResponse {
        id: row.get("id"),
        name: row.get("name"),
    }))
}

pub(super) async fn delete_category(pool: &PgPool, id: i64) -> Result<bool> {
    let query = "DELETE FROM categories WHERE id = $1";
    let result = sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(db_span("DELETE", query))
        .await
        .context("failed to delete category")?;

    Ok(result.rows_affected() > 0)
}

// Products

pub(super) async fn fetch_products(pool: &PgPool) -> Result<Vec<ProductListItem>> {
    let query = "SELECT id, title, price FROM products ORDER BY id";
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to list products")?;

    Ok(rows
        .into_iter()
        .map(|row| ProductListItem {
            id: row.get("id"),
            title: row.get("title"),
            price: row.get("price"),
        })
        .collect())
}

fn product_from_row(row: &sqlx::postgres::PgRow) -> ProductResponse {
    ProductResponse {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        price: row.get("price"),
        category_id: row.get("category_id"),
    }
}

pub(super) async fn insert_product(
    pool: &PgPool,
    title: &str,
    description: &str,
    price: f64,
    category_id: Option<i64>,
) -> Result<UpsertOutcome<ProductResponse>> {
    let query = r"
        INSERT INTO products (title, description, price, category_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, description, price, category_id
    ";
    let row = sqlx::query(query)
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(category_id)
        .fetch_one(pool)
        .instrument(db_span("INSERT", query))
        .await;

    match row {
        Ok(row) => Ok(UpsertOutcome::Saved(product_from_row(&row))),
        Err(err) if is_foreign_key_violation(&err) => Ok(UpsertOutcome::MissingParent),
        Err(err) => Err(err).context("failed to insert product"),
    }
}

pub(super) async fn fetch_product(pool: &PgPool, id: i64) -> Result<Option<ProductResponse>> {
    let query = "SELECT id, title, description, price, category_id FROM products WHERE id = $1";
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to fetch product")?;

    Ok(row.map(|row| product_from_row(&row)))
}

pub(super) async fn update_product(
    pool: &PgPool,
    id: i64,
    title: &str,
    description: &str,
    price: f64,
    category_id: Option<i64>,
) -> Result<UpsertOutcome<Option<ProductResponse>>> {
    let query = r"
        UPDATE products
        SET title = $2, description = $3, price = $4, category_id = $5
        WHERE id = $1
        RETURNING id, title, description, price, category_id
    ";
    let row = sqlx::query(query)
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(category_id)
        .fetch_optional(pool)
        .instrument(db_span("UPDATE", query))
        .await;

    match row {
        Ok(row) => Ok(UpsertOutcome::Saved(row.map(|row| product_from_row(&row)))),
        Err(err) if is_foreign_key_violation(&err) => Ok(UpsertOutcome::MissingParent),
        Err(err) => Err(err).context("failed to update product"),
    }
}

pub(super) async fn delete_product(pool: &PgPool, id: i64) -> Result<bool> {
    let query = "DELETE FROM products WHERE id = $1";
    let result = sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(db_span("DELETE", query))
        .await
        .context("failed to delete product")?;

    Ok(result.rows_affected() > 0)
}

/// Every product with its reviews and average stars, grouped in memory from
/// two ordered reads.
pub(super) async fn fetch_products_with_reviews(pool: &PgPool) -> Result<Vec<ProductWithReviews>> {
    let query = "SELECT id, title, price FROM products ORDER BY id";
    let product_rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to list products")?;

    let query = "SELECT id, product_id, text, stars FROM reviews ORDER BY product_id, id";
    let review_rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to list reviews")?;

    let mut reviews_by_product: BTreeMap<i64, Vec<(ReviewListItem, i16)>> = BTreeMap::new();
    for row in review_rows {
        let product_id: i64 = row.get("product_id");
        reviews_by_product.entry(product_id).or_default().push((
            ReviewListItem {
                id: row.get("id"),
                text: row.get("text"),
            },
            row.get("stars"),
        ));
    }

    Ok(product_rows
        .into_iter()
        .map(|row| {
            let id: i64 = row.get("id");
            let entries = reviews_by_product.remove(&id).unwrap_or_default();
            let rating = average_stars(&entries);
            ProductWithReviews {
                id,
                title: row.get("title"),
                price: row.get("price"),
                rating,
                reviews: entries.into_iter().map(|(review, _)| review).collect(),
            }
        })
        .collect())
}

fn average_stars(entries: &[(ReviewListItem, i16)]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let sum: f64 = entries.iter().map(|(_, stars)| f64::from(*stars)).sum();
    sum / entries.len() as f64
}

// Reviews

pub(super) async fn fetch_reviews(pool: &PgPool) -> Result<Vec<ReviewListItem>> {
    let query = "SELECT id, text FROM reviews ORDER BY id";
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to list reviews")?;

    Ok(rows
        .into_iter()
        .map(|row| ReviewListItem {
            id: row.get("id"),
            text: row.get("text"),
        })
        .collect())
}

fn review_from_row(row: &sqlx::postgres::PgRow) -> ReviewResponse {
    ReviewResponse {
        id: row.get("id"),
        product_id: row.get("product_id"),
        text: row.get("text"),
        stars: row.get("stars"),
    }
}

pub(super) async fn insert_review(
    pool: &PgPool,
    product_id: i64,
    text: &str,
    stars: i16,
) -> Result<UpsertOutcome<ReviewResponse>> {
    let query = r"
        INSERT INTO reviews (product_id, text, stars)
        VALUES ($1, $2, $3)
        RETURNING id, product_id, text, stars
    ";
    let row = sqlx::query(query)
        .bind(product_id)
        .bind(text)
        .bind(stars)
        .fetch_one(pool)
        .instrument(db_span("INSERT", query))
        .await;

    match row {
        Ok(row) => Ok(UpsertOutcome::Saved(review_from_row(&row))),
        Err(err) if is_foreign_key_violation(&err) => Ok(UpsertOutcome::MissingParent),
        Err(err) => Err(err).context("failed to insert review"),
    }
}

pub(super) async fn fetch_review(pool: &PgPool, id: i64) -> Result<Option<ReviewResponse>> {
    let query = "SELECT id, product_id, text, stars FROM reviews WHERE id = $1";
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(db_span("SELECT", query))
        .await
        .context("failed to fetch review")?;

    Ok(row.map(|row| review_from_row(&row)))
}

pub(super) async fn update_review(
    pool: &PgPool,
    id: i64,
    product_id: i64,
    text: &str,
    stars: i16,
) -> Result<UpsertOutcome<Option<ReviewResponse>>> {
    let query = r"
        UPDATE reviews
        SET product_id = $2, text = $3, stars = $4
        WHERE id = $1
        RETURNING id, product_id, text, stars
    ";
    let row = sqlx::query(query)
        .bind(id)
        .bind(product_id)
        .bind(text)
        .bind(stars)
        .fetch_optional(pool)
        .instrument(db_span("UPDATE", query))
        .await;

    match row {
        Ok(row) => Ok(UpsertOutcome::Saved(row.map(|row| review_from_row(&row)))),
        Err(err) if is_foreign_key_violation(&err) => Ok(UpsertOutcome::MissingParent),
        Err(err) => Err(err).context("failed to update review"),
    }
}

pub(super) async fn delete_review(pool: &PgPool, id: i64) -> Result<bool> {
    let query = "DELETE FROM reviews WHERE id = $1";
    let result = sqlx::query(query)
        .bind(id)
        .execute(pool)
        .instrument(db_span("DELETE", query))
        .await
        .context("failed to delete review")?;

    Ok(result.rows_affected() > 0)
}
