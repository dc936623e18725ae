//! Request/response types for the catalog endpoints.
//!
//! Request fields are optional so missing values surface as field errors
//! instead of a deserialization rejection; responses mirror the stored row.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CategoryRequest {
    pub name: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CategoryWithCount {
    pub id: i64,
    pub name: String,
    pub products_count: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<i64>,
}

/// Trimmed list payload.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProductListItem {
    pub id: i64,
    pub title: String,
    pub price: f64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProductResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category_id: Option<i64>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProductWithReviews {
    pub id: i64,
    pub title: String,
    pub price: f64,
    /// Average stars across the product's reviews; 0 when unreviewed.
    pub rating: f64,
    pub reviews: Vec<ReviewListItem>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ReviewRequest {
    pub product_id: Option<i64>,
    pub text: Option<String>,
    pub stars: Option<i16>,
}

/// Trimmed list payload.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ReviewListItem {
    pub id: i64,
    pub text: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ReviewResponse {
    pub id: i64,
    pub product_id: i64,
    pub text: String,
    pub stars: i16,
}
