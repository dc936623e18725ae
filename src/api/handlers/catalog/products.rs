//! Product CRUD handlers.

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use tracing::error;

use super::storage::{self, UpsertOutcome};
use super::types::{ProductListItem, ProductRequest, ProductResponse, ProductWithReviews};
use crate::api::handlers::users::types::{ErrorResponse, FieldErrors};

/// Validated write payload.
struct ProductInput {
    title: String,
    description: String,
    price: f64,
    category_id: Option<i64>,
}

fn validate(payload: Option<Json<ProductRequest>>) -> Result<ProductInput, FieldErrors> {
    let Some(Json(request)) = payload else {
        let mut errors = FieldErrors::default();
        errors.push("title", "This field is required.");
        errors.push("price", "This field is required.");
        return Err(errors);
    };

    let mut errors = FieldErrors::default();

    let title = match request.title.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push("title", "This field is required.");
            String::new()
        }
        Some(title) => title.to_string(),
    };

    let price = match request.price {
        None => {
            errors.push("price", "This field is required.");
            0.0
        }
        Some(price) if !price.is_finite() || price < 0.0 => {
            errors.push("price", "Price must be a non-negative number.");
            price
        }
        Some(price) => price,
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ProductInput {
        title,
        description: request.description.unwrap_or_default(),
        price,
        category_id: request.category_id,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "List products", body = [ProductListItem]),
    ),
    tag = "catalog"
)]
pub async fn list_products(pool: Extension<PgPool>) -> impl IntoResponse {
    match storage::fetch_products(&pool).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => {
            error!("Failed to list products: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/products/with-reviews",
    responses(
        (status = 200, description = "Products with reviews and average rating", body = [ProductWithReviews]),
    ),
    tag = "catalog"
)]
pub async fn products_with_reviews(pool: Extension<PgPool>) -> impl IntoResponse {
    match storage::fetch_products_with_reviews(&pool).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => {
            error!("Failed to list products with reviews: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid input", body = FieldErrors),
    ),
    tag = "catalog"
)]
pub async fn create_product(
    pool: Extension<PgPool>,
    payload: Option<Json<ProductRequest>>,
) -> impl IntoResponse {
    let input = match validate(payload) {
        Ok(input) => input,
        Err(errors) => return (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
    };

    match storage::insert_product(
        &pool,
        &input.title,
        &input.description,
        input.price,
        input.category_id,
    )
    .await
    {
        Ok(UpsertOutcome::Saved(product)) => (StatusCode::CREATED, Json(product)).into_response(),
        Ok(UpsertOutcome::MissingParent) => (
            StatusCode::BAD_REQUEST,
            Json(FieldErrors::single("category_id", "Invalid category.")),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to create product: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product detail", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn get_product(Path(id): Path<i64>, pool: Extension<PgPool>) -> impl IntoResponse {
    match storage::fetch_product(&pool, id).await {
        Ok(Some(product)) => (StatusCode::OK, Json(product)).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to get product: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    request_body = ProductRequest,
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid input", body = FieldErrors),
        (status = 404, description = "Product not found", body = ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn update_product(
    Path(id): Path<i64>,
    pool: Extension<PgPool>,
    payload: Option<Json<ProductRequest>>,
) -> impl IntoResponse {
    let input = match validate(payload) {
        Ok(input) => input,
        Err(errors) => return (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
    };

    match storage::update_product(
        &pool,
        id,
        &input.title,
        &input.description,
        input.price,
        input.category_id,
    )
    .await
    {
        Ok(UpsertOutcome::Saved(Some(product))) => {
            (StatusCode::OK, Json(product)).into_response()
        }
        Ok(UpsertOutcome::Saved(None)) => StatusCode::NOT_FOUND.into_response(),
        Ok(UpsertOutcome::MissingParent) => (
            StatusCode::BAD_REQUEST,
            Json(FieldErrors::single("category_id", "Invalid category.")),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to update product: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn delete_product(Path(id): Path<i64>, pool: Extension<PgPool>) -> impl IntoResponse {
    match storage::delete_product(&pool, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to delete product: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> Result<PgPool> {
        Ok(PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?)
    }

    #[tokio::test]
    async fn create_product_missing_payload() -> Result<()> {
        let response = create_product(Extension(lazy_pool()?), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn create_product_negative_price() -> Result<()> {
        let response = create_product(
            Extension(lazy_pool()?),
            Some(Json(ProductRequest {
                title: Some("Keyboard".to_string()),
                description: None,
                price: Some(-1.0),
                category_id: None,
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn update_product_blank_title() -> Result<()> {
        let response = update_product(
            Path(1),
            Extension(lazy_pool()?),
            Some(Json(ProductRequest {
                title: Some("".to_string()),
                description: None,
                price: Some(9.99),
                category_id: None,
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[test]
    fn validate_defaults_description() {
        let input = validate(Some(Json(ProductRequest {
            title: Some("Keyboard".to_string()),
            description: None,
            price: Some(49.90),
            category_id: Some(3),
        })));
        let input = input.expect("valid input");
        assert_eq!(input.title, "Keyboard");
        assert_eq!(input.description, "");
        assert_eq!(input.category_id, Some(3));
    }
}
