//! Category CRUD handlers.

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use tracing::error;

use super::storage;
use super::types::{CategoryRequest, CategoryResponse, CategoryWithCount};
use crate::api::handlers::users::types::{ErrorResponse, FieldErrors};

/// Validate the request body, returning the trimmed name.
fn validate(payload: Option<Json<CategoryRequest>>) -> Result<String, (StatusCode, FieldErrors)> {
    let Some(Json(request)) = payload else {
        return Err((
            StatusCode::BAD_REQUEST,
            FieldErrors::single("name", "This field is required."),
        ));
    };

    match request.name.as_deref().map(str::trim) {
        None | Some("") => Err((
            StatusCode::BAD_REQUEST,
            FieldErrors::single("name", "This field is required."),
        )),
        Some(name) => Ok(name.to_string()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "List categories", body = [CategoryResponse]),
    ),
    tag = "catalog"
)]
pub async fn list_categories(pool: Extension<PgPool>) -> impl IntoResponse {
    match storage::fetch_categories(&pool).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => {
            error!("Failed to list categories: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/with-count",
    responses(
        (status = 200, description = "Categories with product counts", body = [CategoryWithCount]),
    ),
    tag = "catalog"
)]
pub async fn categories_with_count(pool: Extension<PgPool>) -> impl IntoResponse {
    match storage::fetch_categories_with_count(&pool).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => {
            error!("Failed to list categories with counts: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid input", body = FieldErrors),
    ),
    tag = "catalog"
)]
pub async fn create_category(
    pool: Extension<PgPool>,
    payload: Option<Json<CategoryRequest>>,
) -> impl IntoResponse {
    let name = match validate(payload) {
        Ok(name) => name,
        Err((status, errors)) => return (status, Json(errors)).into_response(),
    };

    match storage::insert_category(&pool, &name).await {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(err) => {
            error!("Failed to create category: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category detail", body = CategoryResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn get_category(Path(id): Path<i64>, pool: Extension<PgPool>) -> impl IntoResponse {
    match storage::fetch_category(&pool, id).await {
        Ok(Some(category)) => (StatusCode::OK, Json(category)).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to get category: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    request_body = CategoryRequest,
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Invalid input", body = FieldErrors),
        (status = 404, description = "Category not found", body = ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn update_category(
    Path(id): Path<i64>,
    pool: Extension<PgPool>,
    payload: Option<Json<CategoryRequest>>,
) -> impl IntoResponse {
    let name = match validate(payload) {
        Ok(name) => name,
        Err((status, errors)) => return (status, Json(errors)).into_response(),
    };

    match storage::update_category(&pool, id, &name).await {
        Ok(Some(category)) => (StatusCode::OK, Json(category)).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to update category: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn delete_category(Path(id): Path<i64>, pool: Extension<PgPool>) -> impl IntoResponse {
    match storage::delete_category(&pool, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to delete category: {err}");
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
    async fn create_category_missing_payload() -> Result<()> {
        let response = create_category(Extension(lazy_pool()?), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn create_category_blank_name() -> Result<()> {
        let response = create_category(
            Extension(lazy_pool()?),
            Some(Json(CategoryRequest {
                name: Some("   ".to_string()),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn update_category_missing_name() -> Result<()> {
        let response = update_category(
            Path(1),
            Extension(lazy_pool()?),
            Some(Json(CategoryRequest { name: None })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
