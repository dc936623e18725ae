//! Review CRUD handlers.

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use tracing::error;

use super::storage::{self, UpsertOutcome};
use super::types::{ReviewListItem, ReviewRequest, ReviewResponse};
use crate::api::handlers::users::types::{ErrorResponse, FieldErrors};

const DEFAULT_STARS: i16 = 5;

/// Validated write payload.
struct ReviewInput {
    product_id: i64,
    text: String,
    stars: i16,
}

fn validate(payload: Option<Json<ReviewRequest>>) -> Result<ReviewInput, FieldErrors> {
    let Some(Json(request)) = payload else {
        let mut errors = FieldErrors::default();
        errors.push("product_id", "This field is required.");
        errors.push("text", "This field is required.");
        return Err(errors);
    };

    let mut errors = FieldErrors::default();

    let product_id = match request.product_id {
        None => {
            errors.push("product_id", "This field is required.");
            0
        }
        Some(product_id) => product_id,
    };

    let text = match request.text.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push("text", "This field is required.");
            String::new()
        }
        Some(text) => text.to_string(),
    };

    let stars = match request.stars {
        None => DEFAULT_STARS,
        Some(stars) if !(1..=5).contains(&stars) => {
            errors.push("stars", "Stars must be between 1 and 5.");
            stars
        }
        Some(stars) => stars,
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ReviewInput {
        product_id,
        text,
        stars,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    responses(
        (status = 200, description = "List reviews", body = [ReviewListItem]),
    ),
    tag = "catalog"
)]
pub async fn list_reviews(pool: Extension<PgPool>) -> impl IntoResponse {
    match storage::fetch_reviews(&pool).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(err) => {
            error!("Failed to list reviews: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid input", body = FieldErrors),
    ),
    tag = "catalog"
)]
pub async fn create_review(
    pool: Extension<PgPool>,
    payload: Option<Json<ReviewRequest>>,
) -> impl IntoResponse {
    let input = match validate(payload) {
        Ok(input) => input,
        Err(errors) => return (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
    };

    match storage::insert_review(&pool, input.product_id, &input.text, input.stars).await {
        Ok(UpsertOutcome::Saved(review)) => (StatusCode::CREATED, Json(review)).into_response(),
        Ok(UpsertOutcome::MissingParent) => (
            StatusCode::BAD_REQUEST,
            Json(FieldErrors::single("product_id", "Invalid product.")),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to create review: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}",
    params(("id" = i64, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review detail", body = ReviewResponse),
        (status = 404, description = "Review not found", body = ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn get_review(Path(id): Path<i64>, pool: Extension<PgPool>) -> impl IntoResponse {
    match storage::fetch_review(&pool, id).await {
        Ok(Some(review)) => (StatusCode::OK, Json(review)).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to get review: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/reviews/{id}",
    request_body = ReviewRequest,
    params(("id" = i64, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Invalid input", body = FieldErrors),
        (status = 404, description = "Review not found", body = ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn update_review(
    Path(id): Path<i64>,
    pool: Extension<PgPool>,
    payload: Option<Json<ReviewRequest>>,
) -> impl IntoResponse {
    let input = match validate(payload) {
        Ok(input) => input,
        Err(errors) => return (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
    };

    match storage::update_review(&pool, id, input.product_id, &input.text, input.stars).await {
        Ok(UpsertOutcome::Saved(Some(review))) => (StatusCode::OK, Json(review)).into_response(),
        Ok(UpsertOutcome::Saved(None)) => StatusCode::NOT_FOUND.into_response(),
        Ok(UpsertOutcome::MissingParent) => (
            StatusCode::BAD_REQUEST,
            Json(FieldErrors::single("product_id", "Invalid product.")),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to update review: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}",
    params(("id" = i64, Path, description = "Review id")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Review not found", body = ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn delete_review(Path(id): Path<i64>, pool: Extension<PgPool>) -> impl IntoResponse {
    match storage::delete_review(&pool, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to delete review: {err}");
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
    async fn create_review_missing_payload() -> Result<()> {
        let response = create_review(Extension(lazy_pool()?), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn create_review_stars_out_of_range() -> Result<()> {
        let response = create_review(
            Extension(lazy_pool()?),
            Some(Json(ReviewRequest {
                product_id: Some(1),
                text: Some("nice".to_string()),
                stars: Some(6),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[test]
    fn validate_defaults_stars() {
        let input = validate(Some(Json(ReviewRequest {
            product_id: Some(7),
            text: Some("solid".to_string()),
            stars: None,
        })));
        let input = input.expect("valid input");
        assert_eq!(input.stars, DEFAULT_STARS);
        assert_eq!(input.product_id, 7);
    }
}
