use super::handlers::{catalog, health, users};
use axum::Router;
use utoipa::openapi::{InfoBuilder, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` spec.
/// Routes added outside (like `/` or `OPTIONS /health`) are intentionally not documented.
pub(crate) fn api_router() -> OpenApiRouter {
    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    let router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(users::register))
        .routes(routes!(users::confirm))
        .routes(routes!(users::login))
        .routes(routes!(catalog::categories::list_categories))
        .routes(routes!(catalog::categories::create_category))
        .routes(routes!(catalog::categories::get_category))
        .routes(routes!(catalog::categories::update_category))
        .routes(routes!(catalog::categories::delete_category))
        .routes(routes!(catalog::categories::categories_with_count))
        .routes(routes!(catalog::products::list_products))
        .routes(routes!(catalog::products::create_product))
        .routes(routes!(catalog::products::get_product))
        .routes(routes!(catalog::products::update_product))
        .routes(routes!(catalog::products::delete_product))
        .routes(routes!(catalog::products::products_with_reviews))
        .routes(routes!(catalog::reviews::list_reviews))
        .routes(routes!(catalog::reviews::create_review))
        .routes(routes!(catalog::reviews::get_review))
        .routes(routes!(catalog::reviews::update_review))
        .routes(routes!(catalog::reviews::delete_review));

    router
}

/// Serve interactive docs for the generated spec.
pub(crate) fn swagger_ui(api: utoipa::openapi::OpenApi) -> Router {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", api)
        .into()
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    let mut users_tag = Tag::new("users");
    users_tag.description = Some("Registration, confirmation and login".to_string());

    let mut catalog_tag = Tag::new("catalog");
    catalog_tag.description = Some("Categories, products and reviews".to_string());

    OpenApiBuilder::new()
        .info(info)
        .tags(Some(vec![users_tag, catalog_tag]))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(
            spec.info.description.as_deref(),
            Some(env!("CARGO_PKG_DESCRIPTION"))
        );
    }

    #[test]
    fn openapi_tags_and_paths() {
        let spec = openapi();
        let tags = spec.tags.clone().unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "users"));
        assert!(tags.iter().any(|tag| tag.name == "catalog"));
        assert!(spec.paths.paths.contains_key("/api/v1/users/register"));
        assert!(spec.paths.paths.contains_key("/api/v1/users/confirm"));
        assert!(spec.paths.paths.contains_key("/api/v1/users/login"));
        assert!(spec.paths.paths.contains_key("/api/v1/products/{id}"));
        assert!(
            spec.paths
                .paths
                .contains_key("/api/v1/products/with-reviews")
        );
        assert!(
            spec.paths
                .paths
                .contains_key("/api/v1/categories/with-count")
        );
        assert!(spec.paths.paths.contains_key("/api/v1/reviews/{id}"));
    }
}
