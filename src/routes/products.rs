use axum::{
    routing::get,
    Router,
    middleware,
};
use crate::handlers::product::{
    health, get_stats, create_product, list_products, get_product, update_product, delete_product,
};
use crate::middleware::auth::require_role;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let open = Router::new()
        .route("/products/health", get(health));

    // Role header required; admin-only operations enforce the role in the handler
    let protected = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/stats", get(get_stats))
        .route("/products/{id}", get(get_product).put(update_product).delete(delete_product))
        .route_layer(middleware::from_fn(require_role));

    open.merge(protected)
}
