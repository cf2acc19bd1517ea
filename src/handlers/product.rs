// src/handlers/product.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::instrument;
use validator::Validate;

use crate::dtos::product::{
    CreateProductRequest, CategoryStat, DeletedProduct, ListProductsQuery, Pagination,
    ProductResponse, ProductStats, TypeStat, UpdateProductRequest,
};
use crate::dtos::{ApiResponse, PagedResponse};
use crate::error::AppError;
use crate::middleware::auth::{AuthContext, Role};
use crate::models::product::Product;
use crate::state::AppState;

// GET /products/health - Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}

// POST /products - Create new product (admin only)
#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), AppError> {
    if auth.role != Role::Admin {
        return Err(AppError::forbidden("Admin role required for this operation"));
    }

    payload.validate()?;
    if let Some(discount_price) = payload.discount_price {
        if discount_price >= payload.price {
            return Err(AppError::validation(
                "discountPrice",
                "discountPrice should be less than price",
            ));
        }
    }

    // A concurrent duplicate insert loses the conflict arbitration at the
    // storage layer and comes back as zero rows, not as an error
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (sku, name, description, category, type, price, discount_price, quantity)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (sku) DO NOTHING
         RETURNING id, sku, name, description, category, type,
                   price::FLOAT8 AS price,
                   discount_price::FLOAT8 AS discount_price,
                   quantity, created_at, updated_at",
    )
    .bind(&payload.sku)
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(&payload.category)
    .bind(payload.product_type.as_str())
    .bind(payload.price)
    .bind(payload.discount_price)
    .bind(payload.quantity)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(AppError::duplicate_sku)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Product created successfully",
            ProductResponse::from(product),
        )),
    ))
}

// GET /products - Paginated search
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<PagedResponse<ProductResponse>>, AppError> {
    query.validate()?;

    // Intersect the requested type with what the role may see; a user asking
    // for private products gets an empty page, never an error
    let type_filter: Vec<String> = auth
        .role
        .visible_types()
        .iter()
        .filter(|t| **t == query.product_type)
        .map(|t| t.as_str().to_string())
        .collect();

    let offset = (query.page - 1) * query.limit;
    let pattern = format!("%{}%", query.search);

    let sql = format!(
        "SELECT id, sku, name, description, category, type,
                price::FLOAT8 AS price,
                discount_price::FLOAT8 AS discount_price,
                quantity, created_at, updated_at
         FROM products
         WHERE category = $1
           AND type = ANY($2)
           AND (name ILIKE $3 OR description ILIKE $3)
           AND price BETWEEN $4 AND $5
         ORDER BY {} {}
         LIMIT $6 OFFSET $7",
        query.sort.column(),
        query.order.sql(),
    );

    let products = sqlx::query_as::<_, Product>(&sql)
        .bind(&query.category)
        .bind(&type_filter)
        .bind(&pattern)
        .bind(query.min_price)
        .bind(query.max_price)
        .bind(query.limit)
        .bind(offset)
        .fetch_all(&state.db_pool)
        .await?;

    let total_items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&state.db_pool)
        .await?;

    let pagination = Pagination::compute(query.page, query.limit, products.len() as i64, total_items);
    let data = products.into_iter().map(ProductResponse::from).collect();

    Ok(Json(PagedResponse::new(
        "Products retrieved successfully",
        data,
        pagination,
    )))
}

// GET /products/:id - Get single product, visibility-filtered
#[instrument(skip(state))]
pub async fn get_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<ProductResponse>>, AppError> {
    let visible: Vec<String> = auth
        .role
        .visible_types()
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();

    // A private row is not-found to a non-admin, so its existence never leaks
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, sku, name, description, category, type,
                price::FLOAT8 AS price,
                discount_price::FLOAT8 AS discount_price,
                quantity, created_at, updated_at
         FROM products
         WHERE id = $1 AND type = ANY($2)",
    )
    .bind(id)
    .bind(&visible)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ApiResponse::new(
        "Product retrieved successfully",
        ProductResponse::from(product),
    )))
}

// PUT /products/:id - Partial update (admin only)
//
// Price changes re-check the discount invariant against the row's current
// stored discount_price inside the same transaction that holds the row lock,
// so two racing updates cannot leave discount_price >= price.
#[instrument(skip(state, payload))]
pub async fn update_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductResponse>>, AppError> {
    if auth.role != Role::Admin {
        return Err(AppError::forbidden("Admin role required for this operation"));
    }

    payload.validate()?;

    let mut tx = state.db_pool.begin().await?;

    let locked = sqlx::query_as::<_, Product>(
        "SELECT id, sku, name, description, category, type,
                price::FLOAT8 AS price,
                discount_price::FLOAT8 AS discount_price,
                quantity, created_at, updated_at
         FROM products
         WHERE id = $1
         FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    if locked.is_none() {
        tx.rollback().await?;
        return Err(AppError::not_found("Product not found"));
    }

    let product = if let Some(price) = payload.price {
        let updated = sqlx::query_as::<_, Product>(
            "UPDATE products SET
                 name = COALESCE($1, name),
                 price = $2,
                 quantity = COALESCE($3, quantity),
                 updated_at = now()
             WHERE id = $4
               AND (discount_price IS NULL OR discount_price < $2)
             RETURNING id, sku, name, description, category, type,
                       price::FLOAT8 AS price,
                       discount_price::FLOAT8 AS discount_price,
                       quantity, created_at, updated_at",
        )
        .bind(&payload.name)
        .bind(price)
        .bind(payload.quantity)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        match updated {
            Some(product) => product,
            None => {
                // Zero rows means the WHERE re-check failed against the
                // stored discount price
                tx.rollback().await?;
                return Err(AppError::validation(
                    "discountPrice",
                    "discountPrice should be less than price",
                ));
            }
        }
    } else {
        // Price untouched, no invariant to re-check
        sqlx::query_as::<_, Product>(
            "UPDATE products SET
                 name = COALESCE($1, name),
                 quantity = COALESCE($2, quantity),
                 updated_at = now()
             WHERE id = $3
             RETURNING id, sku, name, description, category, type,
                       price::FLOAT8 AS price,
                       discount_price::FLOAT8 AS discount_price,
                       quantity, created_at, updated_at",
        )
        .bind(&payload.name)
        .bind(payload.quantity)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?
    };

    tx.commit().await?;

    Ok(Json(ApiResponse::new(
        "Product updated successfully",
        ProductResponse::from(product),
    )))
}

// DELETE /products/:id - Hard delete (admin only)
#[instrument(skip(state))]
pub async fn delete_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<DeletedProduct>>, AppError> {
    if auth.role != Role::Admin {
        return Err(AppError::forbidden("Admin role required for this operation"));
    }

    let deleted = sqlx::query_as::<_, DeletedProduct>(
        "DELETE FROM products WHERE id = $1 RETURNING id, sku",
    )
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ApiResponse::new(
        "Product deleted successfully",
        deleted,
    )))
}

#[derive(sqlx::FromRow)]
struct StatsTotals {
    total_products: i64,
    total_inventory_value: f64,
    total_discounted_value: f64,
    out_of_stock_count: i64,
}

// GET /products/stats - Aggregate statistics (admin only)
#[instrument(skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<ProductStats>>, AppError> {
    if auth.role != Role::Admin {
        return Err(AppError::forbidden("Admin role required for this operation"));
    }

    // Read-only aggregates; consistency across the three reads is not required
    let totals = sqlx::query_as::<_, StatsTotals>(
        "SELECT COUNT(*) AS total_products,
                COALESCE(SUM(price * quantity), 0)::FLOAT8 AS total_inventory_value,
                COALESCE(SUM(quantity * COALESCE(discount_price, 0)), 0)::FLOAT8 AS total_discounted_value,
                COUNT(*) FILTER (WHERE quantity = 0) AS out_of_stock_count
         FROM products",
    )
    .fetch_one(&state.db_pool)
    .await?;

    let by_category = sqlx::query_as::<_, CategoryStat>(
        "SELECT category, COUNT(*) AS count,
                COALESCE(SUM(price * quantity), 0)::FLOAT8 AS total_value
         FROM products
         GROUP BY category
         ORDER BY category",
    )
    .fetch_all(&state.db_pool)
    .await?;

    let by_type = sqlx::query_as::<_, TypeStat>(
        "SELECT type AS product_type, COUNT(*) AS count,
                COALESCE(SUM(price * quantity), 0)::FLOAT8 AS total_value
         FROM products
         GROUP BY type
         ORDER BY type",
    )
    .fetch_all(&state.db_pool)
    .await?;

    // Defined as 0 for an empty table
    let average_price = if totals.total_products == 0 {
        0.0
    } else {
        (totals.total_inventory_value / totals.total_products as f64).floor()
    };

    Ok(Json(ApiResponse::new(
        "Statistics retrieved successfully",
        ProductStats {
            total_products: totals.total_products,
            total_inventory_value: totals.total_inventory_value,
            total_discounted_value: totals.total_discounted_value,
            average_price,
            out_of_stock_count: totals.out_of_stock_count,
            by_category,
            by_type,
        },
    )))
}
