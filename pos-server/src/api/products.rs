//! Product Catalog API Handlers

use axum::{Json, extract::State};
use shared::models::{Product, ProductUpsert};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// GET /api/products - the acting tenant's catalog
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    let products = state.store.list_products_by_admin(user.tenant_id())?;
    Ok(Json(products))
}

/// POST /api/products - create or overwrite a catalog product (admin only)
pub async fn upsert(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductUpsert>,
) -> AppResult<Json<Product>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "catalog changes require an admin account".to_string(),
        ));
    }
    if payload.id.is_empty() || payload.name.is_empty() {
        return Err(AppError::Validation(
            "product id and name are required".to_string(),
        ));
    }
    let product = Product {
        id: payload.id,
        admin_user_id: user.tenant_id().to_string(),
        name: payload.name,
        price: payload.price,
        tax_class: payload.tax_class,
    };
    state.store.upsert_product(&product)?;
    Ok(Json(product))
}
