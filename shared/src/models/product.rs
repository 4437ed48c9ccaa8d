//! Product Catalog Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tax::TaxClass;

/// Catalog product
///
/// The catalog is the source of truth for product names at order time and
/// for prices on the public-submission path. Products are scoped to the
/// admin account (tenant) that owns the menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub admin_user_id: String,
    pub name: String,
    pub price: Decimal,
    pub tax_class: TaxClass,
}

/// Upsert payload (tenant is taken from the acting user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpsert {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub tax_class: TaxClass,
}
