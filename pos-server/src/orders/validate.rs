//! Input validation for order payloads
//!
//! Shape checks run before a transaction is opened; anything that fails
//! here never touches the store.

use rust_decimal::Decimal;
use shared::models::{ExternalOrderSubmit, OrderCreate, OrderItemInput, OrderUpdate, PaymentMethod};

use super::{OrderError, OrderResult};

/// Maximum allowed price per item and order total
const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Maximum allowed quantity per item
const MAX_QUANTITY: u32 = 9999;

fn validate_money(value: Decimal, field: &str) -> OrderResult<()> {
    if value < Decimal::ZERO {
        return Err(OrderError::Validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    if value > MAX_PRICE {
        return Err(OrderError::Validation(format!(
            "{field} exceeds maximum allowed ({MAX_PRICE}), got {value}"
        )));
    }
    Ok(())
}

fn validate_quantity(quantity: u32) -> OrderResult<()> {
    if quantity == 0 {
        return Err(OrderError::Validation(
            "quantity must be positive".to_string(),
        ));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::Validation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    Ok(())
}

/// Validate one line item payload
pub fn validate_item(item: &OrderItemInput) -> OrderResult<()> {
    if item.product_id.is_empty() {
        return Err(OrderError::Validation("product_id is required".to_string()));
    }
    validate_quantity(item.quantity)?;
    validate_money(item.price, "price")?;
    if item.tax_rate < Decimal::ZERO {
        return Err(OrderError::Validation(format!(
            "tax_rate must be non-negative, got {}",
            item.tax_rate
        )));
    }
    Ok(())
}

/// Validate a create-order payload
pub fn validate_create(input: &OrderCreate) -> OrderResult<()> {
    validate_money(input.total, "total")?;
    if let Some(cash) = input.cash_received {
        validate_money(cash, "cash_received")?;
        if input.payment_method != PaymentMethod::Cash {
            return Err(OrderError::Validation(
                "cash_received is only meaningful for cash payments".to_string(),
            ));
        }
    }
    if let Some(ts) = &input.timestamp
        && chrono::DateTime::parse_from_rfc3339(ts).is_err()
    {
        return Err(OrderError::Validation(format!(
            "timestamp is not RFC 3339: {ts}"
        )));
    }
    for item in &input.items {
        validate_item(item)?;
    }
    Ok(())
}

/// Validate an update-order payload
pub fn validate_update(input: &OrderUpdate) -> OrderResult<()> {
    if let Some(total) = input.total {
        validate_money(total, "total")?;
    }
    if let Some(cash) = input.cash_received {
        validate_money(cash, "cash_received")?;
    }
    if let Some(ts) = &input.timestamp
        && chrono::DateTime::parse_from_rfc3339(ts).is_err()
    {
        return Err(OrderError::Validation(format!(
            "timestamp is not RFC 3339: {ts}"
        )));
    }
    if let Some(items) = &input.items {
        for item in items {
            validate_item(item)?;
        }
    }
    Ok(())
}

/// Validate a public submission payload
pub fn validate_submit(input: &ExternalOrderSubmit) -> OrderResult<()> {
    if input.admin_user_id.is_empty() {
        return Err(OrderError::Validation(
            "admin_user_id is required".to_string(),
        ));
    }
    if input.customer_name.trim().is_empty() {
        return Err(OrderError::Validation(
            "customer_name is required".to_string(),
        ));
    }
    if input.customer_phone.trim().is_empty() {
        return Err(OrderError::Validation(
            "customer_phone is required".to_string(),
        ));
    }
    if input.items.is_empty() {
        return Err(OrderError::Validation(
            "order must contain at least one item".to_string(),
        ));
    }
    for item in &input.items {
        if item.product_id.is_empty() {
            return Err(OrderError::Validation("product_id is required".to_string()));
        }
        validate_quantity(item.quantity)?;
    }
    Ok(())
}
