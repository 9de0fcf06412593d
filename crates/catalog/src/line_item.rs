use storefront_core::ProductId;

/// One `(product, quantity)` pair of a submitted cart.
///
/// Quantity is kept signed so malformed input reaches the validator instead of
/// being dropped at the wire; it must be positive to pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl CartLineItem {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}
