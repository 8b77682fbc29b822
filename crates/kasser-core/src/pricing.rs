//! # Pricing
//!
//! Order-level arithmetic: subtotal, discount bounds, tax and total.
//!
//! ```text
//! subtotal  = Σ price_at_time × quantity
//! taxable   = subtotal − discount            (0 ≤ discount ≤ subtotal)
//! tax       = round_half_up(taxable × rate)  (integer cents)
//! total     = taxable + tax
//! ```
//!
//! Only `subtotal`, `discount` and `rate` are persisted. `tax` and `total`
//! are recomputed from them on every read, so a stored order always
//! projects to the same amounts.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::TaxRate;

/// Derived amounts of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub total: Money,
}

impl OrderTotals {
    pub fn compute(subtotal: Money, discount: Money, tax_rate: TaxRate) -> Self {
        let taxable = subtotal - discount;
        let tax = taxable.calculate_tax(tax_rate);

        OrderTotals {
            subtotal,
            discount,
            tax_rate,
            tax,
            total: taxable + tax,
        }
    }
}

/// Sums `(unit price, quantity)` pairs.
pub fn subtotal_of<I>(lines: I) -> Money
where
    I: IntoIterator<Item = (Money, i64)>,
{
    lines
        .into_iter()
        .map(|(price, qty)| price.multiply_quantity(qty))
        .sum()
}

/// Rejects a discount below zero or above the subtotal.
pub fn check_discount(discount: Money, subtotal: Money) -> CoreResult<()> {
    if discount.is_negative() || discount > subtotal {
        return Err(CoreError::InvalidDiscount { discount, subtotal });
    }
    Ok(())
}
