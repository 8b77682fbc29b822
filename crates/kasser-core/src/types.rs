//! # Domain Types
//!
//! Core domain types used throughout Kasser POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │     Store       │──owns──┬──► User, Category, Product               │
//! │  │  id, name       │        ├──► Order ──► OrderItem (price snapshot)  │
//! │  └─────────────────┘        └──► AppSettings (one row, tax policy)     │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │ PaymentMethod   │   │   OrderView     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Cash           │   │  derived tax    │       │
//! │  │  1400 = 14 %    │   │  Card           │   │  derived total  │       │
//! │  │  = 0.1400       │   │  Wallet         │   │  line totals    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenant Column
//! Every record below a Store carries `store_id`. Reads and writes always
//! filter on it; there is no query path that crosses stores except the
//! order-number sequence, which is global by design of the numbering scheme.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::pricing::OrderTotals;
use crate::tenant::Role;
use crate::DELETED_PRODUCT_NAME;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so the stored integer is exactly the
/// 4-decimal fraction used on orders: 1400 bps = 0.1400 = 14 %.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Parses a percentage (`14`, `8.25`) in the range 0–100.
    ///
    /// More than 2 decimal places cannot be represented in bps and is rejected.
    pub fn try_from_percent(percent: Decimal) -> Result<Self, ValidationError> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(ValidationError::OutOfRange {
                field: "taxRate".to_string(),
                min: "0".to_string(),
                max: "100".to_string(),
            });
        }

        let mut scaled = percent.normalize();
        if scaled.scale() > 2 {
            return Err(ValidationError::InvalidFormat {
                field: "taxRate".to_string(),
                reason: "at most 2 decimal places are allowed".to_string(),
            });
        }
        scaled.rescale(2);

        // 0..=10000 after the range check above
        Ok(TaxRate(scaled.mantissa() as u32))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// The rate as a fraction with 4 decimals (`0.1400`).
    #[inline]
    pub fn as_fraction(&self) -> Decimal {
        Decimal::new(self.0 as i64, 4)
    }

    /// The rate as a percentage with 2 decimals (`14.00`).
    #[inline]
    pub fn as_percent(&self) -> Decimal {
        Decimal::new(self.0 as i64, 2)
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid. A label only; no gateway is involved.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    Wallet,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Wallet => "Wallet",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(PaymentMethod::Cash),
            "Card" => Ok(PaymentMethod::Card),
            "Wallet" => Ok(PaymentMethod::Wallet),
            other => Err(ValidationError::InvalidFormat {
                field: "paymentMethod".to_string(),
                reason: format!("'{other}' is not one of Cash, Card, Wallet"),
            }),
        }
    }
}

// =============================================================================
// Store & User
// =============================================================================

/// A tenant: an isolated business account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Subscription end, if the store is time-limited.
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A staff account. SuperAdmins are not bound to a store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub store_id: Option<i64>,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product category within a store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A product available for sale.
///
/// ## Availability Invariant
/// `stock == 0` implies `is_available == false`. Every stock mutation
/// (checkout decrement, manual restock) maintains it; the database does not.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub store_id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    /// Price in cents (smallest currency unit).
    pub price_cents: i64,
    /// Units on hand, never negative.
    pub stock: i64,
    pub is_available: bool,
    pub image_url: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Incremented on every stock mutation.
    pub version: i64,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub category_id: Option<i64>,
    pub image_url: Option<String>,
    pub is_available: bool,
}

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

// =============================================================================
// Cart (order input)
// =============================================================================

/// One requested line of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
    /// Price the client displayed when the line was added.
    pub price_at_time: Money,
}

/// A cart submitted for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub lines: Vec<CartLine>,
    pub discount: Money,
    pub payment_method: PaymentMethod,
}

// =============================================================================
// Order
// =============================================================================

/// A confirmed order. Immutable once written.
///
/// Tax amount and total are never stored; see [`Order::totals`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    pub store_id: i64,
    pub user_id: Option<i64>,
    /// `YYYYMMDD-NNNN`, unique across all stores.
    pub order_number: String,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_rate_bps: u32,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Recomputes the derived amounts from the stored ones.
    pub fn totals(&self) -> OrderTotals {
        OrderTotals::compute(
            Money::from_cents(self.subtotal_cents),
            Money::from_cents(self.discount_cents),
            self.tax_rate(),
        )
    }
}

/// One line of a confirmed order, joined with the product's current name.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    /// `None` once the product row no longer exists.
    pub product_name: Option<String>,
    pub quantity: i64,
    /// Unit price captured at confirmation, never re-read.
    pub price_at_time_cents: i64,
}

impl OrderItem {
    #[inline]
    pub fn price_at_time(&self) -> Money {
        Money::from_cents(self.price_at_time_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.price_at_time().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order Projection (API shape)
// =============================================================================

/// The client-facing shape of an order, with derived amounts filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderView {
    pub id: i64,
    pub order_number: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub discount: Decimal,
    /// Fraction, e.g. `0.14`.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItemView {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub price_at_time: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub total: Decimal,
}

impl OrderView {
    /// Builds the projection from a stored order and its lines.
    pub fn project(order: &Order, items: &[OrderItem]) -> Self {
        let totals = order.totals();

        OrderView {
            id: order.id,
            order_number: order.order_number.clone(),
            created_at: order.created_at,
            subtotal: totals.subtotal.to_decimal(),
            discount: totals.discount.to_decimal(),
            tax_rate: totals.tax_rate.as_fraction(),
            tax_amount: totals.tax.to_decimal(),
            total: totals.total.to_decimal(),
            payment_method: order.payment_method,
            items: items
                .iter()
                .map(|item| OrderItemView {
                    id: item.id,
                    product_id: item.product_id,
                    product_name: item
                        .product_name
                        .clone()
                        .unwrap_or_else(|| DELETED_PRODUCT_NAME.to_string()),
                    quantity: item.quantity,
                    price_at_time: item.price_at_time().to_decimal(),
                    total: item.line_total().to_decimal(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Settings & Tax Policy
// =============================================================================

/// Per-store settings row (exactly one per store).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AppSettings {
    pub id: i64,
    pub store_id: i64,
    pub tax_enabled: bool,
    /// `None` falls back to the default 14 %.
    pub tax_rate_bps: Option<u32>,
    pub store_name: String,
    pub currency: String,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl AppSettings {
    /// The configured rate, regardless of whether tax is enabled.
    pub fn configured_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps.unwrap_or(crate::DEFAULT_TAX_RATE_BPS))
    }

    pub fn tax_policy(&self) -> TaxPolicy {
        TaxPolicy {
            enabled: self.tax_enabled,
            rate: self.configured_rate(),
        }
    }
}

/// Full replacement of a store's editable settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub tax_enabled: bool,
    pub tax_rate: TaxRate,
    pub store_name: String,
    pub currency: String,
}

/// Whether a store charges tax, and at which rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxPolicy {
    pub enabled: bool,
    pub rate: TaxRate,
}

impl TaxPolicy {
    /// Policy for a store that has never saved settings: no tax.
    pub const fn disabled() -> Self {
        TaxPolicy {
            enabled: false,
            rate: TaxRate::zero(),
        }
    }

    /// Resolves the rate an order is charged: the stored rate when tax is
    /// enabled, zero otherwise (including stores without settings).
    pub fn resolve(settings: Option<&AppSettings>) -> TaxRate {
        settings
            .map(AppSettings::tax_policy)
            .unwrap_or_else(TaxPolicy::disabled)
            .effective_rate()
    }

    pub fn effective_rate(&self) -> TaxRate {
        if self.enabled {
            self.rate
        } else {
            TaxRate::zero()
        }
    }
}

/// Settings as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SettingsView {
    pub tax_enabled: bool,
    /// Percentage, e.g. `14`.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub tax_rate: Decimal,
    pub store_name: String,
    pub currency: String,
}

impl From<&AppSettings> for SettingsView {
    fn from(settings: &AppSettings) -> Self {
        SettingsView {
            tax_enabled: settings.tax_enabled,
            tax_rate: settings.configured_rate().as_percent(),
            store_name: settings.store_name.clone(),
            currency: settings.currency.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(enabled: bool, bps: Option<u32>) -> AppSettings {
        AppSettings {
            id: 1,
            store_id: 1,
            tax_enabled: enabled,
            tax_rate_bps: bps,
            store_name: "KasserPro".to_string(),
            currency: "EGP".to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_tax_rate_representations() {
        let rate = TaxRate::from_bps(1400);
        assert_eq!(rate.as_fraction().to_string(), "0.1400");
        assert_eq!(rate.as_percent().to_string(), "14.00");
    }

    #[test]
    fn test_tax_rate_from_percent() {
        assert_eq!(TaxRate::try_from_percent(Decimal::new(14, 0)).unwrap().bps(), 1400);
        assert_eq!(TaxRate::try_from_percent(Decimal::new(825, 2)).unwrap().bps(), 825);
        assert_eq!(TaxRate::try_from_percent(Decimal::ONE_HUNDRED).unwrap().bps(), 10000);
        assert!(TaxRate::try_from_percent(Decimal::new(-1, 0)).is_err());
        assert!(TaxRate::try_from_percent(Decimal::new(101, 0)).is_err());
        assert!(TaxRate::try_from_percent(Decimal::new(14125, 3)).is_err());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("Card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert!("Bitcoin".parse::<PaymentMethod>().is_err());
        // Case matters on the wire
        assert!("cash".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_serde_names() {
        let json = serde_json::to_string(&PaymentMethod::Wallet).unwrap();
        assert_eq!(json, "\"Wallet\"");
        assert!(serde_json::from_str::<PaymentMethod>("\"Crypto\"").is_err());
    }

    #[test]
    fn test_tax_policy_resolution() {
        // No settings row at all → no tax
        assert!(TaxPolicy::resolve(None).is_zero());

        // Enabled without a stored rate → 14 %
        assert_eq!(TaxPolicy::resolve(Some(&settings(true, None))).bps(), 1400);

        // Enabled with a stored rate
        assert_eq!(TaxPolicy::resolve(Some(&settings(true, Some(500)))).bps(), 500);

        // Disabled ignores the stored rate
        assert!(TaxPolicy::resolve(Some(&settings(false, Some(500)))).is_zero());
    }

    #[test]
    fn test_order_view_projection() {
        let order = Order {
            id: 7,
            store_id: 1,
            user_id: Some(1),
            order_number: "20261019-0001".to_string(),
            subtotal_cents: 3000,
            discount_cents: 0,
            tax_rate_bps: 1400,
            payment_method: PaymentMethod::Cash,
            created_at: Utc::now(),
        };
        let items = vec![
            OrderItem {
                id: 1,
                order_id: 7,
                product_id: 1,
                product_name: Some("Falafel".to_string()),
                quantity: 2,
                price_at_time_cents: 1500,
            },
            OrderItem {
                id: 2,
                order_id: 7,
                product_id: 9,
                product_name: None,
                quantity: 1,
                price_at_time_cents: 0,
            },
        ];

        let view = OrderView::project(&order, &items);
        assert_eq!(view.subtotal, Decimal::new(3000, 2));
        assert_eq!(view.tax_amount, Decimal::new(420, 2));
        assert_eq!(view.total, Decimal::new(3420, 2));
        assert_eq!(view.tax_rate, Decimal::new(1400, 4));
        assert_eq!(view.items[0].total, Decimal::new(3000, 2));
        assert_eq!(view.items[1].product_name, DELETED_PRODUCT_NAME);
    }

    #[test]
    fn test_order_view_json_shape() {
        let order = Order {
            id: 1,
            store_id: 1,
            user_id: None,
            order_number: "20261019-0002".to_string(),
            subtotal_cents: 3000,
            discount_cents: 0,
            tax_rate_bps: 1400,
            payment_method: PaymentMethod::Card,
            created_at: Utc::now(),
        };
        let view = OrderView::project(&order, &[]);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["orderNumber"], "20261019-0002");
        assert_eq!(json["paymentMethod"], "Card");
        let total = json["total"].as_f64().unwrap();
        let tax = json["taxAmount"].as_f64().unwrap();
        assert!((total - 34.2).abs() < 1e-9);
        assert!((tax - 4.2).abs() < 1e-9);
    }

    #[test]
    fn test_settings_view_defaults_rate() {
        let view = SettingsView::from(&settings(true, None));
        assert_eq!(view.tax_rate, Decimal::new(1400, 2));
        assert!(view.tax_enabled);
    }
}
