//! # Receipt Rendering
//!
//! Turns a projected order into bytes for an ESC/POS thermal printer.
//!
//! ## Layout
//! ```text
//!        KasserPro                   ◄── store name, centred
//! ========================
//! Order: 20261019-0001
//! Date: 2026-10-19 09:30
//! ========================
//! Falafel x2     30.00 EGP           ◄── one line per item
//! ------------------------
//! Subtotal: 30.00 EGP
//! Discount: 0.00 EGP
//! Tax: 4.20 EGP                      ◄── omitted when tax is zero
//! Net: 34.20 EGP
//! Payment: Cash
//! ========================
//!      Thank you for your visit
//! ```
//!
//! Wrapped in `ESC @` (initialize) and `GS V 0` (full cut). Text is UTF-8;
//! the printer is expected to be configured for it.

use rust_decimal::Decimal;

use crate::types::OrderView;

/// `ESC @`: reset the printer.
pub const ESC_INIT: &[u8] = b"\x1B\x40";

/// `GS V 0`: full paper cut.
pub const GS_CUT: &[u8] = b"\x1D\x56\x00";

/// Printable width in characters of a 58 mm roll.
pub const LINE_WIDTH: usize = 32;

const DOUBLE_RULE: &str = "========================";
const SINGLE_RULE: &str = "------------------------";

/// Renders a receipt for `order`.
pub fn render_receipt(order: &OrderView, store_name: &str, currency: &str) -> Vec<u8> {
    let mut text = String::new();
    let amount = |value: Decimal| format!("{value:.2} {currency}");

    text.push_str(&centred(store_name));
    text.push('\n');
    push_line(&mut text, DOUBLE_RULE);
    push_line(&mut text, &format!("Order: {}", order.order_number));
    push_line(
        &mut text,
        &format!("Date: {}", order.created_at.format("%Y-%m-%d %H:%M")),
    );
    push_line(&mut text, DOUBLE_RULE);

    for item in &order.items {
        push_line(
            &mut text,
            &format!(
                "{} x{}     {}",
                item.product_name,
                item.quantity,
                amount(item.total)
            ),
        );
    }

    push_line(&mut text, SINGLE_RULE);
    push_line(&mut text, &format!("Subtotal: {}", amount(order.subtotal)));
    push_line(&mut text, &format!("Discount: {}", amount(order.discount)));
    if order.tax_amount > Decimal::ZERO {
        push_line(&mut text, &format!("Tax: {}", amount(order.tax_amount)));
    }
    push_line(&mut text, &format!("Net: {}", amount(order.total)));
    push_line(&mut text, &format!("Payment: {}", order.payment_method));
    push_line(&mut text, DOUBLE_RULE);
    push_line(&mut text, &centred("Thank you for your visit"));
    text.push_str("\n\n\n");

    let mut bytes = Vec::with_capacity(ESC_INIT.len() + text.len() + GS_CUT.len());
    bytes.extend_from_slice(ESC_INIT);
    bytes.extend_from_slice(text.as_bytes());
    bytes.extend_from_slice(GS_CUT);
    bytes
}

fn push_line(buf: &mut String, line: &str) {
    buf.push_str(line);
    buf.push('\n');
}

fn centred(text: &str) -> String {
    let width = text.chars().count();
    let pad = LINE_WIDTH.saturating_sub(width) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Order, OrderItem, PaymentMethod};
    use chrono::{TimeZone, Utc};

    fn sample(tax_bps: u32) -> OrderView {
        let order = Order {
            id: 1,
            store_id: 1,
            user_id: None,
            order_number: "20261019-0001".to_string(),
            subtotal_cents: 3000,
            discount_cents: 0,
            tax_rate_bps: tax_bps,
            payment_method: PaymentMethod::Cash,
            created_at: Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
        };
        let items = vec![OrderItem {
            id: 1,
            order_id: 1,
            product_id: 1,
            product_name: Some("Falafel".to_string()),
            quantity: 2,
            price_at_time_cents: 1500,
        }];
        OrderView::project(&order, &items)
    }

    #[test]
    fn test_framing_bytes() {
        let bytes = render_receipt(&sample(1400), "KasserPro", "EGP");
        assert!(bytes.starts_with(ESC_INIT));
        assert!(bytes.ends_with(GS_CUT));
    }

    #[test]
    fn test_body() {
        let bytes = render_receipt(&sample(1400), "KasserPro", "EGP");
        let text = String::from_utf8(bytes[2..bytes.len() - 3].to_vec()).unwrap();

        assert!(text.contains("Order: 20261019-0001"));
        assert!(text.contains("Date: 2026-10-19 09:30"));
        assert!(text.contains("Falafel x2     30.00 EGP"));
        assert!(text.contains("Tax: 4.20 EGP"));
        assert!(text.contains("Net: 34.20 EGP"));
        assert!(text.contains("Payment: Cash"));
        assert!(text.lines().next().unwrap().trim() == "KasserPro");
    }

    #[test]
    fn test_no_tax_line_when_untaxed() {
        let bytes = render_receipt(&sample(0), "Cafe", "EGP");
        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("Tax:"));
        assert!(text.contains("Net: 30.00 EGP"));
    }

    #[test]
    fn test_multibyte_store_name_is_centred_by_chars() {
        assert_eq!(centred("كاشير").chars().count(), (LINE_WIDTH - 5) / 2 + 5);
    }
}
