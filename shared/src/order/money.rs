//! Order pricing with rust_decimal
//!
//! Prices are never taken from the client: cart lines carry only a food id and
//! a quantity, and every amount is recomputed from the store's menu.

use std::collections::HashMap;

use rust_decimal::prelude::*;

use crate::error::{AppError, ErrorCode};
use crate::models::{OrderCreate, OrderItem, OrderItemInput, OrderType, StoreSettings};

/// Rounding for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

pub const MIN_QUANTITY: i32 = 1;
pub const MAX_QUANTITY: i32 = 99;
/// Maximum distinct lines in one order
pub const MAX_LINES: usize = 100;

/// Upper bound for any menu price or store fee
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Largest order total accepted; money columns are `NUMERIC(12,2)`
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Current price and availability of a food, as read from the store's menu
#[derive(Debug, Clone)]
pub struct MenuPrice {
    pub food_id: i64,
    pub name: String,
    pub price: Decimal,
    pub is_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

/// Priced cart plus totals, ready to persist
#[derive(Debug, Clone)]
pub struct OrderQuote {
    pub items: Vec<OrderItem>,
    pub totals: OrderTotals,
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    round_money(unit_price * Decimal::from(quantity))
}

/// Freeze cart lines against the menu.
///
/// `menu` must contain only foods of the ordering store; a missing id means the
/// food does not exist or belongs to another store.
pub fn price_items(
    inputs: &[OrderItemInput],
    menu: &HashMap<i64, MenuPrice>,
) -> Result<Vec<OrderItem>, AppError> {
    if inputs.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    if inputs.len() > MAX_LINES {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("An order may contain at most {MAX_LINES} lines"),
        ));
    }

    inputs
        .iter()
        .map(|input| {
            if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&input.quantity) {
                return Err(AppError::with_message(
                    ErrorCode::ValueOutOfRange,
                    format!("quantity must be between {MIN_QUANTITY} and {MAX_QUANTITY}"),
                )
                .with_detail("food_id", input.food_id));
            }
            let food = menu.get(&input.food_id).ok_or_else(|| {
                AppError::new(ErrorCode::FoodNotFound).with_detail("food_id", input.food_id)
            })?;
            if !food.is_available {
                return Err(AppError::with_message(
                    ErrorCode::FoodUnavailable,
                    format!("'{}' is currently unavailable", food.name),
                )
                .with_detail("food_id", input.food_id));
            }
            Ok(OrderItem {
                food_id: food.food_id,
                name: food.name.clone(),
                unit_price: food.price,
                quantity: input.quantity,
                line_total: line_total(food.price, input.quantity),
                notes: input
                    .notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from),
            })
        })
        .collect()
}

/// subtotal + round2(subtotal × tax_rate / 100) + delivery_fee
pub fn calculate_totals(
    items: &[OrderItem],
    tax_rate: Decimal,
    delivery_fee: Decimal,
) -> OrderTotals {
    let subtotal: Decimal = items.iter().map(|i| i.line_total).sum();
    let tax = round_money(subtotal * tax_rate / Decimal::ONE_HUNDRED);
    let delivery_fee = round_money(delivery_fee);
    OrderTotals {
        subtotal,
        tax,
        delivery_fee,
        total: subtotal + tax + delivery_fee,
    }
}

/// Check the order against the store's settings and price it.
pub fn quote_order(
    req: &OrderCreate,
    settings: &StoreSettings,
    menu: &HashMap<i64, MenuPrice>,
) -> Result<OrderQuote, AppError> {
    let accepted = match req.order_type {
        OrderType::DineIn => settings.accepts_dine_in,
        OrderType::Takeaway => settings.accepts_takeaway,
        OrderType::Delivery => settings.accepts_delivery,
    };
    if !accepted {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            format!("This store does not accept {} orders", req.order_type.as_db()),
        ));
    }
    if !settings.payment_methods.contains(&req.payment_method) {
        return Err(AppError::new(ErrorCode::PaymentInvalidMethod)
            .with_detail("payment_method", req.payment_method.as_db()));
    }

    let items = price_items(&req.items, menu)?;

    let delivery_fee = if req.order_type == OrderType::Delivery {
        let has_address = req
            .delivery_address
            .as_deref()
            .is_some_and(|a| !a.trim().is_empty());
        if !has_address {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "delivery_address is required for delivery orders",
            ));
        }
        let (fee, minimum) = settings.delivery_terms(req.delivery_zone.as_deref())?;
        let subtotal: Decimal = items.iter().map(|i| i.line_total).sum();
        if subtotal < minimum {
            return Err(AppError::new(ErrorCode::OrderBelowMinimum)
                .with_detail("minimum_order", minimum.to_string())
                .with_detail("subtotal", subtotal.to_string()));
        }
        fee
    } else {
        Decimal::ZERO
    };

    let totals = calculate_totals(&items, settings.tax_rate, delivery_fee);
    if totals.total > MAX_ORDER_TOTAL {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Order total may not exceed {MAX_ORDER_TOTAL}"),
        )
        .with_detail("total", totals.total.to_string()));
    }
    Ok(OrderQuote { items, totals })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeliveryZone, PaymentMethod};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn menu() -> HashMap<i64, MenuPrice> {
        let mut menu = HashMap::new();
        menu.insert(
            1,
            MenuPrice {
                food_id: 1,
                name: "Margherita".into(),
                price: dec("8.50"),
                is_available: true,
            },
        );
        menu.insert(
            2,
            MenuPrice {
                food_id: 2,
                name: "Tiramisu".into(),
                price: dec("4.35"),
                is_available: true,
            },
        );
        menu.insert(
            3,
            MenuPrice {
                food_id: 3,
                name: "Truffle pasta".into(),
                price: dec("19.00"),
                is_available: false,
            },
        );
        menu
    }

    fn line(food_id: i64, quantity: i32) -> OrderItemInput {
        OrderItemInput {
            food_id,
            quantity,
            notes: None,
        }
    }

    fn request(order_type: OrderType, items: Vec<OrderItemInput>) -> OrderCreate {
        OrderCreate {
            order_type,
            items,
            payment_method: PaymentMethod::Cash,
            table_id: None,
            table_token: None,
            customer_name: None,
            customer_phone: None,
            delivery_address: None,
            delivery_zone: None,
            notes: None,
        }
    }

    #[test]
    fn test_price_items_uses_menu_prices() {
        let items = price_items(&[line(1, 2), line(2, 1)], &menu()).unwrap();
        assert_eq!(items[0].name, "Margherita");
        assert_eq!(items[0].line_total, dec("17.00"));
        assert_eq!(items[1].line_total, dec("4.35"));
    }

    #[test]
    fn test_price_items_rejections() {
        let menu = menu();
        let err = price_items(&[], &menu).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderEmpty);

        let err = price_items(&[line(99, 1)], &menu).unwrap_err();
        assert_eq!(err.code, ErrorCode::FoodNotFound);

        let err = price_items(&[line(3, 1)], &menu).unwrap_err();
        assert_eq!(err.code, ErrorCode::FoodUnavailable);

        let err = price_items(&[line(1, 0)], &menu).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);

        let err = price_items(&[line(1, 100)], &menu).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        let items = price_items(&[line(2, 1)], &menu()).unwrap();
        // 4.35 * 10% = 0.435 -> 0.44
        let totals = calculate_totals(&items, dec("10"), Decimal::ZERO);
        assert_eq!(totals.tax, dec("0.44"));
        assert_eq!(totals.total, dec("4.79"));
    }

    #[test]
    fn test_quote_dine_in() {
        let settings = StoreSettings {
            tax_rate: dec("8"),
            ..Default::default()
        };
        let quote = quote_order(&request(OrderType::DineIn, vec![line(1, 2)]), &settings, &menu())
            .unwrap();
        assert_eq!(quote.totals.subtotal, dec("17.00"));
        assert_eq!(quote.totals.tax, dec("1.36"));
        assert_eq!(quote.totals.delivery_fee, Decimal::ZERO);
        assert_eq!(quote.totals.total, dec("18.36"));
    }

    #[test]
    fn test_quote_delivery_rules() {
        let mut settings = StoreSettings {
            accepts_delivery: true,
            delivery_fee: dec("2.50"),
            minimum_order: dec("15"),
            delivery_zones: vec![DeliveryZone {
                name: "North".into(),
                fee: dec("4"),
                minimum_order: Some(dec("30")),
            }],
            ..Default::default()
        };

        let mut req = request(OrderType::Delivery, vec![line(1, 2)]);
        let err = quote_order(&req, &settings, &menu()).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);

        req.delivery_address = Some("Via Roma 1".into());
        let quote = quote_order(&req, &settings, &menu()).unwrap();
        assert_eq!(quote.totals.delivery_fee, dec("2.50"));
        assert_eq!(quote.totals.total, dec("19.50"));

        req.delivery_zone = Some("North".into());
        let err = quote_order(&req, &settings, &menu()).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderBelowMinimum);

        settings.accepts_delivery = false;
        let err = quote_order(&req, &settings, &menu()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[test]
    fn test_quote_rejects_unaccepted_payment_method() {
        let settings = StoreSettings {
            payment_methods: vec![PaymentMethod::Card],
            ..Default::default()
        };
        let err = quote_order(&request(OrderType::Takeaway, vec![line(1, 1)]), &settings, &menu())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentInvalidMethod);
    }

    #[test]
    fn test_quote_rejects_totals_beyond_storage() {
        let menu: HashMap<i64, MenuPrice> = (1..=MAX_LINES as i64)
            .map(|id| {
                let price = MenuPrice {
                    food_id: id,
                    name: format!("Tasting menu {id}"),
                    price: MAX_PRICE,
                    is_available: true,
                };
                (id, price)
            })
            .collect();
        let settings = StoreSettings {
            tax_rate: Decimal::ONE_HUNDRED,
            ..Default::default()
        };

        let single = request(OrderType::Takeaway, vec![line(1, MAX_QUANTITY)]);
        let quote = quote_order(&single, &settings, &menu).unwrap();
        assert_eq!(quote.totals.total, dec("198000000.00"));

        let lines = (1..=MAX_LINES as i64).map(|id| line(id, MAX_QUANTITY)).collect();
        let err = quote_order(&request(OrderType::Takeaway, lines), &settings, &menu).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert!(err.details.unwrap().contains_key("total"));
    }
}
