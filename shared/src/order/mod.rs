//! Order rules shared by every surface that places or advances orders

pub mod money;
pub mod status;

pub use money::{
    MAX_ORDER_TOTAL, MAX_PRICE, MenuPrice, OrderQuote, OrderTotals, calculate_totals,
    price_items, quote_order,
};
pub use status::{check_payment_change, check_status_change};
