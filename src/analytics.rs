//! Back-office dashboard figures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::aggregates::{Order, OrderStatus, Product};
use crate::domain::value_objects::{Money, DEFAULT_CURRENCY};

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;
const TOP_PRODUCTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub units: u32,
    pub revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAlert {
    pub product_id: String,
    pub name: String,
    pub stock: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Sum of totals over orders that were not cancelled.
    pub revenue: Money,
    pub order_count: usize,
    pub orders_by_status: BTreeMap<OrderStatus, usize>,
    pub average_order_value: Money,
    pub top_products: Vec<TopProduct>,
    pub low_stock: Vec<StockAlert>,
    pub product_count: usize,
}

impl DashboardStats {
    pub fn compute(orders: &[Order], products: &[Product], low_stock_threshold: u32) -> Self {
        let mut by_status: BTreeMap<OrderStatus, usize> = BTreeMap::new();
        for o in orders {
            *by_status.entry(o.status()).or_default() += 1;
        }

        let billable: Vec<&Order> = orders.iter().filter(|o| o.status() != OrderStatus::Cancelled).collect();
        let revenue: Decimal = billable.iter().map(|o| o.total().amount()).sum();
        let average = if billable.is_empty() { Decimal::ZERO } else { (revenue / Decimal::from(billable.len())).round() };

        let mut sold: HashMap<&str, TopProduct> = HashMap::new();
        for line in billable.iter().flat_map(|o| o.items()) {
            let entry = sold.entry(line.product_id.as_str()).or_insert_with(|| TopProduct {
                product_id: line.product_id.clone(), name: line.name.clone(), units: 0,
                revenue: Money::zero(line.total.currency()),
            });
            entry.units = entry.units.saturating_add(line.quantity);
            if let Ok(sum) = entry.revenue.add(&line.total) { entry.revenue = sum; }
        }
        let mut top_products: Vec<TopProduct> = sold.into_values().collect();
        top_products.sort_by(|a, b| b.units.cmp(&a.units).then_with(|| a.product_id.cmp(&b.product_id)));
        top_products.truncate(TOP_PRODUCTS);

        let mut low_stock: Vec<StockAlert> = products.iter()
            .filter(|p| p.stock < low_stock_threshold)
            .map(|p| StockAlert { product_id: p.id.clone(), name: p.name.clone(), stock: p.stock })
            .collect();
        low_stock.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.product_id.cmp(&b.product_id)));

        Self {
            revenue: Money::new(revenue, DEFAULT_CURRENCY),
            order_count: orders.len(),
            orders_by_status: by_status,
            average_order_value: Money::new(average, DEFAULT_CURRENCY),
            top_products,
            low_stock,
            product_count: products.len(),
        }
    }
}
