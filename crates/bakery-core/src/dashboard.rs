//! # Dashboard Data
//!
//! The statistics snapshot handed to the dashboard view.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DashboardData (as_of = 2024-02-14)                                     │
//! │                                                                         │
//! │  delivery_stats         DeliveryStats { delivered_today, due_today, … } │
//! │  deliveries_this_month  [d1, d2, …, d29]    one per day of February     │
//! │  deliveries_this_year   [jan, feb, …, dec]  always 12                   │
//! │  sales_per_month        12 rows × N years   rows equally long           │
//! │                          jan: [2022, 2023, 2024]                        │
//! │                          …                                              │
//! │  product_deliveries     [(Croissant, 120), (Bun, 95), (Tart, 95), …]    │
//! │                          highest first, each product once               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! The reporting job fills a [`DashboardBuilder`] and calls
//! [`DashboardBuilder::build`], which checks every invariant above. A
//! `DashboardData` only exists fully populated and is read-only afterwards.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::validation::ValidationResult;

/// Months in a year; length of the yearly series and of `sales_per_month`.
pub const MONTHS_PER_YEAR: usize = 12;

/// Number of days in `date`'s calendar month (28–31).
pub fn days_in_month(date: NaiveDate) -> u32 {
    (28..=31)
        .rev()
        .find(|day| NaiveDate::from_ymd_opt(date.year(), date.month(), *day).is_some())
        .unwrap_or(28)
}

// =============================================================================
// Delivery Stats
// =============================================================================

/// Consolidated order counts for the counter tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeliveryStats {
    pub delivered_today: u64,
    pub due_today: u64,
    pub due_tomorrow: u64,
    /// Due today but flagged with a problem.
    pub not_available_today: u64,
    /// Orders not yet confirmed.
    pub new_orders: u64,
}

// =============================================================================
// Product Deliveries
// =============================================================================

/// Products paired with their delivery count, highest count first.
///
/// An ordered sequence of pairs, not a map: the position is the ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct ProductDeliveries(Vec<(Product, u64)>);

impl ProductDeliveries {
    /// Accepts pairs that are already ranked.
    ///
    /// ## Errors
    /// - `NotRanked` if a count is higher than the one before it
    /// - `Duplicate` if a product appears twice
    pub fn ranked(entries: Vec<(Product, u64)>) -> ValidationResult<Self> {
        if let Some(position) = entries.windows(2).position(|w| w[1].1 > w[0].1) {
            return Err(ValidationError::NotRanked {
                field: "product_deliveries".to_string(),
                position: position + 1,
            });
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for (product, _) in &entries {
            let key = product_key(product);
            if !seen.insert(key.clone()) {
                return Err(ValidationError::Duplicate {
                    field: "product_deliveries".to_string(),
                    value: key,
                });
            }
        }

        Ok(ProductDeliveries(entries))
    }

    /// Ranks unordered pairs by count, keeping the given order among equal
    /// counts.
    pub fn from_counts(mut entries: Vec<(Product, u64)>) -> ValidationResult<Self> {
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        ProductDeliveries::ranked(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Product, u64)> {
        self.0.iter().map(|(product, count)| (product, *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Delivery count for the product with `product_id`.
    pub fn get(&self, product_id: i64) -> Option<u64> {
        self.0
            .iter()
            .find(|(product, _)| product.id == Some(product_id))
            .map(|(_, count)| *count)
    }

    pub fn as_slice(&self) -> &[(Product, u64)] {
        &self.0
    }
}

/// Identity used for duplicate detection: the id when persisted, else the name.
fn product_key(product: &Product) -> String {
    match product.id {
        Some(id) => format!("#{id}"),
        None => product.name.clone(),
    }
}

// =============================================================================
// Dashboard Data
// =============================================================================

/// Immutable statistics snapshot for one dashboard request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardData {
    #[ts(as = "String")]
    as_of: NaiveDate,
    delivery_stats: DeliveryStats,
    deliveries_this_month: Vec<u64>,
    deliveries_this_year: Vec<u64>,
    sales_per_month: Vec<Vec<Money>>,
    product_deliveries: ProductDeliveries,
}

impl DashboardData {
    pub fn builder(as_of: NaiveDate) -> DashboardBuilder {
        DashboardBuilder::new(as_of)
    }

    /// The date the series are relative to.
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn delivery_stats(&self) -> &DeliveryStats {
        &self.delivery_stats
    }

    /// Deliveries per day of the `as_of` month, day 1 first.
    pub fn deliveries_this_month(&self) -> &[u64] {
        &self.deliveries_this_month
    }

    /// Deliveries per month of the `as_of` year, January first.
    pub fn deliveries_this_year(&self) -> &[u64] {
        &self.deliveries_this_year
    }

    /// All twelve monthly sales rows.
    pub fn sales_per_month(&self) -> &[Vec<Money>] {
        &self.sales_per_month
    }

    /// Sales row for a zero-based month index (0 = January).
    pub fn sales_for_month(&self, month_index: usize) -> Option<&[Money]> {
        self.sales_per_month.get(month_index).map(Vec::as_slice)
    }

    pub fn product_deliveries(&self) -> &ProductDeliveries {
        &self.product_deliveries
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Collects the parts of a [`DashboardData`] and validates them together.
///
/// ## Example
/// ```rust
/// use bakery_core::dashboard::{DashboardData, DeliveryStats, ProductDeliveries};
/// use bakery_core::money::Money;
/// use chrono::NaiveDate;
///
/// let as_of = NaiveDate::from_ymd_opt(2023, 2, 10).unwrap();
/// let data = DashboardData::builder(as_of)
///     .delivery_stats(DeliveryStats::default())
///     .deliveries_this_month(vec![0; 28])
///     .deliveries_this_year(vec![0; 12])
///     .sales_per_month(vec![vec![Money::zero(); 3]; 12])
///     .product_deliveries(ProductDeliveries::default())
///     .build()
///     .unwrap();
///
/// assert_eq!(data.deliveries_this_month().len(), 28);
/// ```
#[derive(Debug, Clone)]
pub struct DashboardBuilder {
    as_of: NaiveDate,
    delivery_stats: Option<DeliveryStats>,
    deliveries_this_month: Option<Vec<u64>>,
    deliveries_this_year: Option<Vec<u64>>,
    sales_per_month: Option<Vec<Vec<Money>>>,
    product_deliveries: Option<ProductDeliveries>,
}

impl DashboardBuilder {
    pub fn new(as_of: NaiveDate) -> Self {
        DashboardBuilder {
            as_of,
            delivery_stats: None,
            deliveries_this_month: None,
            deliveries_this_year: None,
            sales_per_month: None,
            product_deliveries: None,
        }
    }

    pub fn delivery_stats(mut self, stats: DeliveryStats) -> Self {
        self.delivery_stats = Some(stats);
        self
    }

    pub fn deliveries_this_month(mut self, per_day: Vec<u64>) -> Self {
        self.deliveries_this_month = Some(per_day);
        self
    }

    pub fn deliveries_this_year(mut self, per_month: Vec<u64>) -> Self {
        self.deliveries_this_year = Some(per_month);
        self
    }

    pub fn sales_per_month(mut self, rows: Vec<Vec<Money>>) -> Self {
        self.sales_per_month = Some(rows);
        self
    }

    pub fn product_deliveries(mut self, ranking: ProductDeliveries) -> Self {
        self.product_deliveries = Some(ranking);
        self
    }

    /// Validates every field and produces the snapshot.
    ///
    /// ## Errors
    /// `CoreError::InvalidDashboard` when a field is missing or a series has
    /// the wrong shape.
    pub fn build(self) -> CoreResult<DashboardData> {
        self.try_build().map_err(CoreError::InvalidDashboard)
    }

    fn try_build(self) -> ValidationResult<DashboardData> {
        let delivery_stats = require("delivery_stats", self.delivery_stats)?;
        let deliveries_this_month = require("deliveries_this_month", self.deliveries_this_month)?;
        let deliveries_this_year = require("deliveries_this_year", self.deliveries_this_year)?;
        let sales_per_month = require("sales_per_month", self.sales_per_month)?;
        let product_deliveries = require("product_deliveries", self.product_deliveries)?;

        expect_len(
            "deliveries_this_month",
            days_in_month(self.as_of) as usize,
            deliveries_this_month.len(),
        )?;
        expect_len("deliveries_this_year", MONTHS_PER_YEAR, deliveries_this_year.len())?;
        expect_len("sales_per_month", MONTHS_PER_YEAR, sales_per_month.len())?;

        let row_len = sales_per_month.first().map_or(0, Vec::len);
        for row in &sales_per_month {
            expect_len("sales_per_month row", row_len, row.len())?;
        }

        Ok(DashboardData {
            as_of: self.as_of,
            delivery_stats,
            deliveries_this_month,
            deliveries_this_year,
            sales_per_month,
            product_deliveries,
        })
    }
}

fn require<T>(field: &str, value: Option<T>) -> ValidationResult<T> {
    value.ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })
}

fn expect_len(field: &str, expected: usize, actual: usize) -> ValidationResult<()> {
    if expected != actual {
        return Err(ValidationError::InvalidLength {
            field: field.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
