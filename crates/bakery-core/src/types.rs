//! # Domain Types
//!
//! Entities managed by the admin backend and the actor performing requests.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PickupLocation  │   │    Product      │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │       │
//! │  │  name ◄ filter  │   │  name ◄ filter  │   │  customer_name  │       │
//! │  │                 │   │  price (Money)  │   │    ◄ filter     │       │
//! │  └─────────────────┘   └─────────────────┘   │  due_date       │       │
//! │                                              │  state          │       │
//! │  ┌─────────────────┐   ┌─────────────────┐   │  total (Money)  │       │
//! │  │      User       │   │   OrderItem     │   └─────────────────┘       │
//! │  │  (the actor,    │   │  order_id (FK)  │                             │
//! │  │  not persisted) │   │  product_id(FK) │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every [`Entity`] has a numeric surrogate key assigned by the record store.
//! A freshly created instance has `id: None` until it is saved.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{self, ValidationResult};

// =============================================================================
// Entity Contract
// =============================================================================

/// A persisted record with an identity and a filterable display name.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human-readable kind, used in error messages and logs.
    const KIND: &'static str;

    /// Surrogate key, `None` until persisted.
    fn id(&self) -> Option<i64>;

    /// Assigns the surrogate key (called by stores on insert).
    fn set_id(&mut self, id: i64);

    /// The field substring filters are matched against.
    fn name(&self) -> &str;

    /// Checks the entity before it is written.
    fn validate(&self) -> ValidationResult<()> {
        Ok(())
    }
}

// =============================================================================
// Pickup Location
// =============================================================================

/// A place where customers collect their orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PickupLocation {
    pub id: Option<i64>,
    pub name: String,
}

impl PickupLocation {
    pub fn named(name: impl Into<String>) -> Self {
        PickupLocation {
            id: None,
            name: name.into(),
        }
    }
}

impl Entity for PickupLocation {
    const KIND: &'static str = "PickupLocation";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_name("name", &self.name)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product the bakery sells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: Option<i64>,
    pub name: String,
    /// Unit price in cents.
    pub price: Money,
}

impl Product {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Product {
            id: None,
            name: name.into(),
            price,
        }
    }
}

impl Entity for Product {
    const KIND: &'static str = "Product";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_name("name", &self.name)?;
        validation::validate_price(self.price)
    }
}

// =============================================================================
// Order State
// =============================================================================

/// Where an order is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OrderState {
    /// Placed, not yet confirmed by the bakery.
    #[default]
    New,
    Confirmed,
    /// Baked and waiting at the pickup location.
    Ready,
    Delivered,
    /// Something prevents delivery (out of stock, payment issue).
    Problem,
    Cancelled,
}

impl OrderState {
    /// Lowercase name as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderState::New => "new",
            OrderState::Confirmed => "confirmed",
            OrderState::Ready => "ready",
            OrderState::Delivered => "delivered",
            OrderState::Problem => "problem",
            OrderState::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order, due for pickup on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: String,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub due_time: Option<NaiveTime>,
    pub pickup_location_id: Option<i64>,
    pub state: OrderState,
    /// Sum of the order's line totals.
    pub total: Money,
    /// User who took the order.
    pub created_by: Option<i64>,
}

impl Order {
    /// A blank order taken by `actor`, due on `due_date`.
    pub fn taken_by(actor: &User, due_date: NaiveDate) -> Self {
        Order {
            id: None,
            customer_name: String::new(),
            customer_phone: String::new(),
            due_date,
            due_time: None,
            pickup_location_id: None,
            state: OrderState::New,
            total: Money::zero(),
            created_by: Some(actor.id),
        }
    }
}

impl Entity for Order {
    const KIND: &'static str = "Order";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn name(&self) -> &str {
        &self.customer_name
    }

    fn validate(&self) -> ValidationResult<()> {
        validation::validate_name("customer_name", &self.customer_name)?;
        validation::validate_phone(&self.customer_phone)?;
        validation::validate_price(self.total)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line of an order. Not filterable on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub id: Option<i64>,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub comment: Option<String>,
}

// =============================================================================
// User (actor)
// =============================================================================

/// Role of a back-office user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Baker,
    Barista,
}

/// The user on whose behalf a service call is made.
///
/// Authentication lives outside this workspace; services only receive the
/// resolved actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

// =============================================================================
// Unit Tests
// =============================================================================
