//! Order service.

use chrono::{Local, NaiveDate};

use crate::store::RecordStore;
use crate::types::{Order, User};

use super::FilterableCrudService;

/// Source of "today" for new orders.
pub type Clock = fn() -> NaiveDate;

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Filtered access to orders, matched on customer name.
///
/// Unlike locations and products, new orders depend on the actor: they are
/// recorded as taken by the current user and due today.
#[derive(Debug, Clone)]
pub struct OrderService<S> {
    store: S,
    today: Clock,
}

impl<S> OrderService<S>
where
    S: RecordStore<Entity = Order>,
{
    pub fn new(store: S) -> Self {
        OrderService {
            store,
            today: local_today,
        }
    }

    /// Uses `today` instead of the local calendar date.
    pub fn with_clock(mut self, today: Clock) -> Self {
        self.today = today;
        self
    }
}

impl<S> FilterableCrudService for OrderService<S>
where
    S: RecordStore<Entity = Order>,
{
    type Entity = Order;
    type Store = S;

    fn store(&self) -> &S {
        &self.store
    }

    fn create_new(&self, actor: &User) -> Order {
        Order::taken_by(actor, (self.today)())
    }
}
