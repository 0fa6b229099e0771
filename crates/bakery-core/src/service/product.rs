//! Product service.

use crate::store::RecordStore;
use crate::types::{Product, User};

use super::FilterableCrudService;

/// Filtered access to the product catalogue.
#[derive(Debug, Clone)]
pub struct ProductService<S> {
    store: S,
}

impl<S> ProductService<S>
where
    S: RecordStore<Entity = Product>,
{
    pub fn new(store: S) -> Self {
        ProductService { store }
    }
}

impl<S> FilterableCrudService for ProductService<S>
where
    S: RecordStore<Entity = Product>,
{
    type Entity = Product;
    type Store = S;

    fn store(&self) -> &S {
        &self.store
    }

    fn create_new(&self, _actor: &User) -> Product {
        Product::default()
    }
}
