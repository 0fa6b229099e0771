//! Pickup location service.

use crate::store::RecordStore;
use crate::types::{PickupLocation, User};

use super::FilterableCrudService;

/// Filtered access to pickup locations.
#[derive(Debug, Clone)]
pub struct PickupLocationService<S> {
    store: S,
}

impl<S> PickupLocationService<S>
where
    S: RecordStore<Entity = PickupLocation>,
{
    pub fn new(store: S) -> Self {
        PickupLocationService { store }
    }
}

impl<S> FilterableCrudService for PickupLocationService<S>
where
    S: RecordStore<Entity = PickupLocation>,
{
    type Entity = PickupLocation;
    type Store = S;

    fn store(&self) -> &S {
        &self.store
    }

    fn create_new(&self, _actor: &User) -> PickupLocation {
        PickupLocation::default()
    }
}
