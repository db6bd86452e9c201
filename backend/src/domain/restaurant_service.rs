use log::info;
use shared::Restaurant;

use crate::storage::{AddOutcome, FileConnection, RecordStore};

pub struct RestaurantService {
    store: RecordStore<Restaurant>,
}

impl RestaurantService {
    pub fn new(connection: &FileConnection) -> Self {
        Self {
            store: RecordStore::open(connection.restaurants_path(), connection.delimiter()),
        }
    }

    pub fn add(&mut self, restaurant: Restaurant) -> AddOutcome {
        info!("Adding restaurant '{}'", restaurant.name);
        self.store.add(restaurant)
    }

    pub fn all(&self) -> &[Restaurant] {
        self.store.records()
    }

    /// Remove every restaurant named `name` (case-insensitive)
    pub fn delete_by_name(&mut self, name: &str) -> bool {
        let deleted = self.store.delete_where(|r| r.name.eq_ignore_ascii_case(name));
        if deleted {
            info!("Restaurant '{}' deleted", name);
        } else {
            info!("Restaurant '{}' not found", name);
        }
        deleted
    }

    /// Restaurants serving `cuisine` (case-insensitive), in stored order
    pub fn by_cuisine(&self, cuisine: &str) -> Vec<&Restaurant> {
        self.store.filter(|r| r.cuisine.eq_ignore_ascii_case(cuisine))
    }

    pub fn store(&self) -> &RecordStore<Restaurant> {
        &self.store
    }
}
