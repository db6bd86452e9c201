use log::info;
use shared::Accommodation;

use crate::storage::{AddOutcome, FileConnection, RecordStore, UpdateOutcome};

/// Result of a booking request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked,
    AlreadyBooked { booked_by: String },
    NotFound,
    /// The booking could not be stored, e.g. an empty username
    Rejected { reason: String },
}

/// Listing, booking and removal of accommodations
pub struct AccommodationService {
    store: RecordStore<Accommodation>,
}

impl AccommodationService {
    pub fn new(connection: &FileConnection) -> Self {
        Self {
            store: RecordStore::open(connection.accommodations_path(), connection.delimiter()),
        }
    }

    /// Store `accommodation` as given. Id uniqueness is up to the caller,
    /// normally via [`AccommodationService::next_id`].
    pub fn add(&mut self, accommodation: Accommodation) -> AddOutcome {
        info!("Adding accommodation #{} for '{}'", accommodation.id, accommodation.admin_username);
        self.store.add(accommodation)
    }

    /// Highest stored id plus one, or 1 for an empty store
    pub fn next_id(&self) -> u32 {
        self.store
            .records()
            .iter()
            .map(|acc| acc.id)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }

    /// List a new, available property under the next free id
    pub fn create(
        &mut self,
        admin_username: &str,
        name: &str,
        location: &str,
        price_per_night: f64,
    ) -> (u32, AddOutcome) {
        let id = self.next_id();
        let outcome = self.add(Accommodation::new(id, admin_username, name, location, price_per_night));
        (id, outcome)
    }

    pub fn all(&self) -> &[Accommodation] {
        self.store.records()
    }

    pub fn available(&self) -> Vec<&Accommodation> {
        self.store.filter(|acc| acc.is_available())
    }

    pub fn find_by_id(&self, id: u32) -> Option<&Accommodation> {
        self.store.find(|acc| acc.id == id)
    }

    /// Book property `id` for `username` if it is still available
    pub fn book(&mut self, id: u32, username: &str) -> BookingOutcome {
        if username.trim().is_empty() {
            info!("Booking of accommodation #{} rejected: empty username", id);
            return BookingOutcome::Rejected {
                reason: "username must not be empty".to_string(),
            };
        }

        let booked_by = match self.find_by_id(id) {
            None => {
                info!("Booking failed: accommodation #{} not found", id);
                return BookingOutcome::NotFound;
            }
            Some(acc) => acc.booked_by().map(str::to_string),
        };

        if let Some(booked_by) = booked_by {
            info!("Accommodation #{} already booked by '{}'", id, booked_by);
            return BookingOutcome::AlreadyBooked { booked_by };
        }

        match self.store.update_first(|acc| acc.id == id, |acc| acc.book(username)) {
            UpdateOutcome::Updated => {
                info!("Accommodation #{} booked by '{}'", id, username);
                BookingOutcome::Booked
            }
            UpdateOutcome::NotFound => BookingOutcome::NotFound,
            UpdateOutcome::Rejected(reason) => {
                info!("Booking of accommodation #{} rejected: {}", id, reason);
                BookingOutcome::Rejected { reason }
            }
        }
    }

    /// Properties listed by `admin_username` (case-insensitive)
    pub fn properties_by_admin(&self, admin_username: &str) -> Vec<&Accommodation> {
        self.store.filter(|acc| acc.is_owned_by(admin_username))
    }

    /// Delete property `id`, but only on behalf of the admin who owns it
    pub fn delete_property(&mut self, id: u32, admin_username: &str) -> bool {
        let deleted = self
            .store
            .delete_where(|acc| acc.id == id && acc.is_owned_by(admin_username));
        info!(
            "Delete of accommodation #{} by '{}': {}",
            id,
            admin_username,
            if deleted { "done" } else { "no matching property" }
        );
        deleted
    }

    pub fn store(&self) -> &RecordStore<Accommodation> {
        &self.store
    }
}
