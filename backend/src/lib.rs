//! # AMS Backend
//!
//! Flat-file persistence for users, accommodations and restaurants.
//!
//! ```text
//! Caller (menu, API, tests)
//!     ↓
//! Domain Layer (UserService, AccommodationService, RestaurantService)
//!     ↓
//! Storage Layer (RecordStore<T> + line codec, one file per record type)
//! ```

pub mod config;
pub mod domain;
pub mod storage;

use anyhow::Result;
use log::info;

pub use config::AppConfig;
pub use domain::*;
pub use storage::*;

/// All three services, opened against one data directory
pub struct Backend {
    pub users: UserService,
    pub accommodations: AccommodationService,
    pub restaurants: RestaurantService,
}

impl Backend {
    /// Open every store through `connection`
    pub fn open(connection: &FileConnection, config: &AppConfig) -> Self {
        Self {
            users: UserService::with_reset_storage(connection, config.password_reset_storage),
            accommodations: AccommodationService::new(connection),
            restaurants: RestaurantService::new(connection),
        }
    }

    /// Load reports of the users, accommodations and restaurants stores
    pub fn load_reports(&self) -> [(&'static str, &LoadReport); 3] {
        [
            ("users", self.users.store().load_report()),
            ("accommodations", self.accommodations.store().load_report()),
            ("restaurants", self.restaurants.store().load_report()),
        ]
    }
}

/// Resolve the data directory from `config` and open all stores
pub fn initialize_backend(config: &AppConfig) -> Result<Backend> {
    let connection = FileConnection::from_config(config)?;
    info!("Opening stores in {}", connection.base_directory().display());
    Ok(Backend::open(&connection, config))
}
