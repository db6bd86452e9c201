//! # Record Store
//!
//! `RecordStore<T>` owns every record of one type in memory and mirrors the
//! list to a single delimited text file.
//!
//! ## Behaviour
//!
//! - Opening creates the backing file when it is missing, then decodes each
//!   non-empty line. Lines that fail to decode are skipped and listed in the
//!   [`LoadReport`]; they never stop the store from opening.
//! - Every successful mutation rewrites the whole file in list order. The new
//!   content goes to `<file>.tmp` first and is renamed over the original, so a
//!   crash mid-write leaves the previous version intact.
//! - I/O failures are logged and never returned. After a failed save the
//!   in-memory list stays authoritative and [`RecordStore::is_synced`] reports
//!   `false` until a later save succeeds.

use log::{debug, error, info, warn};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::codec::{decode_line, encode_line, CodecError, LineRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not encode record: {0}")]
    Codec(#[from] CodecError),
}

/// Result of adding a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The record was appended and the file rewritten
    Added,
    /// A record with the same key already exists; nothing changed
    DuplicateSkipped,
    /// The record would not load back from its line; nothing changed
    Malformed(String),
}

/// Result of updating a record in place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The mutation was applied and the file rewritten
    Updated,
    /// No record matched; nothing changed
    NotFound,
    /// The mutated record would not load back from its line; nothing changed
    Rejected(String),
}

/// A line skipped while loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number in the backing file
    pub line_number: usize,
    pub reason: String,
}

/// What happened when the backing file was last read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub malformed: Vec<MalformedLine>,
}

pub struct RecordStore<T: LineRecord> {
    path: PathBuf,
    delimiter: u8,
    records: Vec<T>,
    load_report: LoadReport,
    last_save_error: Option<StoreError>,
}

impl<T: LineRecord> RecordStore<T> {
    /// Open the store at `path`, creating an empty file if necessary
    pub fn open<P: AsRef<Path>>(path: P, delimiter: u8) -> Self {
        let mut store = Self {
            path: path.as_ref().to_path_buf(),
            delimiter,
            records: Vec::new(),
            load_report: LoadReport::default(),
            last_save_error: None,
        };
        store.ensure_file_exists();
        store.reload();
        store
    }

    fn ensure_file_exists(&self) {
        if self.path.exists() {
            return;
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    error!("Error creating directory for {} file {}: {}", T::KIND, self.path.display(), e);
                    return;
                }
            }
        }

        match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(_) => info!("Created empty {} file at {}", T::KIND, self.path.display()),
            Err(e) => error!("Error creating {} file {}: {}", T::KIND, self.path.display(), e),
        }
    }

    /// Discard the in-memory list and read the backing file again
    pub fn reload(&mut self) {
        let (records, report) = self.read_records();
        if report.malformed.is_empty() {
            info!("Loaded {} {} records from {}", report.loaded, T::KIND, self.path.display());
        } else {
            warn!(
                "Loaded {} {} records from {}, skipped {} malformed lines",
                report.loaded,
                T::KIND,
                self.path.display(),
                report.malformed.len()
            );
        }
        self.records = records;
        self.load_report = report;
    }

    fn read_records(&self) -> (Vec<T>, LoadReport) {
        let mut records = Vec::new();
        let mut report = LoadReport::default();

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                error!("Could not load {} records from {}: {}", T::KIND, self.path.display(), e);
                return (records, report);
            }
        };

        for (index, chunk) in BufReader::new(file).split(b'\n').enumerate() {
            let line_number = index + 1;
            let mut bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!(
                        "Could not read {} records past line {} of {}: {}",
                        T::KIND,
                        index,
                        self.path.display(),
                        e
                    );
                    break;
                }
            };
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }

            let line = match String::from_utf8(bytes) {
                Ok(line) => line,
                Err(e) => {
                    Self::skip_line(&mut report, &self.path, line_number, e.to_string());
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match decode_line::<T>(&line, self.delimiter) {
                Ok(record) => records.push(record),
                Err(e) => Self::skip_line(&mut report, &self.path, line_number, e.to_string()),
            }
        }

        report.loaded = records.len();
        (records, report)
    }

    fn skip_line(report: &mut LoadReport, path: &Path, line_number: usize, reason: String) {
        warn!(
            "Skipping malformed {} on line {} of {}: {}",
            T::KIND,
            line_number,
            path.display(),
            reason
        );
        report.malformed.push(MalformedLine { line_number, reason });
    }

    /// Rewrite the backing file from the in-memory list
    fn save(&mut self) -> bool {
        match write_records(&self.path, &self.records, self.delimiter) {
            Ok(()) => {
                debug!("Saved {} {} records to {}", self.records.len(), T::KIND, self.path.display());
                self.last_save_error = None;
                true
            }
            Err(e) => {
                error!("Error saving {} records to {}: {}", T::KIND, self.path.display(), e);
                self.last_save_error = Some(e);
                false
            }
        }
    }

    /// Encode `record` and decode the line again, so only records that
    /// survive a reload are ever accepted
    fn check_round_trip(&self, record: &T) -> Result<(), CodecError> {
        let line = encode_line(record, self.delimiter)?;
        decode_line::<T>(&line, self.delimiter)?;
        Ok(())
    }

    /// Append a record and persist
    pub fn add(&mut self, record: T) -> AddOutcome {
        if let Err(e) = self.check_round_trip(&record) {
            warn!("Refusing to add {} that cannot be stored: {}", T::KIND, e);
            return AddOutcome::Malformed(e.to_string());
        }
        self.records.push(record);
        self.save();
        AddOutcome::Added
    }

    /// Append a record unless an existing one satisfies `is_duplicate`
    pub fn add_if_absent<F>(&mut self, record: T, is_duplicate: F) -> AddOutcome
    where
        F: Fn(&T) -> bool,
    {
        if self.records.iter().any(is_duplicate) {
            debug!("Skipping duplicate {}", T::KIND);
            return AddOutcome::DuplicateSkipped;
        }
        self.add(record)
    }

    /// First record matching `predicate`
    pub fn find<F>(&self, predicate: F) -> Option<&T>
    where
        F: Fn(&T) -> bool,
    {
        self.records.iter().find(|record| predicate(*record))
    }

    /// All records matching `predicate`, in stored order
    pub fn filter<F>(&self, predicate: F) -> Vec<&T>
    where
        F: Fn(&T) -> bool,
    {
        self.records.iter().filter(|record| predicate(*record)).collect()
    }

    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        self.records.iter().any(predicate)
    }

    /// Remove every record matching `predicate`.
    ///
    /// Returns false, without touching the file, when nothing matched.
    pub fn delete_where<F>(&mut self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let initial_len = self.records.len();
        self.records.retain(|record| !predicate(record));
        let removed = initial_len - self.records.len();
        if removed == 0 {
            return false;
        }

        info!("Deleted {} {} records", removed, T::KIND);
        self.save();
        true
    }

    /// Apply `mutation` to the first record matching `predicate` and persist.
    ///
    /// The mutation runs on a copy; the stored record is only replaced when
    /// the copy still round-trips through the line codec.
    pub fn update_first<P, M>(&mut self, predicate: P, mutation: M) -> UpdateOutcome
    where
        P: Fn(&T) -> bool,
        M: FnOnce(&mut T),
    {
        let index = match self.records.iter().position(|record| predicate(record)) {
            Some(index) => index,
            None => return UpdateOutcome::NotFound,
        };

        let mut updated = self.records[index].clone();
        mutation(&mut updated);
        if let Err(e) = self.check_round_trip(&updated) {
            warn!("Refusing to update {} that cannot be stored: {}", T::KIND, e);
            return UpdateOutcome::Rejected(e.to_string());
        }

        self.records[index] = updated;
        self.save();
        UpdateOutcome::Updated
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    /// False when the last save failed and the file lags behind memory
    pub fn is_synced(&self) -> bool {
        self.last_save_error.is_none()
    }

    pub fn last_save_error(&self) -> Option<&StoreError> {
        self.last_save_error.as_ref()
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut temp: OsString = path.as_os_str().to_owned();
    temp.push(".tmp");
    PathBuf::from(temp)
}

fn write_temp_file(temp_path: &Path, content: &str) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Write all records to a temp file, then atomically move it over `path`
fn write_records<T: LineRecord>(path: &Path, records: &[T], delimiter: u8) -> Result<(), StoreError> {
    let mut content = String::new();
    for record in records {
        content.push_str(&encode_line(record, delimiter)?);
        content.push('\n');
    }

    let temp_path = temp_path_for(path);
    let result = write_temp_file(&temp_path, &content).and_then(|()| fs::rename(&temp_path, path));
    if let Err(source) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::codec::DEFAULT_DELIMITER;
    use crate::storage::csv::test_utils::{read_file, TestEnvironment};
    use anyhow::Result;
    use shared::{Accommodation, Restaurant, User};

    fn restaurant_store(env: &TestEnvironment) -> RecordStore<Restaurant> {
        RecordStore::open(env.connection.restaurants_path(), DEFAULT_DELIMITER)
    }

    #[test]
    fn test_open_creates_missing_file() -> Result<()> {
        let env = TestEnvironment::new()?;
        let path = env.connection.restaurants_path();
        assert!(!path.exists());

        let store = restaurant_store(&env);

        assert!(path.exists());
        assert!(store.is_empty());
        assert_eq!(store.load_report(), &LoadReport::default());
        assert_eq!(read_file(&path)?, "");
        Ok(())
    }

    #[test]
    fn test_malformed_lines_are_skipped_on_load() -> Result<()> {
        let env = TestEnvironment::new()?;
        env.write_lines(
            &env.connection.restaurants_path(),
            &[
                "Trattoria,Italian,Rome,25",
                "only,three,fields",
                "",
                "Spice Hub,Indian,Leeds,17.5",
                "Broken,Thai,Bangkok,cheap",
                "Pizzeria,Italian,Naples,12",
            ],
        )?;

        let store = restaurant_store(&env);

        assert_eq!(store.len(), 3);
        assert_eq!(store.load_report().loaded, 3);
        let skipped: Vec<usize> = store
            .load_report()
            .malformed
            .iter()
            .map(|line| line.line_number)
            .collect();
        assert_eq!(skipped, vec![2, 5]);
        assert_eq!(store.records()[1].name, "Spice Hub");
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() -> Result<()> {
        let env = TestEnvironment::new()?;
        let path = env.connection.restaurants_path();
        let mut bytes = b"Trattoria,Italian,Rome,25\n".to_vec();
        bytes.extend_from_slice(b"Caf\xff,French,Paris,30\r\n");
        bytes.extend_from_slice(b"Pizzeria,Italian,Naples,12\r\n");
        fs::write(&path, bytes)?;

        let store = restaurant_store(&env);

        assert_eq!(store.len(), 2);
        assert_eq!(store.load_report().malformed.len(), 1);
        assert_eq!(store.load_report().malformed[0].line_number, 2);
        assert_eq!(store.records()[1].location, "Naples");
        Ok(())
    }

    #[test]
    fn test_add_rewrites_whole_file_in_order() -> Result<()> {
        let env = TestEnvironment::new()?;
        let path = env.connection.restaurants_path();
        env.write_lines(&path, &["Trattoria,Italian,Rome,25", "garbage"])?;

        let mut store = restaurant_store(&env);
        let outcome = store.add(Restaurant::new("Spice Hub", "Indian", "Leeds", 17.5));

        assert_eq!(outcome, AddOutcome::Added);
        assert!(store.is_synced());
        assert_eq!(
            read_file(&path)?,
            "Trattoria,Italian,Rome,25\nSpice Hub,Indian,Leeds,17.5\n"
        );
        assert!(!temp_path_for(&path).exists());

        let reopened = restaurant_store(&env);
        assert_eq!(reopened.records(), store.records());
        Ok(())
    }

    #[test]
    fn test_add_if_absent_skips_duplicates() -> Result<()> {
        let env = TestEnvironment::new()?;
        let path = env.connection.users_path();
        let mut store: RecordStore<User> = RecordStore::open(&path, DEFAULT_DELIMITER);

        let first = store.add_if_absent(User::new("alice", "x", "a@example.com", "guest"), |u| {
            u.has_username("alice")
        });
        let before = read_file(&path)?;
        let second = store.add_if_absent(User::new("ALICE", "y", "b@example.com", "admin"), |u| {
            u.has_username("ALICE")
        });

        assert_eq!(first, AddOutcome::Added);
        assert_eq!(second, AddOutcome::DuplicateSkipped);
        assert_eq!(store.len(), 1);
        assert_eq!(read_file(&path)?, before);
        Ok(())
    }

    #[test]
    fn test_unencodable_record_is_not_added() -> Result<()> {
        let env = TestEnvironment::new()?;
        let mut store = restaurant_store(&env);

        let outcome = store.add(Restaurant::new("Line\nBreak", "Fusion", "Oslo", 40.0));

        assert!(matches!(outcome, AddOutcome::Malformed(_)));
        assert!(store.is_empty());
        assert_eq!(read_file(&env.connection.restaurants_path())?, "");
        Ok(())
    }

    #[test]
    fn test_find_and_filter_keep_order() -> Result<()> {
        let env = TestEnvironment::new()?;
        let mut store = restaurant_store(&env);
        store.add(Restaurant::new("A", "Italian", "Rome", 10.0));
        store.add(Restaurant::new("B", "Indian", "Delhi", 11.0));
        store.add(Restaurant::new("C", "Italian", "Milan", 12.0));

        let first = store.find(|r| r.cuisine == "Italian").map(|r| r.name.as_str());
        let names: Vec<&str> = store
            .filter(|r| r.cuisine == "Italian")
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();

        assert_eq!(first, Some("A"));
        assert_eq!(names, vec!["A", "C"]);
        assert!(store.find(|r| r.cuisine == "Thai").is_none());
        assert!(store.filter(|r| r.cuisine == "Thai").is_empty());
        assert!(store.any(|r| r.location == "Delhi"));
        Ok(())
    }

    #[test]
    fn test_delete_without_match_leaves_file_untouched() -> Result<()> {
        let env = TestEnvironment::new()?;
        let path = env.connection.restaurants_path();
        // The malformed line only survives as long as nothing rewrites the file
        env.write_lines(&path, &["Trattoria,Italian,Rome,25", "not a record"])?;
        let mut store = restaurant_store(&env);

        assert!(!store.delete_where(|r| r.name == "Nowhere"));
        assert_eq!(store.len(), 1);
        assert_eq!(read_file(&path)?, "Trattoria,Italian,Rome,25\nnot a record\n");

        assert!(store.delete_where(|r| r.name == "Trattoria"));
        assert!(store.is_empty());
        assert_eq!(read_file(&path)?, "");
        Ok(())
    }

    #[test]
    fn test_delete_removes_every_match() -> Result<()> {
        let env = TestEnvironment::new()?;
        let mut store = restaurant_store(&env);
        store.add(Restaurant::new("Twin", "Thai", "Bangkok", 9.0));
        store.add(Restaurant::new("Solo", "Greek", "Athens", 14.0));
        store.add(Restaurant::new("Twin", "Thai", "Phuket", 8.0));

        assert!(store.delete_where(|r| r.name == "Twin"));

        assert_eq!(store.len(), 1);
        assert_eq!(restaurant_store(&env).records(), store.records());
        Ok(())
    }

    #[test]
    fn test_update_first_persists_mutation() -> Result<()> {
        let env = TestEnvironment::new()?;
        let mut store = restaurant_store(&env);
        store.add(Restaurant::new("Bistro", "French", "Lyon", 30.0));
        store.add(Restaurant::new("Bistro", "French", "Nice", 35.0));

        let updated = store.update_first(|r| r.name == "Bistro", |r| r.average_price = 32.5);
        let missing = store.update_first(|r| r.name == "Diner", |r| r.average_price = 1.0);

        assert_eq!(updated, UpdateOutcome::Updated);
        assert_eq!(missing, UpdateOutcome::NotFound);
        let reopened = restaurant_store(&env);
        assert_eq!(reopened.records()[0].average_price, 32.5);
        assert_eq!(reopened.records()[1].average_price, 35.0);
        Ok(())
    }

    #[test]
    fn test_failed_save_keeps_memory_authoritative() -> Result<()> {
        let env = TestEnvironment::new()?;
        // A directory where the file should be makes every rename fail
        let path = env.base_directory().join("blocked");
        fs::create_dir(&path)?;
        let mut store: RecordStore<Restaurant> = RecordStore::open(&path, DEFAULT_DELIMITER);

        let outcome = store.add(Restaurant::new("Ghost", "Unknown", "Nowhere", 1.0));

        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(store.len(), 1);
        assert!(!store.is_synced());
        assert!(matches!(store.last_save_error(), Some(StoreError::Io { .. })));
        assert!(!temp_path_for(&path).exists());
        Ok(())
    }

    #[test]
    fn test_reload_picks_up_external_changes() -> Result<()> {
        let env = TestEnvironment::new()?;
        let path = env.connection.restaurants_path();
        let mut store = restaurant_store(&env);
        assert!(store.is_empty());

        env.write_lines(&path, &["Late,Korean,Seoul,20"])?;
        store.reload();

        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].cuisine, "Korean");
        Ok(())
    }

    #[test]
    fn test_add_rejects_records_that_would_not_reload() -> Result<()> {
        let env = TestEnvironment::new()?;
        let mut restaurants = restaurant_store(&env);
        let mut users: RecordStore<User> =
            RecordStore::open(env.connection.users_path(), DEFAULT_DELIMITER);
        let mut accommodations: RecordStore<Accommodation> =
            RecordStore::open(env.connection.accommodations_path(), DEFAULT_DELIMITER);

        let rejected_restaurants = [
            Restaurant::new("", "Thai", "Bangkok", 10.0),
            Restaurant::new("   ", "Thai", "Bangkok", 10.0),
            Restaurant::new("Nan", "Thai", "Bangkok", f64::NAN),
            Restaurant::new("Inf", "Thai", "Bangkok", f64::INFINITY),
        ];
        for restaurant in rejected_restaurants {
            assert!(matches!(restaurants.add(restaurant), AddOutcome::Malformed(_)));
        }

        let outcome = users.add(User::new("", "pw", "nobody@example.com", "guest"));
        assert!(matches!(outcome, AddOutcome::Malformed(_)));

        let no_owner = Accommodation::new(1, "", "Loft", "Porto", 80.0);
        let mut booked_without_booker = Accommodation::new(2, "host", "Loft", "Porto", 80.0);
        booked_without_booker.available = false;
        let mut available_with_booker = Accommodation::new(3, "host", "Loft", "Porto", 80.0);
        available_with_booker.booked_by = Some("alice".to_string());
        for accommodation in [no_owner, booked_without_booker, available_with_booker] {
            assert!(matches!(accommodations.add(accommodation), AddOutcome::Malformed(_)));
        }

        assert!(restaurants.is_empty());
        assert!(users.is_empty());
        assert!(accommodations.is_empty());
        assert_eq!(read_file(&env.connection.restaurants_path())?, "");
        assert_eq!(read_file(&env.connection.users_path())?, "");
        assert_eq!(read_file(&env.connection.accommodations_path())?, "");
        Ok(())
    }

    #[test]
    fn test_accepted_records_are_all_reloaded() -> Result<()> {
        let env = TestEnvironment::new()?;
        let mut store = restaurant_store(&env);
        store.add(Restaurant::new("Nan", "Thai", "Bangkok", f64::NAN));
        store.add(Restaurant::new("Fish, Chips", "British", "York", 9.5));
        store.add(Restaurant::new("", "Thai", "Bangkok", 10.0));

        let reopened = restaurant_store(&env);

        assert_eq!(store.len(), 1);
        assert_eq!(reopened.records(), store.records());
        assert!(reopened.load_report().malformed.is_empty());
        Ok(())
    }

    #[test]
    fn test_rejected_update_leaves_record_and_file_untouched() -> Result<()> {
        let env = TestEnvironment::new()?;
        let path = env.connection.users_path();
        let mut store: RecordStore<User> = RecordStore::open(&path, DEFAULT_DELIMITER);
        store.add(User::new("alice", "digest", "alice@example.com", "guest"));
        let before = read_file(&path)?;

        let outcome = store.update_first(|u| u.has_username("alice"), |u| u.password = "new\npw".to_string());

        assert!(matches!(outcome, UpdateOutcome::Rejected(_)));
        assert_eq!(store.records()[0].password, "digest");
        assert_eq!(read_file(&path)?, before);
        assert!(store.is_synced());

        // Later writes still reach the file
        assert_eq!(store.add(User::new("bob", "pw", "bob@example.com", "guest")), AddOutcome::Added);
        assert!(store.is_synced());
        let reopened: RecordStore<User> = RecordStore::open(&path, DEFAULT_DELIMITER);
        assert_eq!(reopened.len(), 2);
        Ok(())
    }

    #[test]
    fn test_next_good_save_clears_sync_error() -> Result<()> {
        let env = TestEnvironment::new()?;
        let path = env.base_directory().join("blocked");
        fs::create_dir(&path)?;
        let mut store: RecordStore<Restaurant> = RecordStore::open(&path, DEFAULT_DELIMITER);
        store.add(Restaurant::new("Ghost", "Unknown", "Nowhere", 1.0));
        assert!(!store.is_synced());

        fs::remove_dir(&path)?;
        let outcome = store.add(Restaurant::new("Found", "Greek", "Athens", 14.0));

        assert_eq!(outcome, AddOutcome::Added);
        assert!(store.is_synced());
        assert!(store.last_save_error().is_none());
        assert_eq!(
            read_file(&path)?,
            "Ghost,Unknown,Nowhere,1\nFound,Greek,Athens,14\n"
        );
        let reopened: RecordStore<Restaurant> = RecordStore::open(&path, DEFAULT_DELIMITER);
        assert_eq!(reopened.records(), store.records());
        Ok(())
    }
}
