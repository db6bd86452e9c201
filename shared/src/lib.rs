use std::fmt;

/// Role tag given to administrators who own accommodations
pub const ADMIN_ROLE: &str = "admin";
/// Role tag given to regular guests
pub const GUEST_ROLE: &str = "guest";

/// A registered account.
///
/// `password` normally holds a hex digest produced by the credential policy,
/// but a password reset may leave a plaintext value behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique login name, compared case-insensitively
    pub username: String,
    /// Stored password (digest or plaintext after a reset)
    pub password: String,
    pub email: String,
    /// Free-form role tag such as "admin" or "guest"
    pub role: String,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: email.into(),
            role: role.into(),
        }
    }

    /// Case-insensitive username comparison
    pub fn has_username(&self, username: &str) -> bool {
        self.username.eq_ignore_ascii_case(username)
    }

    /// True when both the username and the stored password match.
    /// The caller is responsible for hashing `password` first.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.has_username(username) && self.password == password
    }

    /// Identity check used by the password reset flow
    pub fn matches(&self, username: &str, email: &str) -> bool {
        self.has_username(username) && self.email.eq_ignore_ascii_case(email)
    }

    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case(ADMIN_ROLE)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> ({})", self.username, self.email, self.role)
    }
}

/// A bookable property owned by an admin.
///
/// `available` and `booked_by` move together: an available property has no
/// booker, a booked one has exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct Accommodation {
    pub id: u32,
    /// Username of the admin who listed the property
    pub admin_username: String,
    pub name: String,
    pub location: String,
    pub price_per_night: f64,
    pub available: bool,
    pub booked_by: Option<String>,
}

impl Accommodation {
    /// Create a new, available accommodation
    pub fn new(
        id: u32,
        admin_username: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
        price_per_night: f64,
    ) -> Self {
        Self {
            id,
            admin_username: admin_username.into(),
            name: name.into(),
            location: location.into(),
            price_per_night,
            available: true,
            booked_by: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn booked_by(&self) -> Option<&str> {
        self.booked_by.as_deref()
    }

    /// Mark the property as booked by `username`
    pub fn book(&mut self, username: impl Into<String>) {
        self.available = false;
        self.booked_by = Some(username.into());
    }

    pub fn is_owned_by(&self, admin_username: &str) -> bool {
        self.admin_username.eq_ignore_ascii_case(admin_username)
    }
}

impl fmt::Display for Accommodation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} in {} - ${:.2}/night (listed by {})",
            self.id, self.name, self.location, self.price_per_night, self.admin_username
        )?;
        match &self.booked_by {
            Some(username) => write!(f, " [booked by {}]", username),
            None => write!(f, " [available]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    /// Display name, used as the delete key
    pub name: String,
    /// Cuisine tag such as "Italian", compared case-insensitively
    pub cuisine: String,
    pub location: String,
    pub average_price: f64,
}

impl Restaurant {
    pub fn new(
        name: impl Into<String>,
        cuisine: impl Into<String>,
        location: impl Into<String>,
        average_price: f64,
    ) -> Self {
        Self {
            name: name.into(),
            cuisine: cuisine.into(),
            location: location.into(),
            average_price,
        }
    }
}

impl fmt::Display for Restaurant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) in {} - avg ${:.2}",
            self.name, self.cuisine, self.location, self.average_price
        )
    }
}
