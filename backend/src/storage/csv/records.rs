//! Line layouts for the three stored record types.
//!
//! ```text
//! users.txt           username,password,email,role
//! accommodations.txt  id,admin_username,name,location,price_per_night,available,booked_by
//! restaurants.txt     name,cuisine,location,average_price
//! ```

use csv::StringRecord;
use shared::{Accommodation, Restaurant, User};

use super::codec::{
    expect_field_count, finite_field, parsed_field, required_field, text_field, CodecError,
    LineRecord,
};

impl LineRecord for User {
    const KIND: &'static str = "user";
    const FIELDS: &'static [&'static str] = &["username", "password", "email", "role"];

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.username.clone(),
            self.password.clone(),
            self.email.clone(),
            self.role.clone(),
        ]
    }

    fn from_fields(fields: &StringRecord) -> Result<Self, CodecError> {
        expect_field_count::<Self>(fields)?;
        Ok(User {
            username: required_field::<Self>(fields, 0)?,
            password: text_field(fields, 1).to_string(),
            email: text_field(fields, 2).to_string(),
            role: text_field(fields, 3).to_string(),
        })
    }
}

impl LineRecord for Accommodation {
    const KIND: &'static str = "accommodation";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "admin_username",
        "name",
        "location",
        "price_per_night",
        "available",
        "booked_by",
    ];

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.admin_username.clone(),
            self.name.clone(),
            self.location.clone(),
            self.price_per_night.to_string(),
            self.available.to_string(),
            self.booked_by.clone().unwrap_or_default(),
        ]
    }

    fn from_fields(fields: &StringRecord) -> Result<Self, CodecError> {
        expect_field_count::<Self>(fields)?;

        let available: bool = parsed_field::<Self, bool>(fields, 5)?;
        let booked_by = match text_field(fields, 6) {
            "" => None,
            username => Some(username.to_string()),
        };

        // available <=> no booker
        match (available, &booked_by) {
            (true, Some(username)) => {
                return Err(CodecError::Inconsistent(format!(
                    "available accommodation lists booker '{}'",
                    username
                )))
            }
            (false, None) => {
                return Err(CodecError::Inconsistent(
                    "booked accommodation has no booker".to_string(),
                ))
            }
            _ => {}
        }

        Ok(Accommodation {
            id: parsed_field::<Self, u32>(fields, 0)?,
            admin_username: required_field::<Self>(fields, 1)?,
            name: text_field(fields, 2).to_string(),
            location: text_field(fields, 3).to_string(),
            price_per_night: finite_field::<Self>(fields, 4)?,
            available,
            booked_by,
        })
    }
}

impl LineRecord for Restaurant {
    const KIND: &'static str = "restaurant";
    const FIELDS: &'static [&'static str] = &["name", "cuisine", "location", "average_price"];

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.cuisine.clone(),
            self.location.clone(),
            self.average_price.to_string(),
        ]
    }

    fn from_fields(fields: &StringRecord) -> Result<Self, CodecError> {
        expect_field_count::<Self>(fields)?;
        Ok(Restaurant {
            name: required_field::<Self>(fields, 0)?,
            cuisine: text_field(fields, 1).to_string(),
            location: text_field(fields, 2).to_string(),
            average_price: finite_field::<Self>(fields, 3)?,
        })
    }
}
