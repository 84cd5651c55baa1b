//! User account types and their record-store representation.

use crate::error::{InputError, StoreError};
use crate::mobile::{CountryCode, Mobile};
use airtable_client::{Fields, Record};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names of the users table.
pub const FIELD_FIRST_NAME: &str = "First Name";
pub const FIELD_LAST_NAME: &str = "Last Name";
pub const FIELD_MOBILE: &str = "Mobile";

/// Store-assigned identifier, stable for the lifetime of the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub mobile: Mobile,
}

impl User {
    /// Map a raw table row to a user.
    ///
    /// Rows missing a required column, or holding an unparseable mobile, are
    /// reported as validation failures.
    pub fn from_record(record: &Record) -> Result<Self, StoreError> {
        let text = |field: &str| {
            record
                .text(field)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    StoreError::validation(format!(
                        "record {} is missing field '{}'",
                        record.id, field
                    ))
                })
        };

        let first_name = text(FIELD_FIRST_NAME)?.to_string();
        let last_name = text(FIELD_LAST_NAME)?.to_string();
        let mobile = Mobile::parse(text(FIELD_MOBILE)?).map_err(|e| {
            StoreError::validation(format!("record {} has {}", record.id, e))
        })?;

        Ok(Self {
            id: UserId::new(record.id.clone()),
            first_name,
            last_name,
            mobile,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Validated input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    first_name: String,
    last_name: String,
    mobile: Mobile,
}

impl NewUser {
    /// Validate raw form input. Names are trimmed; the mobile must be in
    /// international form.
    pub fn parse(first_name: &str, last_name: &str, mobile: &str) -> Result<Self, InputError> {
        Self::parse_with_default_country(first_name, last_name, mobile, None)
    }

    /// Like [`NewUser::parse`], reading a mobile without `+` as a national
    /// number in `default_country`.
    pub fn parse_with_default_country(
        first_name: &str,
        last_name: &str,
        mobile: &str,
        default_country: Option<&CountryCode>,
    ) -> Result<Self, InputError> {
        let first_name = first_name.trim();
        if first_name.is_empty() {
            return Err(InputError::EmptyFirstName);
        }

        let last_name = last_name.trim();
        if last_name.is_empty() {
            return Err(InputError::EmptyLastName);
        }

        Ok(Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            mobile: Mobile::parse_with_default_country(mobile, default_country)?,
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn mobile(&self) -> &Mobile {
        &self.mobile
    }

    /// Row payload for the users table.
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(FIELD_FIRST_NAME.into(), self.first_name.clone().into());
        fields.insert(FIELD_LAST_NAME.into(), self.last_name.clone().into());
        fields.insert(FIELD_MOBILE.into(), self.mobile.as_str().into());
        fields
    }

    /// Attach a store-assigned id.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            mobile: self.mobile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: serde_json::Value) -> Record {
        serde_json::from_value(json!({ "id": "rec1", "fields": fields })).unwrap()
    }

    #[test]
    fn test_new_user_validation() {
        assert_eq!(
            NewUser::parse("  ", "Lovelace", "+15551234567"),
            Err(InputError::EmptyFirstName)
        );
        assert_eq!(
            NewUser::parse("Ada", "", "+15551234567"),
            Err(InputError::EmptyLastName)
        );
        assert!(matches!(
            NewUser::parse("Ada", "Lovelace", "12"),
            Err(InputError::InvalidMobile(_))
        ));

        let user = NewUser::parse(" Ada ", "Lovelace", "+1 555 123 4567").unwrap();
        assert_eq!(user.first_name(), "Ada");
        assert_eq!(user.mobile().as_str(), "+15551234567");
    }

    #[test]
    fn test_new_user_national_mobile() {
        let us = CountryCode::parse("1").unwrap();
        let user =
            NewUser::parse_with_default_country("Ada", "Lovelace", "555 123 4567", Some(&us))
                .unwrap();
        assert_eq!(user.mobile().as_str(), "+15551234567");

        assert!(matches!(
            NewUser::parse("Ada", "Lovelace", "555 123 4567"),
            Err(InputError::InvalidMobile(_))
        ));
    }

    #[test]
    fn test_to_fields_uses_column_names() {
        let user = NewUser::parse("Ada", "Lovelace", "+15551234567").unwrap();
        let fields = user.to_fields();

        assert_eq!(fields["First Name"], "Ada");
        assert_eq!(fields["Last Name"], "Lovelace");
        assert_eq!(fields["Mobile"], "+15551234567");
    }

    #[test]
    fn test_from_record() {
        let user = User::from_record(&record(json!({
            "First Name": "Ada",
            "Last Name": "Lovelace",
            "Mobile": "+15551234567"
        })))
        .unwrap();

        assert_eq!(user.id.as_str(), "rec1");
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert_eq!(user.mobile.as_str(), "+15551234567");
    }

    #[test]
    fn test_from_record_missing_field() {
        let result = User::from_record(&record(json!({
            "First Name": "Ada",
            "Mobile": "+15551234567"
        })));
        assert!(matches!(result, Err(StoreError::Validation(msg)) if msg.contains("Last Name")));
    }

    #[test]
    fn test_user_serialization() {
        let user = NewUser::parse("Ada", "Lovelace", "+15551234567")
            .unwrap()
            .into_user(UserId::new("rec1"));

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], "rec1");
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["mobile"], "+15551234567");
    }
}
