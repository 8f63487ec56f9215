use card_core::Record;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const VALIDATION_FAILED: &str = "Contact validation failed";

/// A row of `<schema>.contact` as mirrored by Heroku Connect.
///
/// Every column but `id` may be NULL in the mirror; rows without an
/// `sfid` are never loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Contact {
    pub id: i32,
    pub sfid: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Contact {
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.firstname.as_deref(), self.lastname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            self.sfid.clone()
        } else {
            parts.join(" ")
        }
    }

    pub fn apply(&mut self, changes: ContactChanges) {
        self.firstname = Some(changes.firstname);
        self.lastname = Some(changes.lastname);
        self.title = changes.title;
        self.email = Some(changes.email);
        self.phone = Some(changes.phone);
    }
}

/// The fields the app may write. `id` and `sfid` belong to the sync
/// service and have no field here; unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ContactChanges {
    #[serde(default)]
    #[validate(custom(function = "card_schema::required"))]
    pub firstname: String,

    #[serde(default)]
    #[validate(custom(function = "card_schema::required"))]
    pub lastname: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "card_schema::required_email"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "card_schema::required"))]
    pub phone: String,
}

impl ContactChanges {
    /// Prefill for the edit form.
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            firstname: contact.firstname.clone().unwrap_or_default(),
            lastname: contact.lastname.clone().unwrap_or_default(),
            title: contact.title.clone(),
            email: contact.email.clone().unwrap_or_default(),
            phone: contact.phone.clone().unwrap_or_default(),
        }
    }

    /// Trim every field; a blank title becomes NULL.
    pub fn normalized(self) -> Self {
        let trim = |s: String| s.trim().to_string();
        Self {
            firstname: trim(self.firstname),
            lastname: trim(self.lastname),
            title: self.title.map(trim).filter(|t| !t.is_empty()),
            email: trim(self.email),
            phone: trim(self.phone),
        }
    }
}

impl Record for Contact {
    type Changes = ContactChanges;
}
