use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Department;

/// Smallest ten-digit contact number.
pub const CONTACT_MIN: u64 = 1_000_000_000;
/// Largest ten-digit contact number.
pub const CONTACT_MAX: u64 = 9_999_999_999;

const EMAIL_MIN_LEN: usize = 6;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9]+[._-])*[A-Za-z0-9]+@[A-Za-z0-9-]+(\.[A-Za-z]{2,3})+$")
        .expect("email pattern is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("email must be a valid address of at least {EMAIL_MIN_LEN} characters")]
    InvalidEmail,
    #[error("contact must be a 10-digit number")]
    ContactOutOfRange,
}

/// A stored employee record. The `id` is assigned by the record store,
/// never supplied by clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub contact: u64,
    pub department: Department,
}

/// Client-supplied employee fields, used for both create and update
/// payloads. All fields are required, so applying a draft to an existing
/// record replaces everything except the id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDraft {
    pub name: String,
    pub email: String,
    pub contact: u64,
    pub department: Department,
}

impl EmployeeDraft {
    /// Field-level checks that run before a draft reaches the store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.len() < EMAIL_MIN_LEN || !EMAIL_PATTERN.is_match(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if !(CONTACT_MIN..=CONTACT_MAX).contains(&self.contact) {
            return Err(ValidationError::ContactOutOfRange);
        }
        Ok(())
    }
}

impl Employee {
    pub fn from_draft(id: String, draft: EmployeeDraft) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            contact: draft.contact,
            department: draft.department,
        }
    }

    /// Overwrite every field except the id with the draft's values.
    pub fn apply(&mut self, draft: EmployeeDraft) {
        self.name = draft.name;
        self.email = draft.email;
        self.contact = draft.contact;
        self.department = draft.department;
    }
}
