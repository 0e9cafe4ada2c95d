use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed set of departments an employee can belong to.
///
/// Wire spelling is the human-readable form (`"Human Resource"`), used
/// identically in record bodies and in the `find_employees` query filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    Testing,
    Development,
    Finance,
    #[serde(rename = "Human Resource")]
    HumanResource,
    Support,
}

impl Department {
    pub const ALL: [Department; 5] = [
        Department::Testing,
        Department::Development,
        Department::Finance,
        Department::HumanResource,
        Department::Support,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Testing => "Testing",
            Department::Development => "Development",
            Department::Finance => "Finance",
            Department::HumanResource => "Human Resource",
            Department::Support => "Support",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
