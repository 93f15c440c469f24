//! Student records
//!
//! The single entity held by the store, plus the payload types the
//! mutation layer accepts.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EnrollError, Result};

/// Format every well-formed enrollment date follows
pub const ENROLLMENT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A stored student record
///
/// `created_at` and `updated_at` come from the injected [`Clock`](crate::clock::Clock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    /// ISO-8601 calendar date, e.g. `2022-09-01`
    pub enrollment_date: String,
    pub major: String,
    pub created_at: u64,
    /// Absent until the first mutation
    pub updated_at: Option<u64>,
}

impl Student {
    /// Year component of the enrollment date
    ///
    /// Reads the leading run of digits, so `2022-09-01` and `2022` both give 2022.
    pub fn enrollment_year(&self) -> Option<i32> {
        let digits: String = self
            .enrollment_date
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }

    /// Value of one of the mutable string attributes
    pub fn field(&self, field: StudentField) -> &str {
        match field {
            StudentField::Name => &self.name,
            StudentField::Email => &self.email,
            StudentField::EnrollmentDate => &self.enrollment_date,
            StudentField::Major => &self.major,
        }
    }
}

/// The four required string attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudentField {
    Name,
    Email,
    EnrollmentDate,
    Major,
}

impl StudentField {
    pub const ALL: [StudentField; 4] = [
        StudentField::Name,
        StudentField::Email,
        StudentField::EnrollmentDate,
        StudentField::Major,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StudentField::Name => "name",
            StudentField::Email => "email",
            StudentField::EnrollmentDate => "enrollmentDate",
            StudentField::Major => "major",
        }
    }
}

impl fmt::Display for StudentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload for creating a student; every field is required
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub enrollment_date: String,
    pub major: String,
}

impl NewStudent {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        enrollment_date: impl Into<String>,
        major: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            enrollment_date: enrollment_date.into(),
            major: major.into(),
        }
    }

    /// First required field that is empty, if any
    pub fn missing_field(&self) -> Option<StudentField> {
        StudentField::ALL.into_iter().find(|&f| {
            let value = match f {
                StudentField::Name => &self.name,
                StudentField::Email => &self.email,
                StudentField::EnrollmentDate => &self.enrollment_date,
                StudentField::Major => &self.major,
            };
            value.is_empty()
        })
    }
}

/// Field-level patch for an existing student
///
/// `None` leaves the stored attribute untouched. Supplied values replace the
/// stored ones wholesale; there is no deeper merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
}

impl StudentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch touching exactly one attribute
    pub fn single(field: StudentField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            StudentField::Name => Self { name: value, ..Self::default() },
            StudentField::Email => Self { email: value, ..Self::default() },
            StudentField::EnrollmentDate => Self { enrollment_date: value, ..Self::default() },
            StudentField::Major => Self { major: value, ..Self::default() },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn enrollment_date(mut self, date: impl Into<String>) -> Self {
        self.enrollment_date = Some(date.into());
        self
    }

    pub fn major(mut self, major: impl Into<String>) -> Self {
        self.major = Some(major.into());
        self
    }

    /// True when no attribute is supplied
    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }

    /// Supplied attributes with their new values
    pub fn fields(&self) -> impl Iterator<Item = (StudentField, &str)> + '_ {
        [
            (StudentField::Name, &self.name),
            (StudentField::Email, &self.email),
            (StudentField::EnrollmentDate, &self.enrollment_date),
            (StudentField::Major, &self.major),
        ]
        .into_iter()
        .filter_map(|(f, v)| v.as_deref().map(|v| (f, v)))
    }

    /// Write supplied attributes over `student`; timestamps are left alone
    pub fn apply_to(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            student.email.clone_from(email);
        }
        if let Some(date) = &self.enrollment_date {
            student.enrollment_date.clone_from(date);
        }
        if let Some(major) = &self.major {
            student.major.clone_from(major);
        }
    }
}

/// Reject anything that is not a real `YYYY-MM-DD` date
pub fn check_enrollment_date(date: &str) -> Result<()> {
    NaiveDate::parse_from_str(date, ENROLLMENT_DATE_FORMAT)
        .map(|_| ())
        .map_err(|e| {
            EnrollError::Validation(format!(
                "enrollmentDate '{}' is not a YYYY-MM-DD date: {}",
                date, e
            ))
        })
}
