//! Mutation Layer
//!
//! Single-record read-modify-write operations over a [`RecordStore`].
//!
//! Every operation validates its input before touching the store, so a
//! rejected call never changes stored state. Callers that share a store
//! across threads must serialize mutations; [`StudentService`] does this.
//!
//! [`StudentService`]: crate::service::StudentService

use crate::clock::Clock;
use crate::error::{EnrollError, Result};
use crate::ident::IdGenerator;
use crate::store::RecordStore;
use crate::student::{check_enrollment_date, NewStudent, Student, StudentField, StudentPatch};

/// Borrowed view of everything a mutation needs
pub struct Mutator<'a> {
    store: &'a RecordStore,
    clock: &'a dyn Clock,
    ids: &'a dyn IdGenerator,
}

impl<'a> Mutator<'a> {
    pub fn new(store: &'a RecordStore, clock: &'a dyn Clock, ids: &'a dyn IdGenerator) -> Self {
        Self { store, clock, ids }
    }

    /// Create a student with a fresh id and `created_at = now`
    pub fn create(&self, payload: NewStudent) -> Result<Student> {
        if let Some(field) = payload.missing_field() {
            return Err(EnrollError::Validation(format!(
                "Couldn't create a student: field '{}' is required",
                field
            )));
        }
        if self.store.validates_enrollment_dates() {
            check_enrollment_date(&payload.enrollment_date)?;
        }

        let student = Student {
            id: self.ids.next_id(),
            name: payload.name,
            email: payload.email,
            enrollment_date: payload.enrollment_date,
            major: payload.major,
            created_at: self.clock.now(),
            updated_at: None,
        };

        if self.store.insert(&student.id, &student)?.is_some() {
            // The generator handed out an id that was already in use
            tracing::warn!("Student id={} was overwritten on create", student.id);
        }

        tracing::debug!("Created student id={}", student.id);
        Ok(student)
    }

    /// Merge `patch` over the stored record
    pub fn update(&self, id: &str, patch: &StudentPatch) -> Result<Student> {
        if id.is_empty() {
            return Err(EnrollError::Validation(
                "Couldn't update a student: id is required".to_string(),
            ));
        }
        if patch.is_empty() {
            return Err(EnrollError::Validation(format!(
                "Couldn't update a student with id={}: at least one field must be provided",
                id
            )));
        }
        for (field, value) in patch.fields() {
            self.check_value(id, field, value)?;
        }

        self.apply(id, patch, || {
            format!("Couldn't update a student with id={}: student not found", id)
        })
    }

    pub fn update_major(&self, id: &str, major: &str) -> Result<Student> {
        self.update_field(id, StudentField::Major, major)
    }

    pub fn update_email(&self, id: &str, email: &str) -> Result<Student> {
        self.update_field(id, StudentField::Email, email)
    }

    pub fn update_name(&self, id: &str, name: &str) -> Result<Student> {
        self.update_field(id, StudentField::Name, name)
    }

    /// Remove a student, returning the deleted record
    pub fn delete(&self, id: &str) -> Result<Student> {
        if id.is_empty() {
            return Err(EnrollError::Validation(
                "Couldn't delete a student: id is required".to_string(),
            ));
        }

        let removed = self.store.remove(id)?.ok_or_else(|| {
            EnrollError::NotFound(format!(
                "Couldn't delete a student with id={}: student not found",
                id
            ))
        })?;

        tracing::debug!("Deleted student id={}", id);
        Ok(removed)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn update_field(&self, id: &str, field: StudentField, value: &str) -> Result<Student> {
        if id.is_empty() {
            return Err(EnrollError::Validation(format!(
                "Couldn't update the {} for a student: id is required",
                field
            )));
        }
        self.check_value(id, field, value)?;

        self.apply(id, &StudentPatch::single(field, value), || {
            format!(
                "Couldn't update the {} for student with id={}: student not found",
                field, id
            )
        })
    }

    fn check_value(&self, id: &str, field: StudentField, value: &str) -> Result<()> {
        if value.is_empty() {
            return Err(EnrollError::Validation(format!(
                "Couldn't update student with id={}: {} must not be empty",
                id, field
            )));
        }
        if field == StudentField::EnrollmentDate && self.store.validates_enrollment_dates() {
            check_enrollment_date(value)?;
        }
        Ok(())
    }

    fn apply(
        &self,
        id: &str,
        patch: &StudentPatch,
        not_found: impl FnOnce() -> String,
    ) -> Result<Student> {
        let mut student = self
            .store
            .get(id)?
            .ok_or_else(|| EnrollError::NotFound(not_found()))?;

        patch.apply_to(&mut student);
        student.updated_at = Some(self.clock.now().max(student.created_at));

        self.store.insert(id, &student)?;

        tracing::debug!(
            "Updated student id={} fields=[{}]",
            id,
            patch.fields().map(|(f, _)| f.as_str()).collect::<Vec<_>>().join(",")
        );
        Ok(student)
    }
}
