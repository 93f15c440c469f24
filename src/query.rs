//! Query Layer
//!
//! Read-only operations over [`RecordStore::values`]. Collection queries
//! return an empty `Vec` when nothing matches; only the single-result
//! lookups fail with [`EnrollError::NotFound`].

use std::cmp::Ordering;

use crate::error::{EnrollError, Result};
use crate::store::RecordStore;
use crate::student::Student;

/// All records in store order
pub fn list(store: &RecordStore) -> Result<Vec<Student>> {
    store.values()
}

/// Point lookup by id
pub fn get(store: &RecordStore, id: &str) -> Result<Student> {
    store
        .get(id)?
        .ok_or_else(|| EnrollError::NotFound(format!("Student with id={} not found", id)))
}

/// First record whose email matches exactly (case-sensitive)
pub fn get_by_email(store: &RecordStore, email: &str) -> Result<Student> {
    store
        .values()?
        .into_iter()
        .find(|s| s.email == email)
        .ok_or_else(|| EnrollError::NotFound(format!("Student with email {} not found", email)))
}

pub fn filter_by_major(store: &RecordStore, major: &str) -> Result<Vec<Student>> {
    Ok(matching(store.values()?, |s| s.major == major))
}

/// Records with `start <= enrollment_date <= end`, compared as strings
pub fn filter_by_date_range(store: &RecordStore, start: &str, end: &str) -> Result<Vec<Student>> {
    Ok(matching(store.values()?, |s| in_date_range(s, start, end)))
}

pub fn filter_by_year(store: &RecordStore, year: i32) -> Result<Vec<Student>> {
    Ok(matching(store.values()?, |s| s.enrollment_year() == Some(year)))
}

pub fn filter_by_major_and_year(store: &RecordStore, major: &str, year: i32) -> Result<Vec<Student>> {
    Ok(matching(store.values()?, |s| {
        s.major == major && s.enrollment_year() == Some(year)
    }))
}

/// Case-insensitive substring match on name
pub fn search_by_name(store: &RecordStore, fragment: &str) -> Result<Vec<Student>> {
    let needle = fragment.to_lowercase();
    Ok(matching(store.values()?, |s| s.name.to_lowercase().contains(&needle)))
}

pub fn count_by_major(store: &RecordStore, major: &str) -> Result<usize> {
    Ok(store.values()?.iter().filter(|s| s.major == major).count())
}

/// One page of store-ordered records; `page` is 1-based
pub fn paginate(store: &RecordStore, page: i64, page_size: i64) -> Result<Vec<Student>> {
    let (offset, len) = page_window(page, page_size)?;
    Ok(store.values()?.into_iter().skip(offset).take(len).collect())
}

/// All records ordered by name
///
/// Names compare case-insensitively first, then exactly; equal names keep
/// store order.
pub fn sorted_by_name(store: &RecordStore) -> Result<Vec<Student>> {
    let mut students = store.values()?;
    students.sort_by(|a, b| compare_names(&a.name, &b.name));
    Ok(students)
}

// =============================================================================
// Pure helpers
// =============================================================================

fn matching(students: Vec<Student>, pred: impl Fn(&Student) -> bool) -> Vec<Student> {
    students.into_iter().filter(|s| pred(s)).collect()
}

fn in_date_range(student: &Student, start: &str, end: &str) -> bool {
    let date = student.enrollment_date.as_str();
    date >= start && date <= end
}

/// Offset and length of a page, rejecting non-positive inputs
fn page_window(page: i64, page_size: i64) -> Result<(usize, usize)> {
    if page < 1 || page_size < 1 {
        return Err(EnrollError::Validation(format!(
            "Invalid pagination: page={} pageSize={} (both must be >= 1)",
            page, page_size
        )));
    }

    let offset = (page - 1).saturating_mul(page_size);
    let to_usize = |n: i64| usize::try_from(n).unwrap_or(usize::MAX);
    Ok((to_usize(offset), to_usize(page_size)))
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
