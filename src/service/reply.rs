//! Reply definitions

use serde::Serialize;

use crate::student::Student;

/// Successful result of a [`Request`](super::Request)
///
/// Serializes as the bare payload: an object, an array, or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Student(Student),
    Students(Vec<Student>),
    Count(usize),
}

impl Reply {
    pub fn into_student(self) -> Option<Student> {
        match self {
            Reply::Student(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_students(self) -> Option<Vec<Student>> {
        match self {
            Reply::Students(s) => Some(s),
            _ => None,
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            Reply::Count(n) => Some(*n),
            _ => None,
        }
    }
}
