//! Request definitions
//!
//! One variant per exposed operation.

use serde::{Deserialize, Serialize};

use crate::student::{NewStudent, StudentPatch};

/// Operation tags, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Query,
    Mutation,
}

/// A request to the student service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Request {
    List,
    Get { id: String },
    Create { payload: NewStudent },
    Update { id: String, patch: StudentPatch },
    Delete { id: String },
    FilterByMajor { major: String },
    FilterByDateRange { start: String, end: String },
    FilterByYear { year: i32 },
    FilterByMajorAndYear { major: String, year: i32 },
    SearchByName { fragment: String },
    GetByEmail { email: String },
    CountByMajor { major: String },
    UpdateMajor { id: String, major: String },
    UpdateEmail { id: String, email: String },
    UpdateName { id: String, name: String },
    Paginate {
        page: i64,
        #[serde(rename = "pageSize")]
        page_size: i64,
    },
    SortedByName,
}

impl Request {
    /// Whether this request changes stored state
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Create { .. }
            | Request::Update { .. }
            | Request::Delete { .. }
            | Request::UpdateMajor { .. }
            | Request::UpdateEmail { .. }
            | Request::UpdateName { .. } => RequestKind::Mutation,
            _ => RequestKind::Query,
        }
    }

    /// Operation name as exposed to callers
    pub fn name(&self) -> &'static str {
        match self {
            Request::List => "list",
            Request::Get { .. } => "get",
            Request::Create { .. } => "create",
            Request::Update { .. } => "update",
            Request::Delete { .. } => "delete",
            Request::FilterByMajor { .. } => "filterByMajor",
            Request::FilterByDateRange { .. } => "filterByDateRange",
            Request::FilterByYear { .. } => "filterByYear",
            Request::FilterByMajorAndYear { .. } => "filterByMajorAndYear",
            Request::SearchByName { .. } => "searchByName",
            Request::GetByEmail { .. } => "getByEmail",
            Request::CountByMajor { .. } => "countByMajor",
            Request::UpdateMajor { .. } => "updateMajor",
            Request::UpdateEmail { .. } => "updateEmail",
            Request::UpdateName { .. } => "updateName",
            Request::Paginate { .. } => "paginate",
            Request::SortedByName => "sortedByName",
        }
    }
}
