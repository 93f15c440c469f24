//! Service Module
//!
//! Owns a [`RecordStore`](crate::store::RecordStore) together with its clock
//! and id collaborators, and routes [`Request`]s to the query and mutation
//! layers.
//!
//! ## Operations
//! | Request | Reply |
//! |---|---|
//! | `List`, `SortedByName`, `Paginate`, `FilterBy*`, `SearchByName` | `Students` |
//! | `Get`, `GetByEmail`, `Create`, `Update`, `Update{Major,Email,Name}`, `Delete` | `Student` |
//! | `CountByMajor` | `Count` |

mod request;
mod reply;
mod handler;

pub use request::{Request, RequestKind};
pub use reply::Reply;
pub use handler::StudentService;
