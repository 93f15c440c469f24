//! Student Service
//!
//! Explicitly constructed owner of the store and its collaborators.

use std::path::Path;

use parking_lot::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::ident::{IdGenerator, UuidGenerator};
use crate::mutation::Mutator;
use crate::query;
use crate::store::RecordStore;
use crate::student::{NewStudent, Student, StudentPatch};

use super::{Reply, Request, RequestKind};

/// Serves every student operation against one store
///
/// ## Concurrency
/// - Queries run without service-level locking. Each one reads a single
///   engine scan, which never interleaves with a flush.
/// - Mutations hold `mutation_lock` for their whole read-modify-write, so
///   concurrent updates to one record never interleave.
pub struct StudentService {
    store: RecordStore,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    mutation_lock: Mutex<()>,
}

impl StudentService {
    /// Open the store described by `config` with system time and UUID ids
    pub fn open(config: Config) -> Result<Self> {
        Self::with_collaborators(config, Box::new(SystemClock::new()), Box::new(UuidGenerator))
    }

    /// Open with default settings under `path`
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Open with caller-supplied clock and id generator
    pub fn with_collaborators(
        config: Config,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdGenerator>,
    ) -> Result<Self> {
        Ok(Self::from_store(RecordStore::open(config)?, clock, ids))
    }

    pub fn from_store(store: RecordStore, clock: Box<dyn Clock>, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            store,
            clock,
            ids,
            mutation_lock: Mutex::new(()),
        }
    }

    /// Execute a request
    ///
    /// Routes requests to the appropriate layer
    pub fn execute(&self, request: Request) -> Result<Reply> {
        tracing::trace!("{} request: {:?}", request.name(), request);

        let _guard = match request.kind() {
            RequestKind::Mutation => Some(self.mutation_lock.lock()),
            RequestKind::Query => None,
        };
        let store = &self.store;
        let mutator = self.mutator();

        let reply = match request {
            Request::List => Reply::Students(query::list(store)?),
            Request::Get { id } => Reply::Student(query::get(store, &id)?),
            Request::Create { payload } => Reply::Student(mutator.create(payload)?),
            Request::Update { id, patch } => Reply::Student(mutator.update(&id, &patch)?),
            Request::Delete { id } => Reply::Student(mutator.delete(&id)?),
            Request::FilterByMajor { major } => {
                Reply::Students(query::filter_by_major(store, &major)?)
            }
            Request::FilterByDateRange { start, end } => {
                Reply::Students(query::filter_by_date_range(store, &start, &end)?)
            }
            Request::FilterByYear { year } => Reply::Students(query::filter_by_year(store, year)?),
            Request::FilterByMajorAndYear { major, year } => {
                Reply::Students(query::filter_by_major_and_year(store, &major, year)?)
            }
            Request::SearchByName { fragment } => {
                Reply::Students(query::search_by_name(store, &fragment)?)
            }
            Request::GetByEmail { email } => Reply::Student(query::get_by_email(store, &email)?),
            Request::CountByMajor { major } => Reply::Count(query::count_by_major(store, &major)?),
            Request::UpdateMajor { id, major } => Reply::Student(mutator.update_major(&id, &major)?),
            Request::UpdateEmail { id, email } => Reply::Student(mutator.update_email(&id, &email)?),
            Request::UpdateName { id, name } => Reply::Student(mutator.update_name(&id, &name)?),
            Request::Paginate { page, page_size } => {
                Reply::Students(query::paginate(store, page, page_size)?)
            }
            Request::SortedByName => Reply::Students(query::sorted_by_name(store)?),
        };

        Ok(reply)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn list(&self) -> Result<Vec<Student>> {
        query::list(&self.store)
    }

    pub fn get(&self, id: &str) -> Result<Student> {
        query::get(&self.store, id)
    }

    pub fn get_by_email(&self, email: &str) -> Result<Student> {
        query::get_by_email(&self.store, email)
    }

    pub fn filter_by_major(&self, major: &str) -> Result<Vec<Student>> {
        query::filter_by_major(&self.store, major)
    }

    pub fn filter_by_date_range(&self, start: &str, end: &str) -> Result<Vec<Student>> {
        query::filter_by_date_range(&self.store, start, end)
    }

    pub fn filter_by_year(&self, year: i32) -> Result<Vec<Student>> {
        query::filter_by_year(&self.store, year)
    }

    pub fn filter_by_major_and_year(&self, major: &str, year: i32) -> Result<Vec<Student>> {
        query::filter_by_major_and_year(&self.store, major, year)
    }

    pub fn search_by_name(&self, fragment: &str) -> Result<Vec<Student>> {
        query::search_by_name(&self.store, fragment)
    }

    pub fn count_by_major(&self, major: &str) -> Result<usize> {
        query::count_by_major(&self.store, major)
    }

    pub fn paginate(&self, page: i64, page_size: i64) -> Result<Vec<Student>> {
        query::paginate(&self.store, page, page_size)
    }

    pub fn sorted_by_name(&self) -> Result<Vec<Student>> {
        query::sorted_by_name(&self.store)
    }

    // =========================================================================
    // Mutations (serialized by mutation_lock)
    // =========================================================================

    pub fn create(&self, payload: NewStudent) -> Result<Student> {
        let _guard = self.mutation_lock.lock();
        self.mutator().create(payload)
    }

    pub fn update(&self, id: &str, patch: &StudentPatch) -> Result<Student> {
        let _guard = self.mutation_lock.lock();
        self.mutator().update(id, patch)
    }

    pub fn update_major(&self, id: &str, major: &str) -> Result<Student> {
        let _guard = self.mutation_lock.lock();
        self.mutator().update_major(id, major)
    }

    pub fn update_email(&self, id: &str, email: &str) -> Result<Student> {
        let _guard = self.mutation_lock.lock();
        self.mutator().update_email(id, email)
    }

    pub fn update_name(&self, id: &str, name: &str) -> Result<Student> {
        let _guard = self.mutation_lock.lock();
        self.mutator().update_name(id, name)
    }

    pub fn delete(&self, id: &str) -> Result<Student> {
        let _guard = self.mutation_lock.lock();
        self.mutator().delete(id)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Merge on-disk tables
    pub fn compact(&self) -> Result<u64> {
        let _guard = self.mutation_lock.lock();
        self.store.compact()
    }

    /// Flush buffered writes and release the store
    pub fn close(self) -> Result<()> {
        self.store.close()
    }

    /// Underlying store (for testing and debugging)
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    fn mutator(&self) -> Mutator<'_> {
        Mutator::new(&self.store, self.clock.as_ref(), self.ids.as_ref())
    }
}
