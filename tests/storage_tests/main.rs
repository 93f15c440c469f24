//! Storage tests: SSTable files and the storage manager
