//! Repositories for the client whitelist: the in-memory registry used by the
//! storage driver and the database-backed persistence.
pub mod in_memory;
pub mod persisted;
