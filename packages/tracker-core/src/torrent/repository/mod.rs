//! Repositories for torrent data: the in-memory swarm store and the
//! database-backed persistence of snatch counts.
pub mod in_memory;
pub mod persisted;
