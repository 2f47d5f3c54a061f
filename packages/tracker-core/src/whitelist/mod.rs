//! The client whitelist.
//!
//! When the tracker runs with client whitelisting enabled, only announce
//! requests coming from whitelisted `BitTorrent` client implementations are
//! accepted. The client is identified by the azureus-style prefix embedded in
//! the announcing peer id (for example `qB4250` for a qBittorrent release).
//!
//! The module is organized into the following submodules:
//!
//! - **`manager`**: Provides high-level management functions for the
//!   whitelist, such as adding or removing clients.
//! - **`repository`**: The in-memory registry used by the storage driver and
//!   the database-backed persistence.
pub mod manager;
pub mod repository;
