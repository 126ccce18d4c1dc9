//! KasirPro POS Service Module
//!
//! Multi-tenant, multi-store point of sale and inventory: catalog, checkout,
//! purchasing, returns, stock opname, derived stock levels and realtime
//! cache-invalidation channels.

// Public exports
pub mod contract;
pub use contract::{client::PosApi, error::PosError, TenantScope};

pub mod module;
pub use module::PosServiceModule;

pub use config::{Config, RealtimeConfig};

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
