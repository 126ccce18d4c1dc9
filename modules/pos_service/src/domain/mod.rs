//! Domain layer - business logic and services

pub mod events;
pub mod pricing;
pub mod realtime;
pub mod repository;
pub mod service;
pub mod stock;
pub mod validation;

pub use events::{ChangeEvent, ChangePublisher, NoOpChangePublisher};
pub use realtime::{ChannelManager, Invalidation, RealtimePublisher, Subscription};
pub use repository::{
    AuditRepository, CatalogRepository, ConfigRepository, LedgerRepository, PartyRepository,
    PromoRepository, TenantRepository,
};
pub use service::{Repositories, Service};
