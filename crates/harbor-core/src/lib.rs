//! # harbor-core
//!
//! Core types, errors, and utilities for the HARBOR port equipment monitor.
//!
//! This crate provides:
//! - [`HarborError`] - Error type for rule validation and configuration
//! - [`logging`] - Tracing setup and log directory helpers
//! - [`types`] - Equipment units, health, notifications
//! - [`rule`] - Custom alert rule model and validation
//! - [`fleet`] - Seed fleet, kind filter, fleet summary
//!
//! ## Example
//!
//! ```no_run
//! use harbor_core::{fleet, logging};
//!
//! fn main() -> harbor_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     for unit in fleet::seed_fleet() {
//!         tracing::info!(unit_id = %unit.id, health = %unit.health, "loaded unit");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod fleet;
pub mod logging;
pub mod rule;
pub mod types;

pub use error::{HarborError, Result};
pub use fleet::{EquipmentFilter, FleetSummary, seed_fleet};
pub use logging::{LogGuard, init_logging};
pub use rule::{
    AlertRule, Comparator, HealthThreshold, RawRuleDefinition, RuleCondition, RuleDefinition,
    RuleTarget,
};
pub use types::{
    EquipmentKind, EquipmentUnit, HealthStatus, NotificationItem, NotificationSeverity, Position,
    UnitId,
};
