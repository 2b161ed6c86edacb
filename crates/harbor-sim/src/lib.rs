//! # harbor-sim
//!
//! Simulation core for the HARBOR port equipment monitor.
//!
//! - [`simulator`] - Random walk of utilization, position and health per tick
//! - [`detector`] - Notifications for health escalations
//! - [`engine`] - Custom alert rule evaluation with trigger membership
//! - [`feed`] - Bounded newest-first notification feed
//! - [`monitor`] - [`FleetMonitor`], the single owner of fleet state
//! - [`scheduler`] - [`TickScheduler`], the background tick driver

pub mod detector;
pub mod engine;
pub mod feed;
pub mod ids;
pub mod monitor;
pub mod random;
pub mod scheduler;
pub mod simulator;

pub use detector::detect_escalations;
pub use engine::{RuleEvaluation, evaluate_rules};
pub use feed::NotificationFeed;
pub use ids::IdSequence;
pub use monitor::{FleetMonitor, FleetSnapshot, TickReport};
pub use random::RandomSource;
pub use scheduler::{SchedulerHandle, TickScheduler};
pub use simulator::simulate_tick;
