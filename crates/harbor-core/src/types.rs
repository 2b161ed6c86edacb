//! Shared type definitions used across HARBOR crates.
//!
//! Equipment units, their health and kind, and the notification items the
//! monitor emits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an equipment unit.
pub type UnitId = String;

/// Lower bound of the map rectangle on both axes.
pub const MAP_MIN: f64 = 10.0;

/// Upper bound of the map rectangle on the x axis.
pub const MAP_MAX_X: f64 = 490.0;

/// Upper bound of the map rectangle on the y axis.
pub const MAP_MAX_Y: f64 = 590.0;

/// Utilization percentage bounds.
pub const UTILIZATION_MIN: f64 = 0.0;
pub const UTILIZATION_MAX: f64 = 100.0;

/// Kind of port equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentKind {
    /// Ship-to-shore crane
    Crane,
    /// Terminal truck
    Truck,
    /// Rubber-tyred gantry crane
    #[serde(rename = "RTG")]
    Rtg,
}

impl EquipmentKind {
    /// All kinds, in display order.
    pub fn all() -> &'static [EquipmentKind] {
        &[Self::Crane, Self::Truck, Self::Rtg]
    }
}

impl std::fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Crane => write!(f, "Crane"),
            Self::Truck => write!(f, "Truck"),
            Self::Rtg => write!(f, "RTG"),
        }
    }
}

/// Equipment health, ordered by severity.
///
/// `Operational < Warning < Error`; the derived ordering is what escalation
/// detection compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum HealthStatus {
    #[default]
    Operational,
    Warning,
    Error,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Operational => write!(f, "Operational"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Coarse utilization classification used by dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationBand {
    /// 60% or below
    Normal,
    /// Above 60%
    Elevated,
    /// Above 85%
    High,
}

impl UtilizationBand {
    /// Classify a utilization percentage.
    pub fn classify(utilization: f64) -> Self {
        if utilization > 85.0 {
            Self::High
        } else if utilization > 60.0 {
            Self::Elevated
        } else {
            Self::Normal
        }
    }
}

/// Position on the port map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both coordinates into the map rectangle.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(MAP_MIN, MAP_MAX_X),
            y: self.y.clamp(MAP_MIN, MAP_MAX_Y),
        }
    }

    /// Returns true if the position lies inside the map rectangle.
    pub fn in_bounds(&self) -> bool {
        (MAP_MIN..=MAP_MAX_X).contains(&self.x) && (MAP_MIN..=MAP_MAX_Y).contains(&self.y)
    }
}

/// A single piece of port equipment and its current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentUnit {
    /// Stable unique identifier (e.g. "C01")
    pub id: UnitId,
    /// Display label
    pub name: String,
    /// Equipment kind
    pub kind: EquipmentKind,
    /// Map position, always inside the map rectangle
    pub position: Position,
    /// Current health
    pub health: HealthStatus,
    /// Utilization percentage in [0, 100], one decimal place
    pub utilization: f64,
}

impl EquipmentUnit {
    /// Create a unit. Position and utilization are clamped into bounds and an
    /// `Error` unit starts with zero utilization.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: EquipmentKind,
        position: Position,
        health: HealthStatus,
        utilization: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            position,
            health,
            utilization,
        }
        .normalized()
    }

    /// Clamp position and utilization into bounds and zero the utilization
    /// of an `Error` unit. NaN utilization is treated as 0.
    pub fn normalized(self) -> Self {
        let utilization = if self.health == HealthStatus::Error || self.utilization.is_nan() {
            0.0
        } else {
            round_to(self.utilization.clamp(UTILIZATION_MIN, UTILIZATION_MAX), 1)
        };
        Self {
            position: self.position.clamped(),
            utilization,
            ..self
        }
    }

    /// Utilization band for display.
    pub fn utilization_band(&self) -> UtilizationBand {
        UtilizationBand::classify(self.utilization)
    }
}

/// Round `value` to `decimals` decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Notification severity. Operational is never notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NotificationSeverity {
    Warning,
    Error,
}

impl NotificationSeverity {
    /// Severity matching a health state, if that state is notifiable.
    pub fn for_health(health: HealthStatus) -> Option<Self> {
        match health {
            HealthStatus::Operational => None,
            HealthStatus::Warning => Some(Self::Warning),
            HealthStatus::Error => Some(Self::Error),
        }
    }
}

impl std::fmt::Display for NotificationSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// A notification shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationItem {
    /// Unique id derived from the source id(s), emission time and a sequence
    pub id: String,
    /// Human-readable text
    pub message: String,
    /// Severity
    pub severity: NotificationSeverity,
    /// Emission timestamp
    pub created_at: DateTime<Utc>,
}
