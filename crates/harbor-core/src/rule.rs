//! Custom alert rule model.
//!
//! A rule watches either one unit or the whole fleet and fires when a unit's
//! health equals a threshold or its utilization crosses a value. The condition
//! is a sum type so a health rule can never carry a comparator and a
//! utilization rule can never carry a health threshold.
//!
//! Rules arriving from configuration files or other loosely typed callers use
//! [`RawRuleDefinition`], which is validated into a [`RuleDefinition`].

use serde::{Deserialize, Serialize};

use crate::error::{HarborError, Result};
use crate::types::{EquipmentUnit, HealthStatus, UTILIZATION_MAX, UTILIZATION_MIN, UnitId};

/// Target sentinel meaning "every unit in the fleet".
pub const ALL_TARGET: &str = "all";

/// Label cached for fleet-wide rules.
pub const ALL_TARGET_LABEL: &str = "All Equipment";

/// Which units a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleTarget {
    All,
    Unit(UnitId),
}

impl RuleTarget {
    /// Interpret a target id, treating `"all"` as the fleet-wide sentinel.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        if id == ALL_TARGET { Self::All } else { Self::Unit(id) }
    }

    /// Returns true if the unit is inside this target's scope.
    pub fn covers(&self, unit: &EquipmentUnit) -> bool {
        match self {
            Self::All => true,
            Self::Unit(id) => unit.id == *id,
        }
    }

    pub fn as_id(&self) -> &str {
        match self {
            Self::All => ALL_TARGET,
            Self::Unit(id) => id.as_str(),
        }
    }
}

impl From<String> for RuleTarget {
    fn from(id: String) -> Self {
        Self::from_id(id)
    }
}

impl From<RuleTarget> for String {
    fn from(target: RuleTarget) -> Self {
        target.as_id().to_string()
    }
}

/// Health states a health rule may watch for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthThreshold {
    Warning,
    Error,
}

impl HealthThreshold {
    pub fn as_health(&self) -> HealthStatus {
        match self {
            Self::Warning => HealthStatus::Warning,
            Self::Error => HealthStatus::Error,
        }
    }
}

impl std::fmt::Display for HealthThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_health())
    }
}

/// Utilization comparison direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    #[serde(alias = "gt")]
    GreaterThan,
    #[serde(alias = "lt")]
    LessThan,
}

impl Comparator {
    pub fn compare(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
        }
    }

    /// Operator symbol (`>` or `<`).
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
        }
    }

    /// Word used in notification text.
    pub fn word(&self) -> &'static str {
        match self {
            Self::GreaterThan => "above",
            Self::LessThan => "below",
        }
    }
}

/// Rule condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Fires when a unit's health equals the threshold exactly
    Health { threshold: HealthThreshold },
    /// Fires when a unit's utilization compares true against the threshold
    Utilization { comparator: Comparator, threshold: f64 },
}

impl RuleCondition {
    /// Build a utilization condition, rejecting non-finite or out-of-range thresholds.
    pub fn utilization(comparator: Comparator, threshold: f64) -> Result<Self> {
        let condition = Self::Utilization {
            comparator,
            threshold,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub fn validate(&self) -> Result<()> {
        if let Self::Utilization { threshold, .. } = self {
            if !threshold.is_finite() {
                return Err(HarborError::invalid_rule(
                    "threshold_value",
                    "utilization threshold must be a finite number",
                ));
            }
            if !(UTILIZATION_MIN..=UTILIZATION_MAX).contains(threshold) {
                return Err(HarborError::invalid_rule(
                    "threshold_value",
                    format!("utilization threshold {threshold} is outside 0-100"),
                ));
            }
        }
        Ok(())
    }

    /// Evaluate the condition against one unit.
    pub fn is_met(&self, unit: &EquipmentUnit) -> bool {
        match self {
            Self::Health { threshold } => unit.health == threshold.as_health(),
            Self::Utilization {
                comparator,
                threshold,
            } => comparator.compare(unit.utilization, *threshold),
        }
    }

    /// Notification text for a unit that newly satisfies the condition.
    pub fn trigger_message(&self, unit: &EquipmentUnit) -> String {
        match self {
            Self::Health { .. } => {
                format!("Custom Alert: {} has a status of {}.", unit.name, unit.health)
            }
            Self::Utilization {
                comparator,
                threshold,
            } => format!(
                "Custom Alert: {} utilization ({}%) is {} {}%.",
                unit.name,
                unit.utilization,
                comparator.word(),
                threshold
            ),
        }
    }
}

/// Input for creating a rule. The monitor assigns id, enabled flag and membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub target: RuleTarget,
    /// Display label; resolved from the roster when absent
    #[serde(default)]
    pub target_label: Option<String>,
    pub condition: RuleCondition,
}

impl RuleDefinition {
    pub fn new(target: RuleTarget, condition: RuleCondition) -> Self {
        Self {
            target,
            target_label: None,
            condition,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.target_label = Some(label.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let RuleTarget::Unit(id) = &self.target {
            if id.trim().is_empty() {
                return Err(HarborError::invalid_rule("target", "target id is empty"));
            }
            if id == ALL_TARGET {
                return Err(HarborError::invalid_rule(
                    "target",
                    format!("'{ALL_TARGET}' is reserved for fleet-wide rules"),
                ));
            }
        }
        self.condition.validate()
    }
}

/// A user-defined alert rule and its current trigger membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub target: RuleTarget,
    /// Display name cached at creation time
    pub target_label: String,
    pub enabled: bool,
    pub condition: RuleCondition,
    /// Ids satisfying the condition on the latest evaluation, in roster order
    pub triggered_members: Vec<UnitId>,
}

impl AlertRule {
    /// Create an enabled rule with empty membership.
    pub fn new(id: impl Into<String>, definition: RuleDefinition, target_label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target: definition.target,
            target_label: target_label.into(),
            enabled: true,
            condition: definition.condition,
            triggered_members: Vec::new(),
        }
    }

    pub fn is_triggered_for(&self, unit_id: &str) -> bool {
        self.triggered_members.iter().any(|id| id == unit_id)
    }

    /// One-line summary for rule lists.
    pub fn description(&self) -> String {
        match &self.condition {
            RuleCondition::Health { threshold } => {
                format!("{} status is {}", self.target_label, threshold)
            }
            RuleCondition::Utilization {
                comparator,
                threshold,
            } => format!(
                "{} utilization {} {}%",
                self.target_label,
                comparator.symbol(),
                threshold
            ),
        }
    }
}

/// Loosely typed rule definition as found in configuration files.
///
/// ```yaml
/// target: T02
/// metric: utilization
/// comparator: lt
/// threshold_value: 50
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRuleDefinition {
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default)]
    pub target_label: Option<String>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub threshold_health: Option<String>,
    #[serde(default)]
    pub comparator: Option<String>,
    #[serde(default)]
    pub threshold_value: Option<f64>,
}

fn default_target() -> String {
    ALL_TARGET.to_string()
}

fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-' && *c != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_health_threshold(value: &str) -> Result<HealthThreshold> {
    match normalize(value).as_str() {
        "warning" => Ok(HealthThreshold::Warning),
        "error" => Ok(HealthThreshold::Error),
        "operational" => Err(HarborError::invalid_rule(
            "threshold_health",
            "Operational cannot be used as an alert threshold",
        )),
        other => Err(HarborError::invalid_rule(
            "threshold_health",
            format!("unknown health state '{other}'"),
        )),
    }
}

fn parse_comparator(value: &str) -> Result<Comparator> {
    match normalize(value).as_str() {
        "gt" | "greaterthan" | "above" | ">" => Ok(Comparator::GreaterThan),
        "lt" | "lessthan" | "below" | "<" => Ok(Comparator::LessThan),
        other => Err(HarborError::invalid_rule(
            "comparator",
            format!("unknown comparator '{other}'"),
        )),
    }
}

impl TryFrom<RawRuleDefinition> for RuleDefinition {
    type Error = HarborError;

    fn try_from(raw: RawRuleDefinition) -> Result<Self> {
        let metric = raw
            .metric
            .as_deref()
            .ok_or_else(|| HarborError::invalid_rule("metric", "metric is required"))?;

        let condition = match normalize(metric).as_str() {
            "health" => {
                let threshold = raw.threshold_health.as_deref().ok_or_else(|| {
                    HarborError::invalid_rule("threshold_health", "health rules need a threshold")
                })?;
                RuleCondition::Health {
                    threshold: parse_health_threshold(threshold)?,
                }
            }
            "utilization" => {
                let comparator = raw.comparator.as_deref().ok_or_else(|| {
                    HarborError::invalid_rule("comparator", "utilization rules need a comparator")
                })?;
                let threshold = raw.threshold_value.ok_or_else(|| {
                    HarborError::invalid_rule(
                        "threshold_value",
                        "utilization rules need a threshold value",
                    )
                })?;
                RuleCondition::utilization(parse_comparator(comparator)?, threshold)?
            }
            other => {
                return Err(HarborError::invalid_rule(
                    "metric",
                    format!("unknown metric '{other}'"),
                ));
            }
        };

        let definition = RuleDefinition {
            target: RuleTarget::from_id(raw.target.trim()),
            target_label: raw.target_label,
            condition,
        };
        definition.validate()?;
        Ok(definition)
    }
}
