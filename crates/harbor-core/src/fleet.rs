//! Equipment registry helpers: the seed fleet, kind filtering and summaries.

use serde::{Deserialize, Serialize};

use crate::types::{EquipmentKind, EquipmentUnit, HealthStatus, Position};

/// Read-side filter selected by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EquipmentFilter {
    #[default]
    All,
    Kind(EquipmentKind),
}

impl EquipmentFilter {
    /// Returns true if the unit passes this filter.
    pub fn matches(&self, unit: &EquipmentUnit) -> bool {
        match self {
            Self::All => true,
            Self::Kind(kind) => unit.kind == *kind,
        }
    }

    /// Filters offered to the operator: "All" followed by every kind.
    pub fn choices() -> Vec<EquipmentFilter> {
        std::iter::once(Self::All)
            .chain(EquipmentKind::all().iter().copied().map(Self::Kind))
            .collect()
    }
}

impl std::fmt::Display for EquipmentFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Kind(kind) => write!(f, "{kind}"),
        }
    }
}

/// Apply a filter to a roster, preserving order.
pub fn filter_roster(roster: &[EquipmentUnit], filter: EquipmentFilter) -> Vec<EquipmentUnit> {
    roster.iter().filter(|u| filter.matches(u)).cloned().collect()
}

/// Health counts and mean utilization across a roster.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total: usize,
    pub operational: usize,
    pub warning: usize,
    pub error: usize,
    /// Mean utilization, 0 for an empty roster
    pub mean_utilization: f64,
}

impl FleetSummary {
    pub fn from_roster(roster: &[EquipmentUnit]) -> Self {
        let mut summary = Self {
            total: roster.len(),
            ..Self::default()
        };
        for unit in roster {
            match unit.health {
                HealthStatus::Operational => summary.operational += 1,
                HealthStatus::Warning => summary.warning += 1,
                HealthStatus::Error => summary.error += 1,
            }
        }
        if !roster.is_empty() {
            let sum: f64 = roster.iter().map(|u| u.utilization).sum();
            summary.mean_utilization = sum / roster.len() as f64;
        }
        summary
    }

    /// Format for a one-line status display.
    pub fn format_compact(&self) -> String {
        format!(
            "{} units | {} ok | {} warning | {} error | {:.1}% avg",
            self.total, self.operational, self.warning, self.error, self.mean_utilization
        )
    }
}

/// The terminal's starting fleet.
pub fn seed_fleet() -> Vec<EquipmentUnit> {
    use EquipmentKind::{Crane, Rtg, Truck};
    use HealthStatus::{Error, Operational, Warning};

    let rows: [(&str, &str, EquipmentKind, f64, f64, HealthStatus, f64); 12] = [
        ("C01", "Crane Alpha", Crane, 120.0, 340.0, Operational, 75.0),
        ("C02", "Crane Bravo", Crane, 150.0, 355.0, Operational, 88.0),
        ("T01", "Truck 1", Truck, 250.0, 110.0, Operational, 45.0),
        ("T02", "Truck 2", Truck, 50.0, 220.0, Warning, 95.0),
        ("T03", "Truck 3", Truck, 400.0, 50.0, Operational, 60.0),
        ("RTG01", "RTG Gantry 1", Rtg, 300.0, 450.0, Operational, 82.0),
        ("RTG02", "RTG Gantry 2", Rtg, 310.0, 480.0, Error, 0.0),
        ("C03", "Crane Charlie", Crane, 180.0, 360.0, Warning, 92.0),
        ("T04", "Truck 4", Truck, 180.0, 150.0, Operational, 30.0),
        ("RTG03", "RTG Gantry 3", Rtg, 320.0, 510.0, Operational, 70.0),
        ("T05", "Truck 5", Truck, 90.0, 400.0, Operational, 55.0),
        ("C04", "Crane Delta", Crane, 210.0, 370.0, Operational, 65.0),
    ];

    rows.into_iter()
        .map(|(id, name, kind, x, y, health, utilization)| {
            EquipmentUnit::new(id, name, kind, Position::new(x, y), health, utilization)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_fleet_ids_unique() {
        let fleet = seed_fleet();
        assert_eq!(fleet.len(), 12);
        let ids: HashSet<_> = fleet.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids.len(), fleet.len());
        assert!(fleet.iter().all(|u| u.position.in_bounds()));
    }

    #[test]
    fn test_filter_by_kind() {
        let fleet = seed_fleet();
        let rtgs = filter_roster(&fleet, EquipmentFilter::Kind(EquipmentKind::Rtg));
        assert_eq!(rtgs.len(), 3);
        assert!(rtgs.iter().all(|u| u.kind == EquipmentKind::Rtg));
        assert_eq!(filter_roster(&fleet, EquipmentFilter::All), fleet);
    }

    #[test]
    fn test_filter_choices() {
        let choices = EquipmentFilter::choices();
        assert_eq!(choices[0], EquipmentFilter::All);
        assert_eq!(choices.len(), 4);
        assert_eq!(choices[3].to_string(), "RTG");
    }

    #[test]
    fn test_summary() {
        let summary = FleetSummary::from_roster(&seed_fleet());
        assert_eq!(summary.total, 12);
        assert_eq!(summary.operational, 9);
        assert_eq!(summary.warning, 2);
        assert_eq!(summary.error, 1);
        assert!(summary.format_compact().contains("12 units"));

        let empty = FleetSummary::from_roster(&[]);
        assert_eq!(empty.mean_utilization, 0.0);
    }
}
