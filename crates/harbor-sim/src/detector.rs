//! Health transition detection between consecutive rosters.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use harbor_core::types::{EquipmentUnit, HealthStatus, NotificationItem, NotificationSeverity};
use tracing::info;

use crate::ids::IdSequence;

/// Emit one notification per unit whose health got strictly worse.
///
/// Units are matched by id. Recoveries, unchanged health and units missing
/// from `previous` produce nothing. Output follows `next` roster order.
pub fn detect_escalations(
    previous: &[EquipmentUnit],
    next: &[EquipmentUnit],
    ids: &mut IdSequence,
    now: DateTime<Utc>,
) -> Vec<NotificationItem> {
    let before: HashMap<&str, HealthStatus> = previous
        .iter()
        .map(|u| (u.id.as_str(), u.health))
        .collect();

    next.iter()
        .filter_map(|unit| {
            let prior = *before.get(unit.id.as_str())?;
            if unit.health <= prior {
                return None;
            }
            let severity = NotificationSeverity::for_health(unit.health)?;

            info!(
                unit_id = %unit.id,
                from = %prior,
                to = %unit.health,
                "health escalated"
            );

            Some(NotificationItem {
                id: ids.next_id(&unit.id, now),
                message: format!("{} status changed to {}.", unit.name, unit.health),
                severity,
                created_at: now,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_core::types::{EquipmentKind, Position};

    fn unit(id: &str, health: HealthStatus) -> EquipmentUnit {
        EquipmentUnit::new(
            id,
            format!("Unit {id}"),
            EquipmentKind::Truck,
            Position::new(100.0, 100.0),
            health,
            50.0,
        )
    }

    fn detect(prev: &[EquipmentUnit], next: &[EquipmentUnit]) -> Vec<NotificationItem> {
        detect_escalations(prev, next, &mut IdSequence::new(), Utc::now())
    }

    #[test]
    fn test_escalation_emits_one() {
        let items = detect(
            &[unit("T01", HealthStatus::Operational)],
            &[unit("T01", HealthStatus::Warning)],
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].severity, NotificationSeverity::Warning);
        assert_eq!(items[0].message, "Unit T01 status changed to Warning.");
        assert!(items[0].id.starts_with("T01-"));
    }

    #[test]
    fn test_recovery_and_steady_state_silent() {
        assert!(
            detect(
                &[unit("T01", HealthStatus::Warning)],
                &[unit("T01", HealthStatus::Operational)],
            )
            .is_empty()
        );
        assert!(
            detect(
                &[unit("T01", HealthStatus::Error)],
                &[unit("T01", HealthStatus::Error)],
            )
            .is_empty()
        );
    }

    #[test]
    fn test_all_escalation_paths() {
        let prev = [
            unit("A", HealthStatus::Operational),
            unit("B", HealthStatus::Operational),
            unit("C", HealthStatus::Warning),
        ];
        let next = [
            unit("A", HealthStatus::Warning),
            unit("B", HealthStatus::Error),
            unit("C", HealthStatus::Error),
        ];
        let items = detect(&prev, &next);
        let severities: Vec<_> = items.iter().map(|i| i.severity).collect();
        assert_eq!(
            severities,
            vec![
                NotificationSeverity::Warning,
                NotificationSeverity::Error,
                NotificationSeverity::Error
            ]
        );
        assert!(items[2].message.starts_with("Unit C"));
    }

    #[test]
    fn test_matches_by_id_not_position() {
        let prev = [
            unit("A", HealthStatus::Operational),
            unit("B", HealthStatus::Warning),
        ];
        let next = [
            unit("B", HealthStatus::Warning),
            unit("A", HealthStatus::Operational),
        ];
        assert!(detect(&prev, &next).is_empty());
    }

    #[test]
    fn test_new_unit_ignored() {
        let items = detect(&[], &[unit("Z", HealthStatus::Error)]);
        assert!(items.is_empty());
    }
}
