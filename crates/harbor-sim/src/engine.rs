//! Alert rule evaluation.
//!
//! Evaluation is pure with respect to the caller's rules: it returns a new
//! rule list with updated trigger membership alongside the notifications for
//! units that newly satisfy a condition.

use chrono::{DateTime, Utc};
use harbor_core::rule::AlertRule;
use harbor_core::types::{EquipmentUnit, NotificationItem, NotificationSeverity, UnitId};
use tracing::{debug, info};

use crate::ids::IdSequence;

/// Output of one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluation {
    /// Rules in input order with refreshed membership
    pub rules: Vec<AlertRule>,
    /// Notifications in rule order, then roster order
    pub notifications: Vec<NotificationItem>,
}

/// Evaluate every enabled rule against `roster`.
///
/// Disabled rules are carried over untouched. A rule targeting an id that is
/// not in the roster has an empty scope and ends with empty membership.
pub fn evaluate_rules(
    rules: &[AlertRule],
    roster: &[EquipmentUnit],
    ids: &mut IdSequence,
    now: DateTime<Utc>,
) -> RuleEvaluation {
    let mut evaluation = RuleEvaluation {
        rules: Vec::with_capacity(rules.len()),
        notifications: Vec::new(),
    };

    for rule in rules {
        if !rule.enabled {
            evaluation.rules.push(rule.clone());
            continue;
        }

        let matching: Vec<&EquipmentUnit> = roster
            .iter()
            .filter(|unit| rule.target.covers(unit) && rule.condition.is_met(unit))
            .collect();

        for unit in &matching {
            if rule.is_triggered_for(&unit.id) {
                continue;
            }
            info!(rule_id = %rule.id, unit_id = %unit.id, "alert rule triggered");
            evaluation.notifications.push(NotificationItem {
                id: ids.next_id(&format!("{}-{}", rule.id, unit.id), now),
                message: rule.condition.trigger_message(unit),
                severity: NotificationSeverity::Warning,
                created_at: now,
            });
        }

        let members: Vec<UnitId> = matching.iter().map(|u| u.id.clone()).collect();
        if members != rule.triggered_members {
            debug!(rule_id = %rule.id, members = ?members, "rule membership changed");
        }
        evaluation.rules.push(AlertRule {
            triggered_members: members,
            ..rule.clone()
        });
    }

    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_core::rule::{
        Comparator, HealthThreshold, RuleCondition, RuleDefinition, RuleTarget,
    };
    use harbor_core::types::{EquipmentKind, HealthStatus, Position};

    fn unit(id: &str, health: HealthStatus, utilization: f64) -> EquipmentUnit {
        EquipmentUnit::new(
            id,
            format!("Unit {id}"),
            EquipmentKind::Crane,
            Position::new(100.0, 100.0),
            health,
            utilization,
        )
    }

    fn rule(target: RuleTarget, condition: RuleCondition) -> AlertRule {
        AlertRule::new("alert-1", RuleDefinition::new(target, condition), "label")
    }

    fn above_80() -> RuleCondition {
        RuleCondition::utilization(Comparator::GreaterThan, 80.0).unwrap()
    }

    fn run(rules: &[AlertRule], roster: &[EquipmentUnit]) -> RuleEvaluation {
        evaluate_rules(rules, roster, &mut IdSequence::new(), Utc::now())
    }

    #[test]
    fn test_first_match_notifies() {
        let rules = [rule(RuleTarget::All, above_80())];
        let roster = [
            unit("A", HealthStatus::Operational, 85.0),
            unit("B", HealthStatus::Operational, 50.0),
        ];
        let out = run(&rules, &roster);
        assert_eq!(out.notifications.len(), 1);
        assert_eq!(out.notifications[0].severity, NotificationSeverity::Warning);
        assert!(out.notifications[0].id.starts_with("alert-1-A-"));
        assert_eq!(out.rules[0].triggered_members, vec!["A".to_string()]);
        assert!(rules[0].triggered_members.is_empty());
    }

    #[test]
    fn test_still_matching_is_silent() {
        let mut r = rule(RuleTarget::All, above_80());
        r.triggered_members = vec!["A".into()];
        let out = run(&[r], &[unit("A", HealthStatus::Operational, 90.0)]);
        assert!(out.notifications.is_empty());
        assert_eq!(out.rules[0].triggered_members, vec!["A".to_string()]);
    }

    #[test]
    fn test_membership_clears_when_condition_lapses() {
        let mut r = rule(RuleTarget::All, above_80());
        r.triggered_members = vec!["A".into()];
        let out = run(&[r], &[unit("A", HealthStatus::Operational, 70.0)]);
        assert!(out.notifications.is_empty());
        assert!(out.rules[0].triggered_members.is_empty());
    }

    #[test]
    fn test_disabled_rule_untouched() {
        let mut r = rule(RuleTarget::All, above_80());
        r.enabled = false;
        r.triggered_members = vec!["B".into()];
        let out = run(
            std::slice::from_ref(&r),
            &[unit("A", HealthStatus::Operational, 95.0)],
        );
        assert!(out.notifications.is_empty());
        assert_eq!(out.rules[0], r);
    }

    #[test]
    fn test_single_target_scope() {
        let rules = [rule(
            RuleTarget::Unit("B".into()),
            RuleCondition::Health {
                threshold: HealthThreshold::Error,
            },
        )];
        let roster = [
            unit("A", HealthStatus::Error, 0.0),
            unit("B", HealthStatus::Error, 0.0),
        ];
        let out = run(&rules, &roster);
        assert_eq!(out.notifications.len(), 1);
        assert_eq!(out.notifications[0].message, "Custom Alert: Unit B has a status of Error.");
    }

    #[test]
    fn test_missing_target_has_empty_scope() {
        let mut r = rule(RuleTarget::Unit("GONE".into()), above_80());
        r.triggered_members = vec!["GONE".into()];
        let out = run(&[r], &[unit("A", HealthStatus::Operational, 99.0)]);
        assert!(out.notifications.is_empty());
        assert!(out.rules[0].triggered_members.is_empty());
    }

    #[test]
    fn test_rule_order_preserved() {
        let mut second = rule(
            RuleTarget::All,
            RuleCondition::Health {
                threshold: HealthThreshold::Warning,
            },
        );
        second.id = "alert-2".into();
        let rules = [rule(RuleTarget::All, above_80()), second];
        let out = run(&rules, &[unit("A", HealthStatus::Warning, 90.0)]);
        assert_eq!(out.notifications.len(), 2);
        assert!(out.notifications[0].id.starts_with("alert-1-"));
        assert!(out.notifications[1].id.starts_with("alert-2-"));
        let ids: Vec<_> = out.rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["alert-1", "alert-2"]);
    }
}
