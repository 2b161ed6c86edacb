//! The fleet monitor: roster, alert rules and notification feed behind one
//! owner, advanced one tick at a time.
//!
//! # Tick pipeline
//!
//! 1. The simulator derives the next roster from the current one.
//! 2. The detector compares both rosters and reports escalations.
//! 3. The rule engine evaluates enabled rules against the next roster.
//! 4. Detector items, then rule items, are published to the feed.
//! 5. The next roster replaces the current one.
//!
//! Read operations never mutate. All writes go through `&mut self`, so a
//! single owner (or the scheduler's lock) serializes them with ticks.

use chrono::{DateTime, Utc};
use harbor_config::HarborConfig;
use harbor_core::fleet::{EquipmentFilter, FleetSummary, filter_roster, seed_fleet};
use harbor_core::rule::{ALL_TARGET_LABEL, AlertRule, RawRuleDefinition, RuleDefinition, RuleTarget};
use harbor_core::types::{EquipmentUnit, HealthStatus, NotificationItem};
use harbor_core::{HarborError, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::detector::detect_escalations;
use crate::engine::evaluate_rules;
use crate::feed::NotificationFeed;
use crate::ids::IdSequence;
use crate::simulator::simulate_tick;

/// What one tick produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Health escalations detected
    pub escalations: usize,
    /// Alert rule triggers
    pub rule_triggers: usize,
    /// Notifications emitted this tick, detector items first
    pub notifications: Vec<NotificationItem>,
}

impl TickReport {
    pub fn is_quiet(&self) -> bool {
        self.notifications.is_empty()
    }
}

/// Immutable view of the monitor between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub tick: u64,
    pub taken_at: DateTime<Utc>,
    pub roster: Vec<EquipmentUnit>,
    pub notifications: Vec<NotificationItem>,
    pub rules: Vec<AlertRule>,
    pub filter: EquipmentFilter,
    pub summary: FleetSummary,
}

impl FleetSnapshot {
    /// Roster restricted to the snapshot's filter.
    pub fn filtered_roster(&self) -> Vec<EquipmentUnit> {
        filter_roster(&self.roster, self.filter)
    }
}

/// Owner of the fleet state.
#[derive(Debug)]
pub struct FleetMonitor {
    roster: Vec<EquipmentUnit>,
    rules: Vec<AlertRule>,
    feed: NotificationFeed,
    filter: EquipmentFilter,
    rng: StdRng,
    ids: IdSequence,
    config: HarborConfig,
    tick: u64,
}

impl FleetMonitor {
    /// Monitor over the seed fleet, with the configured initial rules.
    pub fn new(config: HarborConfig) -> Result<Self> {
        Self::with_roster(seed_fleet(), config)
    }

    /// Monitor over a caller-supplied roster.
    ///
    /// Units are normalized into bounds. Fails if the configuration is
    /// invalid, the roster repeats an id, or an initial rule does not validate.
    pub fn with_roster(roster: Vec<EquipmentUnit>, config: HarborConfig) -> Result<Self> {
        config.validate()?;
        let roster: Vec<EquipmentUnit> =
            roster.into_iter().map(EquipmentUnit::normalized).collect();

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = roster.iter().find(|u| !seen.insert(u.id.as_str())) {
            return Err(HarborError::internal(format!(
                "duplicate equipment id '{}' in roster",
                dup.id
            )));
        }

        let rng = match config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut monitor = Self {
            roster,
            rules: Vec::new(),
            feed: NotificationFeed::new(config.notifications.capacity),
            filter: EquipmentFilter::All,
            rng,
            ids: IdSequence::new(),
            tick: 0,
            config,
        };

        let initial = monitor.config.rules.initial.clone();
        for raw in initial {
            monitor.create_alert_rule_raw(raw)?;
        }

        info!(
            units = monitor.roster.len(),
            rules = monitor.rules.len(),
            seeded = monitor.config.simulation.seed.is_some(),
            "fleet monitor ready"
        );
        Ok(monitor)
    }

    pub fn config(&self) -> &HarborConfig {
        &self.config
    }

    /// Ticks completed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn roster(&self) -> &[EquipmentUnit] {
        &self.roster
    }

    pub fn unit(&self, id: &str) -> Option<&EquipmentUnit> {
        self.roster.iter().find(|u| u.id == id)
    }

    /// Notifications, newest first.
    pub fn notifications(&self) -> Vec<NotificationItem> {
        self.feed.items()
    }

    /// Remove a notification. Unknown ids are ignored.
    pub fn dismiss_notification(&mut self, id: &str) -> bool {
        let removed = self.feed.dismiss(id);
        if removed {
            debug!(notification_id = id, "notification dismissed");
        }
        removed
    }

    /// Drop notifications older than the configured display time.
    pub fn expire_notifications(&mut self, now: DateTime<Utc>) -> usize {
        match self.config.notifications.display_duration() {
            Some(ttl) => self.feed.expire(now, ttl),
            None => 0,
        }
    }

    pub fn alert_rules(&self) -> &[AlertRule] {
        &self.rules
    }

    /// Validate a definition and add it as an enabled rule with a fresh id and
    /// empty membership.
    ///
    /// When the definition has no label, fleet-wide rules are labelled
    /// "All Equipment" and single-unit rules use the unit's name, or its id
    /// if the unit is unknown.
    pub fn create_alert_rule(&mut self, definition: RuleDefinition) -> Result<AlertRule> {
        definition.validate().inspect_err(|e| {
            warn!(error = %e, "rejected alert rule definition");
        })?;

        let label = definition
            .target_label
            .clone()
            .unwrap_or_else(|| self.resolve_label(&definition.target));
        let id = self.ids.next_id("alert", Utc::now());
        let rule = AlertRule::new(id, definition, label);

        info!(rule_id = %rule.id, rule = %rule.description(), "alert rule created");
        self.rules.push(rule.clone());
        Ok(rule)
    }

    /// Validate a loosely typed definition, then create the rule.
    pub fn create_alert_rule_raw(&mut self, raw: RawRuleDefinition) -> Result<AlertRule> {
        let definition = RuleDefinition::try_from(raw).inspect_err(|e| {
            warn!(error = %e, "rejected alert rule definition");
        })?;
        self.create_alert_rule(definition)
    }

    /// Remove a rule. Unknown ids are ignored.
    pub fn delete_alert_rule(&mut self, id: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.id != id);
        let removed = self.rules.len() != before;
        if removed {
            info!(rule_id = id, "alert rule deleted");
        }
        removed
    }

    /// Flip a rule's enabled flag, returning the new state, or `None` for an
    /// unknown id.
    pub fn toggle_alert_rule(&mut self, id: &str) -> Option<bool> {
        let reset_on_enable = self.config.rules.reset_membership_on_enable;
        let rule = self.rules.iter_mut().find(|r| r.id == id)?;
        rule.enabled = !rule.enabled;
        if rule.enabled && reset_on_enable {
            rule.triggered_members.clear();
        }
        info!(rule_id = id, enabled = rule.enabled, "alert rule toggled");
        Some(rule.enabled)
    }

    pub fn filter(&self) -> EquipmentFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: EquipmentFilter) {
        self.filter = filter;
    }

    /// Roster restricted to the current filter.
    pub fn filtered_roster(&self) -> Vec<EquipmentUnit> {
        filter_roster(&self.roster, self.filter)
    }

    /// Acknowledge a failed unit, returning it to `Operational`.
    ///
    /// Returns false unless the unit exists and is in `Error`. No notification
    /// is emitted.
    pub fn reset_unit(&mut self, id: &str) -> bool {
        match self.roster.iter_mut().find(|u| u.id == id) {
            Some(unit) if unit.health == HealthStatus::Error => {
                unit.health = HealthStatus::Operational;
                info!(unit_id = id, "unit reset to operational");
                true
            }
            _ => false,
        }
    }

    pub fn summary(&self) -> FleetSummary {
        FleetSummary::from_roster(&self.roster)
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            tick: self.tick,
            taken_at: Utc::now(),
            roster: self.roster.clone(),
            notifications: self.feed.items(),
            rules: self.rules.clone(),
            filter: self.filter,
            summary: self.summary(),
        }
    }

    /// Run one simulated tick stamped with the current time.
    pub fn tick(&mut self) -> TickReport {
        self.tick_at(Utc::now())
    }

    /// Run one simulated tick stamped with `now`.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> TickReport {
        let next = simulate_tick(&self.roster, &self.config.simulation, &mut self.rng);
        self.apply_roster(next, now)
    }

    /// Run detection, rule evaluation and publication against `next`, then
    /// make it the current roster. Units are normalized into bounds first.
    pub fn apply_roster(&mut self, next: Vec<EquipmentUnit>, now: DateTime<Utc>) -> TickReport {
        let next: Vec<EquipmentUnit> = next.into_iter().map(EquipmentUnit::normalized).collect();
        self.tick += 1;

        let mut notifications = detect_escalations(&self.roster, &next, &mut self.ids, now);
        let escalations = notifications.len();

        let evaluation = evaluate_rules(&self.rules, &next, &mut self.ids, now);
        let rule_triggers = evaluation.notifications.len();
        notifications.extend(evaluation.notifications);

        self.rules = evaluation.rules;
        self.feed.publish(notifications.clone());
        self.roster = next;

        debug!(
            tick = self.tick,
            escalations,
            rule_triggers,
            feed = self.feed.len(),
            "tick complete"
        );

        TickReport {
            tick: self.tick,
            escalations,
            rule_triggers,
            notifications,
        }
    }

    fn resolve_label(&self, target: &RuleTarget) -> String {
        match target {
            RuleTarget::All => ALL_TARGET_LABEL.to_string(),
            RuleTarget::Unit(id) => self
                .unit(id)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| id.clone()),
        }
    }
}
