//! Tick simulator: produces the next roster from the current one.
//!
//! Per unit, draws happen in a fixed order (utilization, x, y, then health
//! when the unit is not in `Error`), so a scripted [`RandomSource`] yields an
//! exact tick.

use harbor_config::SimulationConfig;
use harbor_core::types::{
    EquipmentUnit, HealthStatus, MAP_MAX_X, MAP_MAX_Y, MAP_MIN, Position, UTILIZATION_MAX,
    UTILIZATION_MIN, round_to,
};

use crate::random::RandomSource;

/// Produce the next roster. Order and ids are preserved.
pub fn simulate_tick<R: RandomSource + ?Sized>(
    roster: &[EquipmentUnit],
    config: &SimulationConfig,
    rng: &mut R,
) -> Vec<EquipmentUnit> {
    roster
        .iter()
        .map(|unit| simulate_unit(unit, config, rng))
        .collect()
}

fn simulate_unit<R: RandomSource + ?Sized>(
    unit: &EquipmentUnit,
    config: &SimulationConfig,
    rng: &mut R,
) -> EquipmentUnit {
    let u_jitter = config.utilization_jitter;
    let p_jitter = config.position_jitter;

    let utilization = round_to(
        (unit.utilization + rng.uniform(-u_jitter, u_jitter)).clamp(UTILIZATION_MIN, UTILIZATION_MAX),
        1,
    );
    let x = round_to(
        (unit.position.x + rng.uniform(-p_jitter, p_jitter)).clamp(MAP_MIN, MAP_MAX_X),
        2,
    );
    let y = round_to(
        (unit.position.y + rng.uniform(-p_jitter, p_jitter)).clamp(MAP_MIN, MAP_MAX_Y),
        2,
    );

    let health = next_health(unit.health, config, rng);

    EquipmentUnit {
        position: Position::new(x, y),
        utilization: if health == HealthStatus::Error {
            0.0
        } else {
            utilization
        },
        health,
        ..unit.clone()
    }
}

/// Health transition for one tick. `Error` is terminal.
fn next_health<R: RandomSource + ?Sized>(
    current: HealthStatus,
    config: &SimulationConfig,
    rng: &mut R,
) -> HealthStatus {
    if current == HealthStatus::Error {
        return current;
    }

    let r = rng.unit();
    if r < config.error_probability {
        HealthStatus::Error
    } else if r < config.warning_probability {
        HealthStatus::Warning
    } else if current == HealthStatus::Warning && r > config.recovery_threshold {
        HealthStatus::Operational
    } else {
        current
    }
}
