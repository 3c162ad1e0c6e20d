//! Position evaluation and the distance oracle it is built on.

pub mod distance;
pub mod position;
pub mod threat;

pub use distance::{distance, nearest_unclaimed, nearest_unclaimed_any};
pub use position::{evaluate, evaluate_posture, is_chokepoint, CHOKEPOINTS};
pub use threat::{
    can_support_move, is_island_power, naval_bias, needs_convoy_fleets, province_defense,
    province_threat, province_threat2, unit_can_reach, unit_connectivity,
};
