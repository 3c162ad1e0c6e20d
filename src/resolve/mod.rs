//! Rules engine: validation, adjudication and phase sequencing.

pub mod build;
pub mod kruijswijk;
pub mod phase;
pub mod retreat;
pub mod validate;

pub use build::{apply_builds, resolve_builds, BuildResult};
pub use kruijswijk::{
    apply_resolution, resolve_orders, Dislodgement, Outcome, ResolvedOrder, Resolver,
};
pub use phase::{advance_state, is_game_over, needs_build_phase, next_phase, update_sc_ownership};
pub use retreat::{apply_retreats, resolve_retreats, RetreatResult};
pub use validate::{
    can_be_convoyed, validate_and_default, validate_build, validate_order, validate_retreat,
    OrderError,
};
