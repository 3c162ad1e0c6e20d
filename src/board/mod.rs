//! Map data and game-state value types.

pub mod adjacency;
pub mod order;
pub mod province;
pub mod state;
pub mod unit;

pub use adjacency::{adjacent_provinces, borders, edges_from, fleet_coasts_to, is_adjacent, Edge};
pub use order::{
    order_set_key, Action, Adjustment, BuildOrder, Location, Order, RetreatAction, RetreatOrder,
};
pub use province::{
    home_centers, supply_centers, Coast, Power, Province, Terrain, ALL_POWERS, ALL_PROVINCES,
    PROVINCE_COUNT, SOLO_THRESHOLD, SUPPLY_CENTER_COUNT,
};
pub use state::{Dislodged, GameState, Phase, Season};
pub use unit::{Unit, UnitKind};
