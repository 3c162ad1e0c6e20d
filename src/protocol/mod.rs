//! Wire formats and the command line protocol.
//!
//! DFEN encodes a position on one line, DSON encodes orders, and the parser
//! reads the commands the engine binary answers.

pub mod dfen;
pub mod dson;
pub mod parser;

pub use dfen::{encode_dfen, parse_dfen, DfenError, INITIAL_DFEN};
pub use dson::{
    format_build, format_order, format_orders, format_retreat, parse_build, parse_order,
    parse_orders, parse_retreat, DsonError,
};
pub use parser::{parse_command, Command, GoParams};
