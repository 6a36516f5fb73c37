//! Domain types for LevDesk.

pub mod coin;
pub mod position;
pub mod session;

pub use coin::{CoinInfo, CoinMap};
pub use position::{Direction, InvalidPosition, Position};
pub use session::Session;
