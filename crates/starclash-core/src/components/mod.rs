//! Component definitions.
//!
//! Components are plain data. Planets live in an arena owned by the
//! engine; fleets are ECS entities. Behavior lives in `systems`.

mod common;
mod fleet;
mod planet;

pub use common::*;
pub use fleet::*;
pub use planet::*;
