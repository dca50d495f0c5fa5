//! Ordered tree walking with root/leaf/visit restrictions
//!
//! `TreeWalker` is a stateful cursor over any `TreeProvider`. It visits nodes
//! in pre-order (`Direction::Forward`) or reverse pre-order
//! (`Direction::Backward`) starting from an arbitrary node, and reports for
//! every visited node how it relates to the start node (`Phase`).
//!
//! Several walkers may run over the same provider at once; they share no
//! mutable state.

mod cursor;
mod phase;
mod restrictions;

pub use cursor::{Direction, TreeWalker, WalkerState};
pub use phase::Phase;
pub use restrictions::{Predicate, Restrictions};
