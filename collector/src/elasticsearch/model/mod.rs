//! Wire models of the statistics endpoints.
//!
//! Every field defaults when missing so that responses of different server versions decode.

mod aliases;
mod cluster_health;
mod indices;
mod nodes;
mod recovery;
mod tasks;

pub use aliases::*;
pub use cluster_health::*;
pub use indices::*;
pub use nodes::*;
pub use recovery::*;
pub use tasks::*;
