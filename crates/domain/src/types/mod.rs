//! Domain types and response contracts

pub mod activity;
pub mod enhance;
pub mod environment;
pub mod input;
pub mod job;
pub mod maps;
pub mod product;
pub mod sources;
pub mod submission;

pub use activity::*;
pub use enhance::*;
pub use environment::*;
pub use input::*;
pub use job::*;
pub use maps::*;
pub use product::*;
pub use sources::*;
pub use submission::*;
