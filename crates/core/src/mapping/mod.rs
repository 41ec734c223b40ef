//! Mapping module - assigns catalog models to anchors and keeps them moving.
//!
//! The engine starts `Idle`. Once the anchor store reaches the activation
//! threshold it becomes `Active` for good, produces an initial assignment and
//! from then on is reassigned on every reshuffle tick and on every reported
//! model load failure.

mod assign;
mod mapping_engine;
mod mapping_model;

pub use assign::assign_objects;
pub use mapping_engine::{MappingEngine, DEFAULT_ACTIVATION_THRESHOLD};
pub use mapping_model::{MappingState, ObjectMapping};
