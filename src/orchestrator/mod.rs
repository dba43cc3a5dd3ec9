//! Scene transitions: planning, deferred continuations and the director state machine.

pub mod director;
pub mod events;
pub mod plan;
pub mod scheduler;
