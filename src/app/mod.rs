//! Application orchestration: state, the event loop's handlers, the scroll
//! sampler and animator, and background jobs.

pub mod animator;
pub mod event;
pub mod handler;
pub mod preview;
pub mod sampler;
pub mod state;
pub mod worker;
