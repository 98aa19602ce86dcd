//! The conversation engine
//!
//! `machine` is the pure transition function; `engine` wraps it with the
//! load-transition-persist cycle and effect execution; `state_store`
//! holds the durable per-user state; `commit` finalizes semesters;
//! `replies` owns the outbound copy.

pub mod commit;
pub mod engine;
pub mod machine;
pub mod replies;
pub mod state_store;

pub use engine::{ChatEngine, EngineOutcome};
pub use machine::{classify_text, transition, Effect, Input, OcrOutcome, SemesterSource, Transition};
pub use state_store::StateStore;
