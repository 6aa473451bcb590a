pub mod conversation_lock;
pub mod engagement;
pub mod extract;
pub mod turn;

pub use turn::{run_turn, TurnError, TurnOutcome, TurnRequest};
