pub mod backend;
pub mod turn;

pub use backend::*;
pub use turn::{ConversationTurn, Role};
