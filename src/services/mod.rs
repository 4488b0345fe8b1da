pub mod ai;
pub mod calc;
pub mod conversation;
pub mod dispatch;
pub mod extract;
pub mod gate;
pub mod nldate;
pub mod normalize;
