mod action;
mod command;
mod event;
mod hub;
mod room;
mod toss;

pub use action::*;
pub use command::*;
pub use event::*;
pub use hub::*;
pub use room::*;
pub use toss::*;
