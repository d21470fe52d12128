mod inbox;
mod notifier;

pub use inbox::*;
pub use notifier::*;
