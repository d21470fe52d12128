use serde::Serialize;

/// Ten minutes per side.
pub const TIME_CONTROL: u32 = 600;

/// Seconds remaining per side, as last reported alongside a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Clock {
    pub white: u32,
    pub black: u32,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            white: TIME_CONTROL,
            black: TIME_CONTROL,
        }
    }
}
