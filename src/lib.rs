pub mod hosting;
pub mod ledger;
pub mod notify;
pub mod room;
pub mod session;
pub mod store;

pub type Coins = u64;
pub type UserId = u64;
pub type SessionId = u64;
pub type ConnId = u64;

/// Initializes the process-wide logger.
/// Safe to call more than once; later calls are ignored.
pub fn logging() {
    use simplelog::ColorChoice;
    use simplelog::LevelFilter;
    use simplelog::TermLogger;
    use simplelog::TerminalMode;
    TermLogger::init(
        LevelFilter::Info,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .ok();
}
