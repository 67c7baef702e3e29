pub mod dashboard;
pub mod table;
pub mod terminal;
pub mod utils;

pub use dashboard::render_dashboard;
pub use terminal::TerminalGuard;
