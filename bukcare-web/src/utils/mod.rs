pub mod jwt;
pub mod time_ago;

pub use time_ago::format_time_ago;
