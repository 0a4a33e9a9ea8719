pub mod fs_atomic;
pub mod logging;
pub mod time;

pub use fs_atomic::atomic_write_file;
pub use logging::{append_json_log, EventLog, LogLevel};
pub use time::{file_stamp, now_rfc3339, readable_stamp};
