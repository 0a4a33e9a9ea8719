use chrono::Local;

pub fn now_rfc3339() -> String {
    Local::now().to_rfc3339()
}

/// `20240101_000000`, safe for file names.
pub fn file_stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn readable_stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
