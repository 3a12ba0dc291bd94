use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "hfscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory.
/// Platform data dir (e.g. ~/.local/share/hfscan), or ./hfscan when the
/// platform reports none.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Log filter used when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "hfscan_lib=info,hfscan=info"
}
