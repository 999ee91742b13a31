pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const HASH: &str = match option_env!("PAYCYCLE_BUILD_HASH") {
    Some(value) => value,
    None => "unknown",
};
pub const STATUS: &str = match option_env!("PAYCYCLE_BUILD_STATUS") {
    Some(value) => value,
    None => "unknown",
};
pub const TIMESTAMP: &str = match option_env!("PAYCYCLE_BUILD_TIMESTAMP") {
    Some(value) => value,
    None => "unknown",
};
pub const PROFILE: &str = match option_env!("PAYCYCLE_BUILD_PROFILE") {
    Some(value) => value,
    None => "unknown",
};

/// One-line version banner for `paycycle_cli version`.
pub fn summary() -> String {
    format!("paycycle {VERSION} ({HASH}, {STATUS}, {PROFILE}, built {TIMESTAMP})")
}
