/// Build stamp embedded by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_status: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn current() -> BuildInfo {
    BuildInfo {
        version: VERSION,
        git_hash: option_env!("FUNNEL_CORE_BUILD_HASH").unwrap_or("unknown"),
        git_status: option_env!("FUNNEL_CORE_BUILD_STATUS").unwrap_or("unknown"),
        timestamp: option_env!("FUNNEL_CORE_BUILD_TIMESTAMP").unwrap_or("unknown"),
        target: option_env!("FUNNEL_CORE_BUILD_TARGET").unwrap_or("unknown"),
        profile: option_env!("FUNNEL_CORE_BUILD_PROFILE").unwrap_or("unknown"),
        rustc: option_env!("FUNNEL_CORE_BUILD_RUSTC").unwrap_or("unknown"),
    }
}

impl BuildInfo {
    /// `v0.0.1 (abc1234, release)` with a `+dirty` marker for modified trees.
    pub fn short(&self) -> String {
        let dirty = if self.git_status == "dirty" { "+dirty" } else { "" };
        format!("v{} ({}{}, {})", self.version, self.git_hash, dirty, self.profile)
    }
}
