//! Configuration module for the accident analyzer
//! Uses constants generated from the TOML profile plus runtime preferences

// Generated at compile time by build.rs from config/<profile>.toml
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        super::compile_time::BUILD_PROFILE
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("ACCIDENT_CONFIG_DIR").unwrap_or("config")
    }

    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}
