// build.rs - TOML-driven generation of compile-time limits
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    batch_processing: BatchProcessingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    max_record_count: usize,
    max_field_length: usize,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_files_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_events_per_file: usize,
    max_log_message_length: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ACCIDENT_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=ACCIDENT_CONFIG_DIR");

    let profile =
        env::var("ACCIDENT_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("ACCIDENT_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the accident_analyzer directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_RECORDS: usize = 10_000_000;
    const ABSOLUTE_MAX_WORKER_THREADS: usize = 256;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("LIMITS: max_file_size exceeds absolute maximum");
    }

    if config.file_processing.max_record_count > ABSOLUTE_MAX_RECORDS {
        panic!("LIMITS: max_record_count exceeds absolute maximum");
    }

    if config.file_processing.max_record_count == 0 {
        panic!("LIMITS: max_record_count must be at least 1");
    }

    if config.batch_processing.max_worker_threads == 0
        || config.batch_processing.max_worker_threads > ABSOLUTE_MAX_WORKER_THREADS
    {
        panic!(
            "LIMITS: max_worker_threads must be between 1 and {}",
            ABSOLUTE_MAX_WORKER_THREADS
        );
    }

    if profile == "production" {
        if config.file_processing.max_file_size > 100_000_000 {
            panic!("PRODUCTION: max_file_size too high for production");
        }
        if config.logging.max_log_events_per_file > 10_000 {
            panic!("PRODUCTION: max_log_events_per_file too high for production");
        }
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub const BUILD_PROFILE: &str = "{}";

    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const MAX_RECORD_COUNT: usize = {};
        pub const MAX_FIELD_LENGTH: usize = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_FILES_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
    }}
}}
"#,
        profile,
        profile,
        // File Processing
        config.file_processing.max_file_size,
        config.file_processing.max_record_count,
        config.file_processing.max_field_length,
        // Batch Processing
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_files_per_batch,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_events_per_file,
        config.logging.max_log_message_length,
    );

    fs::write(output_path, constants_code).unwrap();
}
