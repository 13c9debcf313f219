// build.rs - TOML-driven compile-time constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    scanning: ScanningLimits,
    aggregates: AggregateLimits,
    expression: ExpressionLimits,
    having: HavingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    large_file_threshold: u64,
    max_line_count_for_analysis: usize,
}

#[derive(serde::Deserialize)]
struct ScanningLimits {
    max_section_text_length: usize,
    max_sigma_lines: usize,
}

#[derive(serde::Deserialize)]
struct AggregateLimits {
    max_aggregate_count: usize,
    max_identifier_length: usize,
}

#[derive(serde::Deserialize)]
struct ExpressionLimits {
    max_nesting_depth: usize,
    max_string_length: usize,
}

#[derive(serde::Deserialize)]
struct HavingLimits {
    max_or_blocks: usize,
    max_conditions_per_block: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PHI_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=PHI_CONFIG_DIR");

    let profile = env::var("PHI_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("PHI_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of phi_compiler directory)
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

    validate_security_constraints(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_security_constraints(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_NESTING_DEPTH: usize = 10_000;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("SECURITY: max_file_size exceeds absolute maximum");
    }

    if config.expression.max_nesting_depth > ABSOLUTE_MAX_NESTING_DEPTH {
        panic!("SECURITY: max_nesting_depth exceeds absolute maximum");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if profile == "production" && config.file_processing.max_file_size > 50_000_000 {
        panic!("PRODUCTION: max_file_size too high for production");
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
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const LARGE_FILE_THRESHOLD: u64 = {};
        pub const MAX_LINE_COUNT_FOR_ANALYSIS: usize = {};
    }}

    pub mod scanning {{
        pub const MAX_SECTION_TEXT_LENGTH: usize = {};
        pub const MAX_SIGMA_LINES: usize = {};
    }}

    pub mod aggregates {{
        pub const MAX_AGGREGATE_COUNT: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
    }}

    pub mod expression {{
        pub const MAX_NESTING_DEPTH: usize = {};
        pub const MAX_STRING_LENGTH: usize = {};
    }}

    pub mod having {{
        pub const MAX_OR_BLOCKS: usize = {};
        pub const MAX_CONDITIONS_PER_BLOCK: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        // File processing
        config.file_processing.max_file_size,
        config.file_processing.large_file_threshold,
        config.file_processing.max_line_count_for_analysis,
        // Scanning
        config.scanning.max_section_text_length,
        config.scanning.max_sigma_lines,
        // Aggregates
        config.aggregates.max_aggregate_count,
        config.aggregates.max_identifier_length,
        // Expression
        config.expression.max_nesting_depth,
        config.expression.max_string_length,
        // Having
        config.having.max_or_blocks,
        config.having.max_conditions_per_block,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_file,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
