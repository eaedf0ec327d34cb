//! Code-tagged logging macros accepting `"key" => value` context pairs
//!
//! Context values may be any `Display` type. An optional `location = ...`
//! argument attaches a `CellLocation` to error, warning and debug events.

// ============================================================================
// ERROR
// ============================================================================

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, location = $location:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($location), vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_error_with_context($code, $message, None, context_refs)
        }
    };

    ($code:expr, $message:expr, location = $location:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_error_with_context($code, $message, Some($location), context_refs)
        }
    };
}

// ============================================================================
// WARNING
// ============================================================================

#[macro_export]
macro_rules! log_warning {
    ($code:expr, $message:expr) => {
        $crate::logging::log_warning_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, location = $location:expr) => {
        $crate::logging::log_warning_with_context($code, $message, Some($location), vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_warning_with_context($code, $message, None, context_refs)
        }
    };

    ($code:expr, $message:expr, location = $location:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_warning_with_context($code, $message, Some($location), context_refs)
        }
    };
}

// ============================================================================
// SUCCESS / INFO
// ============================================================================

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, $message, vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_success_with_context($code, $message, context_refs)
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_info_with_context($message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_info_with_context($message, context_refs)
        }
    };
}

// ============================================================================
// DEBUG
// ============================================================================

/// Skips formatting entirely unless debug output is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::log_debug_with_context($message, None, vec![])
        }
    };

    ($message:expr, location = $location:expr) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::log_debug_with_context($message, Some($location), vec![])
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::debug_enabled() {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_debug_with_context($message, None, context_refs)
        }
    };

    ($message:expr, location = $location:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::debug_enabled() {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_debug_with_context($message, Some($location), context_refs)
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;
    use crate::utils::CellLocation;

    #[test]
    fn test_macros_accept_all_forms() {
        let _ = crate::logging::init_global_logging();
        let row = 3usize;

        log_error!(codes::system::INTERNAL_ERROR, "plain");
        log_error!(
            codes::format::FORMAT_VIOLATION,
            "with location",
            location = CellLocation::new(row, 1)
        );
        log_error!(codes::format::FORMAT_VIOLATION, "with context", "row" => row);
        log_warning!(
            codes::symbols::DUPLICATE_IDENTIFIER,
            "both",
            location = CellLocation::row_only(row),
            "identifier" => "ACC-2024-000001",
            "row" => row
        );
        log_success!(codes::success::REPORT_GENERATED, "done", "status" => "success");
        log_info!("info", "count" => 4);
        log_debug!("debug", "count" => 4);
        log_debug!("debug at", location = CellLocation::start());
    }
}
