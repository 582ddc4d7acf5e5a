//! Human-readable file sizes.

const ONE_KB: u64 = 1024;
const ONE_MB: u64 = 1024 * 1024;
const ONE_GB: u64 = 1024 * 1024 * 1024;

/// Largest size still shown in kilobytes.
const KB_LIMIT: u64 = 500_000;

/// Largest size still shown in megabytes.
const MB_LIMIT: u64 = 500_000_000;

/// Formats a byte count with two decimals in the largest sensible unit.
///
/// | bytes                        | unit  |
/// |------------------------------|-------|
/// | 0 ..= 1023                   | Bytes |
/// | 1024 ..= 500 000             | KB    |
/// | 500 001 ..= 500 000 000      | MB    |
/// | above 500 000 000            | GB    |
pub fn format_size(bytes: u64) -> String {
    if bytes > MB_LIMIT {
        format!("{:.2} GB", bytes as f64 / ONE_GB as f64)
    } else if bytes > KB_LIMIT {
        format!("{:.2} MB", bytes as f64 / ONE_MB as f64)
    } else if bytes >= ONE_KB {
        format!("{:.2} KB", bytes as f64 / ONE_KB as f64)
    } else {
        format!("{bytes} Bytes")
    }
}
