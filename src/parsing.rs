//! Kubernetes resource quantity parsing.

// (suffix, units per millicore)
const CPU_SUFFIXES: &[(&str, u64)] = &[
    ("n", 1_000_000),
    ("u", 1_000),
    ("m", 1),
];

// Binary suffixes must be tried before their one-letter decimal prefixes.
const MEMORY_SUFFIXES: &[(&str, f64)] = &[
    ("Ki", 1024.0),
    ("Mi", 1_048_576.0),
    ("Gi", 1_073_741_824.0),
    ("Ti", 1_099_511_627_776.0),
    ("Pi", 1_125_899_906_842_624.0),
    ("Ei", 1_152_921_504_606_846_976.0),
    ("k", 1e3),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
    ("m", 1e-3),
];

/// Parses a CPU quantity (`250m`, `1.5`, `123456789n`) into whole millicores.
/// Sub-millicore remainders are truncated.
pub fn parse_cpu_to_millicores(q: &str) -> Option<u64> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }
    for (suffix, divisor) in CPU_SUFFIXES {
        if let Some(stripped) = q.strip_suffix(suffix) {
            if let Ok(v) = stripped.parse::<u128>() {
                return u64::try_from(v / u128::from(*divisor)).ok();
            }
            return non_negative(stripped).map(|v| (v / *divisor as f64) as u64);
        }
    }
    // plain cores
    non_negative(q).map(|cores| (cores * 1000.0).round() as u64)
}

/// Parses a memory quantity (`512Mi`, `1G`, `1048576`) into bytes.
pub fn parse_memory_to_bytes(q: &str) -> Option<u64> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }
    if let Ok(bytes) = q.parse::<u64>() {
        return Some(bytes);
    }
    for (suffix, multiplier) in MEMORY_SUFFIXES {
        if let Some(stripped) = q.strip_suffix(suffix) {
            return non_negative(stripped).and_then(|v| whole_bytes(v * multiplier));
        }
    }
    // exponent notation, e.g. 129e6
    non_negative(q).and_then(whole_bytes)
}

/// `None` when the rounded value does not fit in a u64.
fn whole_bytes(v: f64) -> Option<u64> {
    let rounded = v.round();
    (rounded < u64::MAX as f64).then_some(rounded as u64)
}

fn non_negative(s: &str) -> Option<f64> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu_to_millicores() {
        // Test nanocores
        assert_eq!(parse_cpu_to_millicores("1000000000n"), Some(1000));
        assert_eq!(parse_cpu_to_millicores("850123456n"), Some(850));

        // Test microcores
        assert_eq!(parse_cpu_to_millicores("1000000u"), Some(1000));
        assert_eq!(parse_cpu_to_millicores("500000u"), Some(500));

        // Test millicores
        assert_eq!(parse_cpu_to_millicores("100m"), Some(100));
        assert_eq!(parse_cpu_to_millicores("1500m"), Some(1500));

        // Test cores
        assert_eq!(parse_cpu_to_millicores("1"), Some(1000));
        assert_eq!(parse_cpu_to_millicores("0.5"), Some(500));
        assert_eq!(parse_cpu_to_millicores("2.5"), Some(2500));

        // Test invalid inputs
        assert_eq!(parse_cpu_to_millicores(""), None);
        assert_eq!(parse_cpu_to_millicores("invalid"), None);
        assert_eq!(parse_cpu_to_millicores("100x"), None);
        assert_eq!(parse_cpu_to_millicores("-1"), None);
        assert_eq!(parse_cpu_to_millicores("-100m"), None);
    }

    #[test]
    fn test_parse_memory_to_bytes() {
        // Test binary units
        assert_eq!(parse_memory_to_bytes("1Ki"), Some(1024));
        assert_eq!(parse_memory_to_bytes("1Mi"), Some(1024 * 1024));
        assert_eq!(parse_memory_to_bytes("1Gi"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_memory_to_bytes("2.5Mi"), Some(2_621_440));

        // Test decimal units
        assert_eq!(parse_memory_to_bytes("1K"), Some(1000));
        assert_eq!(parse_memory_to_bytes("1k"), Some(1000));
        assert_eq!(parse_memory_to_bytes("1M"), Some(1_000_000));
        assert_eq!(parse_memory_to_bytes("8G"), Some(8_000_000_000));

        // Test plain bytes and exponent form
        assert_eq!(parse_memory_to_bytes("1024"), Some(1024));
        assert_eq!(parse_memory_to_bytes("129e6"), Some(129_000_000));

        // Test invalid inputs
        assert_eq!(parse_memory_to_bytes(""), None);
        assert_eq!(parse_memory_to_bytes("invalid"), None);
        assert_eq!(parse_memory_to_bytes("100X"), None);
        assert_eq!(parse_memory_to_bytes("-5Mi"), None);
    }

    #[test]
    fn test_parse_memory_milli_suffix() {
        assert_eq!(parse_memory_to_bytes("2000m"), Some(2));
        assert_eq!(parse_memory_to_bytes("1500m"), Some(2));
        assert_eq!(parse_memory_to_bytes("8000000000000m"), Some(8_000_000_000));
        assert_eq!(parse_memory_to_bytes("1Mi"), Some(1_048_576));
    }

    #[test]
    fn test_parse_memory_overflow_is_rejected() {
        assert_eq!(parse_memory_to_bytes("20E"), None);
        assert_eq!(parse_memory_to_bytes("16Ei"), None);
        assert_eq!(parse_memory_to_bytes("1e30"), None);
        assert_eq!(parse_memory_to_bytes("15Ei"), Some(15 * 1_152_921_504_606_846_976));
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(parse_cpu_to_millicores("  100m  "), Some(100));
        assert_eq!(parse_memory_to_bytes("\t1Gi\n"), Some(1024 * 1024 * 1024));
    }
}
