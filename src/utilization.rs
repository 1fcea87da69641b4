//! Conversion of raw usage samples into display percentages and severity tiers.

use crate::error::UtilizationError;
use crate::types::{CapacityReference, Severity, UsageSample, UtilizationResult};

/// Values strictly above this are `High`.
pub const HIGH_THRESHOLD: u64 = 80;
/// Values strictly above this (and not `High`) are `Medium`.
pub const MEDIUM_THRESHOLD: u64 = 50;

const MILLICORES_PER_UNIT: u64 = 10;

/// CPU value shown next to memory percent: one full core reads as 100.
/// This is a scaled raw number, not a share of node CPU capacity.
pub fn cpu_percent(sample: &UsageSample) -> u64 {
    sample.cpu_millicores / MILLICORES_PER_UNIT
}

/// Memory usage as a share of `capacity`.
pub fn memory_percent(
    sample: &UsageSample,
    capacity: &CapacityReference,
) -> Result<f64, UtilizationError> {
    if capacity.memory_bytes == 0 {
        return Err(UtilizationError::ZeroCapacity);
    }
    Ok(100.0 * sample.memory_bytes as f64 / capacity.memory_bytes as f64)
}

pub fn classify(value: u64) -> Severity {
    if value > HIGH_THRESHOLD {
        Severity::High
    } else if value > MEDIUM_THRESHOLD {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Worst tier of the two dimensions.
pub fn combined_indicator(cpu_value: u64, memory_value: u64) -> Severity {
    classify(cpu_value).max(classify(memory_value))
}

impl UtilizationResult {
    pub fn from_sample(
        sample: &UsageSample,
        capacity: &CapacityReference,
    ) -> Result<Self, UtilizationError> {
        let cpu = cpu_percent(sample);
        // truncated toward zero before classification
        let memory = memory_percent(sample, capacity)? as u64;
        Ok(Self {
            cpu_percent: cpu,
            memory_percent: memory,
            cpu_severity: classify(cpu),
            memory_severity: classify(memory),
            severity: combined_indicator(cpu, memory),
        })
    }
}
