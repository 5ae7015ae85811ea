use serde::{Deserialize, Serialize};
use std::fmt;

/// Accumulating set of attribute status flags.
///
/// Flags can be added but never removed: a failure recorded by one check
/// survives any later check on the same attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeStatus(u8);

impl AttributeStatus {
    pub const PASSED:           AttributeStatus = AttributeStatus(0);
    pub const FAILED_SMART:     AttributeStatus = AttributeStatus(1);
    pub const WARNING_SCRUTINY: AttributeStatus = AttributeStatus(2);
    pub const FAILED_SCRUTINY:  AttributeStatus = AttributeStatus(4);

    const ALL: u8 = 1 | 2 | 4;

    /// Rebuild from a stored integer. Unknown bits are dropped.
    pub fn from_bits(bits: i64) -> Self {
        AttributeStatus((bits & Self::ALL as i64) as u8)
    }

    pub fn bits(&self) -> u8 { self.0 }

    /// Union `flag` into the set.
    pub fn set(&mut self, flag: AttributeStatus) {
        self.0 |= flag.0;
    }

    pub fn has(&self, flag: AttributeStatus) -> bool {
        flag.0 != 0 && self.0 & flag.0 == flag.0
    }

    pub fn is_passed(&self) -> bool { self.0 == 0 }

    pub fn is_failed(&self) -> bool {
        self.has(Self::FAILED_SMART) || self.has(Self::FAILED_SCRUTINY)
    }

    pub fn label(&self) -> &'static str {
        if self.is_failed() { "FAIL" }
        else if self.has(Self::WARNING_SCRUTINY) { "WARN" }
        else { "PASS" }
    }
}

impl std::ops::BitOr for AttributeStatus {
    type Output = AttributeStatus;
    fn bitor(self, rhs: AttributeStatus) -> AttributeStatus {
        AttributeStatus(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for AttributeStatus {
    fn bitor_assign(&mut self, rhs: AttributeStatus) { self.set(rhs) }
}

/// Vendor telemetry family an attribute was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeFamily {
    /// ATA/SATA SMART table (HDD and SATA SSD).
    Ata,
    #[default]
    Nvme,
    Scsi,
}

impl AttributeFamily {
    pub fn label(&self) -> &'static str {
        match self {
            AttributeFamily::Ata  => "ata",
            AttributeFamily::Nvme => "nvme",
            AttributeFamily::Scsi => "scsi",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ata" | "sata" | "smart" => Some(AttributeFamily::Ata),
            "nvme"                   => Some(AttributeFamily::Nvme),
            "scsi" | "sas"           => Some(AttributeFamily::Scsi),
            _                        => None,
        }
    }
}

impl fmt::Display for AttributeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which side of the threshold is healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ideal {
    /// Healthy values stay at or below the threshold.
    Low,
    /// Healthy values stay at or above the threshold.
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    pub display_name: String,
    pub ideal:        Ideal,
    #[serde(default)]
    pub critical:     bool,
}

/// A raw `{id, value, threshold}` reading as handed over by a collector.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttributeRecord {
    #[serde(alias = "attribute_id")]
    pub id:        String,
    pub value:     i64,
    #[serde(alias = "thresh", default = "no_threshold")]
    pub threshold: i64,
}

fn no_threshold() -> i64 { Attribute::NO_THRESHOLD }

impl AttributeRecord {
    pub fn into_attribute(self, family: AttributeFamily) -> Attribute {
        Attribute::new(family, self.id, self.value, self.threshold)
    }
}

/// One telemetry attribute of a device, plus the verdict derived for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(default)]
    pub family:            AttributeFamily,
    #[serde(rename = "attribute_id")]
    pub id:                String,
    pub value:             i64,
    /// -1 means the attribute has no threshold.
    #[serde(rename = "thresh")]
    pub threshold:         i64,

    #[serde(default)]
    pub transformed_value: i64,
    #[serde(default)]
    pub status:            AttributeStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status_reason:     String,
    #[serde(default)]
    pub failure_rate:      f64,
}

impl Attribute {
    pub const NO_THRESHOLD: i64 = -1;

    pub fn new(family: AttributeFamily, id: impl Into<String>, value: i64, threshold: i64) -> Self {
        Self {
            family,
            id:                id.into(),
            value,
            threshold,
            transformed_value: value,
            status:            AttributeStatus::PASSED,
            status_reason:     String::new(),
            failure_rate:      0.0,
        }
    }

    pub fn has_threshold(&self) -> bool { self.threshold != Self::NO_THRESHOLD }

    /// Record a failing verdict. Prior flags and reasons are kept; a reason
    /// already present is not appended again.
    pub fn mark(&mut self, flag: AttributeStatus, reason: &str) {
        self.status.set(flag);
        if reason.is_empty() || self.status_reason.split("; ").any(|r| r == reason) {
            return;
        }
        if !self.status_reason.is_empty() {
            self.status_reason.push_str("; ");
        }
        self.status_reason.push_str(reason);
    }
}
