use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a node in a pool's topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VdevType {
    Disk,
    Mirror,
    Raidz1,
    Raidz2,
    Raidz3,
    Draid1,
    Draid2,
    Draid3,
    Spare,
    Log,
    Cache,
    Special,
    Dedup,
}

impl VdevType {
    pub fn label(&self) -> &'static str {
        match self {
            VdevType::Disk    => "disk",
            VdevType::Mirror  => "mirror",
            VdevType::Raidz1  => "raidz1",
            VdevType::Raidz2  => "raidz2",
            VdevType::Raidz3  => "raidz3",
            VdevType::Draid1  => "draid1",
            VdevType::Draid2  => "draid2",
            VdevType::Draid3  => "draid3",
            VdevType::Spare   => "spare",
            VdevType::Log     => "log",
            VdevType::Cache   => "cache",
            VdevType::Special => "special",
            VdevType::Dedup   => "dedup",
        }
    }

    /// True for physical leaves; everything else only groups other vdevs.
    pub fn is_leaf(&self) -> bool { *self == VdevType::Disk }
}

/// One node of the vdev tree as printed under `config:`.
///
/// Error counters are the node's own, never pre-summed over children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vdev {
    pub name:            String,
    #[serde(rename = "type")]
    pub vdev_type:       VdevType,
    pub status:          String,   // "ONLINE", "DEGRADED", "AVAIL", ...
    /// Resolved device node. Only set on Disk vdevs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path:            Option<String>,
    pub read_errors:     u64,
    pub write_errors:    u64,
    pub checksum_errors: u64,
    /// Trailing text after the counters, e.g. "cannot open" or "(resilvering)".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note:            Option<String>,
    #[serde(default)]
    pub children:        Vec<Vdev>,
}

impl Vdev {
    pub fn new(name: impl Into<String>, vdev_type: VdevType) -> Self {
        Self {
            name:            name.into(),
            vdev_type,
            status:          String::new(),
            path:            None,
            read_errors:     0,
            write_errors:    0,
            checksum_errors: 0,
            note:            None,
            children:        Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.read_errors > 0 || self.write_errors > 0 || self.checksum_errors > 0
    }

    /// Depth-first walk over this node and all descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Vdev)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrubState {
    #[default]
    None,
    Scanning,
    Finished,
    Canceled,
}

impl ScrubState {
    pub fn label(&self) -> &'static str {
        match self {
            ScrubState::None     => "none",
            ScrubState::Scanning => "scanning",
            ScrubState::Finished => "finished",
            ScrubState::Canceled => "canceled",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "none"     => Some(ScrubState::None),
            "scanning" => Some(ScrubState::Scanning),
            "finished" => Some(ScrubState::Finished),
            "canceled" => Some(ScrubState::Canceled),
            _          => None,
        }
    }
}

/// One pool from a `zpool status` snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub name:   String,
    pub status: String,   // pool-level "state:" value

    pub scrub_state:            ScrubState,
    pub scrub_start_time:       Option<DateTime<Utc>>,
    pub scrub_end_time:         Option<DateTime<Utc>>,
    pub scrub_percent_complete: f64,
    pub scrub_errors_count:     u64,

    pub vdevs: Vec<Vdev>,

    pub total_read_errors:     u64,
    pub total_write_errors:    u64,
    pub total_checksum_errors: u64,

    /// Free-text "status:" advisory, when zpool printed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
    /// Free-text "action:" advice, when zpool printed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action:   Option<String>,
    /// The "errors:" summary, e.g. "No known data errors".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors:   Option<String>,
}

impl Pool {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn is_healthy(&self) -> bool { self.status == "ONLINE" }

    pub fn total_errors(&self) -> u64 {
        self.total_read_errors
            .saturating_add(self.total_write_errors)
            .saturating_add(self.total_checksum_errors)
    }

    /// Every Disk vdev in the pool, in tree order.
    pub fn disks(&self) -> Vec<&Vdev> {
        let mut out = Vec::new();
        for top in &self.vdevs {
            top.walk(&mut |v| if v.vdev_type.is_leaf() { out.push(v) });
        }
        out
    }
}
