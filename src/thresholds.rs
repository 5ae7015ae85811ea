use crate::models::smart::{AttributeFamily, AttributeMetadata, Ideal};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Anything that can answer "what is healthy for this attribute?".
pub trait MetadataLookup {
    fn lookup(&self, family: AttributeFamily, id: &str) -> Option<&AttributeMetadata>;
}

/// (id, display name, ideal, critical)
type Row = (&'static str, &'static str, Ideal, bool);

/// ATA thresholds apply to the normalized value, which counts down towards
/// the vendor threshold as the drive wears.
const ATA_ROWS: &[Row] = &[
    ("1",   "Raw_Read_Error_Rate",     Ideal::High, false),
    ("2",   "Throughput_Performance",  Ideal::High, false),
    ("3",   "Spin_Up_Time",            Ideal::High, false),
    ("5",   "Reallocated_Sector_Ct",   Ideal::High, true),
    ("7",   "Seek_Error_Rate",         Ideal::High, false),
    ("8",   "Seek_Time_Performance",   Ideal::High, false),
    ("9",   "Power_On_Hours",          Ideal::High, false),
    ("10",  "Spin_Retry_Count",        Ideal::High, true),
    ("12",  "Power_Cycle_Count",       Ideal::High, false),
    ("177", "Wear_Leveling_Count",     Ideal::High, false),
    ("184", "End-to-End_Error",        Ideal::High, true),
    ("187", "Reported_Uncorrect",      Ideal::High, true),
    ("188", "Command_Timeout",         Ideal::High, true),
    ("190", "Airflow_Temperature_Cel", Ideal::High, false),
    ("194", "Temperature_Celsius",     Ideal::High, false),
    ("196", "Reallocated_Event_Count", Ideal::High, true),
    ("197", "Current_Pending_Sector",  Ideal::High, true),
    ("198", "Offline_Uncorrectable",   Ideal::High, true),
    ("199", "UDMA_CRC_Error_Count",    Ideal::High, false),
    ("231", "SSD_Life_Left",           Ideal::High, false),
    ("233", "Media_Wearout_Indicator", Ideal::High, false),
];

const NVME_ROWS: &[Row] = &[
    ("critical_warning",    "Critical Warning",         Ideal::Low,  true),
    ("temperature",         "Temperature",              Ideal::Low,  false),
    ("available_spare",     "Available Spare",          Ideal::High, true),
    ("percentage_used",     "Percentage Used",          Ideal::Low,  true),
    ("media_errors",        "Media Errors",             Ideal::Low,  true),
    ("num_err_log_entries", "Error Log Entries",        Ideal::Low,  false),
];

const SCSI_ROWS: &[Row] = &[
    ("scsi_grown_defect_list",                    "Grown Defect List",                 Ideal::Low, true),
    ("read_errors_corrected_by_eccfast",          "Read Errors Corrected by ECC Fast", Ideal::Low, false),
    ("read_errors_corrected_by_eccdelayed",       "Read Errors Corrected by ECC Delay", Ideal::Low, false),
    ("read_errors_corrected_by_rereads_rewrites", "Read Errors Corrected by Rereads",  Ideal::Low, false),
    ("read_total_errors_corrected",               "Read Total Errors Corrected",       Ideal::Low, false),
    ("read_total_uncorrected_errors",             "Read Total Uncorrected Errors",     Ideal::Low, true),
    ("write_errors_corrected_by_eccfast",         "Write Errors Corrected by ECC Fast", Ideal::Low, false),
    ("write_errors_corrected_by_eccdelayed",      "Write Errors Corrected by ECC Delay", Ideal::Low, false),
    ("write_errors_corrected_by_rereads_rewrites", "Write Errors Corrected by Rewrites", Ideal::Low, false),
    ("write_total_errors_corrected",              "Write Total Errors Corrected",      Ideal::Low, false),
    ("write_total_uncorrected_errors",            "Write Total Uncorrected Errors",    Ideal::Low, true),
];

static BUILTIN: LazyLock<MetadataTable> = LazyLock::new(|| {
    let mut table = MetadataTable::default();
    for (family, rows) in [
        (AttributeFamily::Ata,  ATA_ROWS),
        (AttributeFamily::Nvme, NVME_ROWS),
        (AttributeFamily::Scsi, SCSI_ROWS),
    ] {
        for &(id, name, ideal, critical) in rows {
            table.insert(family, id, AttributeMetadata {
                display_name: name.to_string(),
                ideal,
                critical,
            });
        }
    }
    table
});

/// Per-family metadata, keyed by attribute id.
///
/// Built once at startup (built-ins plus config overrides) and only read
/// afterwards; share it by reference across workers.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    families: HashMap<AttributeFamily, HashMap<String, AttributeMetadata>>,
}

impl MetadataTable {
    /// The compiled-in tables.
    pub fn builtin() -> &'static MetadataTable {
        &BUILTIN
    }

    /// Replace or add one entry. Only used while the table is being built.
    pub fn insert(&mut self, family: AttributeFamily, id: &str, meta: AttributeMetadata) {
        self.families.entry(family).or_default().insert(id.to_string(), meta);
    }

    pub fn len(&self, family: AttributeFamily) -> usize {
        self.families.get(&family).map_or(0, |m| m.len())
    }

    pub fn ids(&self, family: AttributeFamily) -> Vec<&str> {
        let mut ids: Vec<&str> = self.families.get(&family)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }
}

impl MetadataLookup for MetadataTable {
    fn lookup(&self, family: AttributeFamily, id: &str) -> Option<&AttributeMetadata> {
        self.families.get(&family)?.get(id)
    }
}
