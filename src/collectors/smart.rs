use crate::models::smart::{Attribute, AttributeFamily};
use serde_json::Value;

/// Pull threshold-checkable attributes out of a `smartctl --json -a` document.
/// Returns None if the document carries no ATA, NVMe or SCSI health data.
pub fn read_attributes(v: &Value) -> Option<(AttributeFamily, Vec<Attribute>)> {
    if v["nvme_smart_health_information_log"].is_object() {
        return Some((AttributeFamily::Nvme, parse_nvme_health(v)));
    }
    if v["ata_smart_attributes"]["table"].is_array() {
        return Some((AttributeFamily::Ata, parse_ata_attributes(v)));
    }
    if v["scsi_grown_defect_list"].is_u64() || v["scsi_error_counter_log"].is_object() {
        return Some((AttributeFamily::Scsi, parse_scsi_counters(v)));
    }
    None
}

/// ATA rows compare the normalized value against the vendor threshold; the
/// raw counter is kept as the transformed value.
fn parse_ata_attributes(v: &Value) -> Vec<Attribute> {
    let table = match v["ata_smart_attributes"]["table"].as_array() {
        Some(t) => t,
        None    => return Vec::new(),
    };

    table.iter().filter_map(|entry| {
        let id     = entry["id"].as_u64()?;
        let value  = entry["value"].as_i64().unwrap_or(0);
        let thresh = entry["thresh"].as_i64().unwrap_or(Attribute::NO_THRESHOLD);
        let raw    = entry["raw"]["value"].as_i64().unwrap_or(0);

        let mut attr = Attribute::new(AttributeFamily::Ata, id.to_string(), value, thresh);
        attr.transformed_value = raw;
        Some(attr)
    }).collect()
}

fn parse_nvme_health(v: &Value) -> Vec<Attribute> {
    let log = &v["nvme_smart_health_information_log"];
    let spare_thresh = log["available_spare_threshold"].as_i64().unwrap_or(Attribute::NO_THRESHOLD);

    // (field, threshold)
    let fields: [(&str, i64); 14] = [
        ("critical_warning",     0),
        ("temperature",          Attribute::NO_THRESHOLD),
        ("available_spare",      spare_thresh),
        ("percentage_used",      100),
        ("data_units_read",      Attribute::NO_THRESHOLD),
        ("data_units_written",   Attribute::NO_THRESHOLD),
        ("host_reads",           Attribute::NO_THRESHOLD),
        ("host_writes",          Attribute::NO_THRESHOLD),
        ("controller_busy_time", Attribute::NO_THRESHOLD),
        ("power_cycles",         Attribute::NO_THRESHOLD),
        ("power_on_hours",       Attribute::NO_THRESHOLD),
        ("unsafe_shutdowns",     Attribute::NO_THRESHOLD),
        ("media_errors",         0),
        ("num_err_log_entries",  Attribute::NO_THRESHOLD),
    ];

    fields.iter()
        .filter_map(|&(field, thresh)| {
            let value = log[field].as_i64()?;
            Some(Attribute::new(AttributeFamily::Nvme, field, value, thresh))
        })
        .collect()
}

fn parse_scsi_counters(v: &Value) -> Vec<Attribute> {
    let mut out = Vec::new();

    if let Some(defects) = v["scsi_grown_defect_list"].as_i64() {
        out.push(Attribute::new(AttributeFamily::Scsi, "scsi_grown_defect_list", defects, 0));
    }

    let log = &v["scsi_error_counter_log"];
    // (counter, threshold)
    let counters: [(&str, i64); 5] = [
        ("errors_corrected_by_eccfast",          Attribute::NO_THRESHOLD),
        ("errors_corrected_by_eccdelayed",       Attribute::NO_THRESHOLD),
        ("errors_corrected_by_rereads_rewrites", Attribute::NO_THRESHOLD),
        ("total_errors_corrected",               Attribute::NO_THRESHOLD),
        ("total_uncorrected_errors",             0),
    ];
    for direction in ["read", "write"] {
        for &(counter, thresh) in &counters {
            if let Some(value) = log[direction][counter].as_i64() {
                let id = format!("{}_{}", direction, counter);
                out.push(Attribute::new(AttributeFamily::Scsi, id, value, thresh));
            }
        }
    }
    out
}
