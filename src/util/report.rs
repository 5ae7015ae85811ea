use crate::models::smart::Attribute;
use crate::models::zfs::{Pool, Vdev};
use crate::thresholds::MetadataLookup;

/// Generate a human-readable health report to a String.
pub fn generate<L>(pools: &[Pool], attributes: &[Attribute], lookup: &L) -> String
where
    L: MetadataLookup + ?Sized,
{
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut out = String::new();

    out.push_str("═══════════════════════════════════════════════\n");
    out.push_str(&format!("  diskeval Health Report — {}\n", now));
    out.push_str("═══════════════════════════════════════════════\n\n");

    // ── Pools ──────────────────────────────────────────────────────────
    if !pools.is_empty() {
        out.push_str(&format!("── ZFS Pools ({}) ─────────────────────────────\n", pools.len()));
        for pool in pools {
            push_pool(&mut out, pool);
        }
        out.push('\n');
    }

    // ── Attributes ─────────────────────────────────────────────────────
    if !attributes.is_empty() {
        let failing = attributes.iter().filter(|a| a.status.is_failed()).count();
        out.push_str(&format!(
            "── Attributes ({}, {} failing) ─────────────────\n", attributes.len(), failing
        ));
        for a in attributes {
            let name = lookup.lookup(a.family, &a.id)
                .map(|m| m.display_name.as_str())
                .unwrap_or(a.id.as_str());
            let thresh = if a.has_threshold() { a.threshold.to_string() } else { "—".to_string() };
            out.push_str(&format!(
                "  [{}] {:5} {:32} value:{:>8}  thresh:{:>6}\n",
                a.status.label(), a.family.label(), name, a.value, thresh
            ));
            if !a.status_reason.is_empty() {
                out.push_str(&format!("         {}\n", a.status_reason));
            }
        }
        out.push('\n');
    }

    if pools.is_empty() && attributes.is_empty() {
        out.push_str("  Nothing to report.\n");
    }
    out
}

fn push_pool(out: &mut String, pool: &Pool) {
    let mark = if pool.is_healthy() && pool.total_errors() == 0 { "●" } else { "▲" };
    out.push_str(&format!(
        "  {} {:12} {:10}  errors R/W/C: {}/{}/{}\n",
        mark, pool.name, pool.status,
        pool.total_read_errors, pool.total_write_errors, pool.total_checksum_errors
    ));

    let scrub = match (pool.scrub_start_time, pool.scrub_end_time) {
        (_, Some(end)) => format!("{} {}", pool.scrub_state.label(), end.format("%Y-%m-%d %H:%M")),
        (Some(start), None) => format!(
            "{} {:.1}% since {}", pool.scrub_state.label(), pool.scrub_percent_complete, start.format("%Y-%m-%d %H:%M")
        ),
        (None, None) => pool.scrub_state.label().to_string(),
    };
    out.push_str(&format!("    scrub: {}\n", scrub));
    if let Some(advisory) = &pool.advisory {
        out.push_str(&format!("    status: {}\n", advisory));
    }

    for top in &pool.vdevs {
        push_vdev(out, top, 2);
    }
}

fn push_vdev(out: &mut String, vdev: &Vdev, depth: usize) {
    let label = format!("{}{}", "  ".repeat(depth), vdev.name);
    let mut line = format!("  {:40} {:8} {:8}", label, vdev.vdev_type.label(), vdev.status);
    if vdev.has_errors() {
        line.push_str(&format!(
            "  R/W/C {}/{}/{}", vdev.read_errors, vdev.write_errors, vdev.checksum_errors
        ));
    }
    if let Some(path) = &vdev.path {
        if path != &vdev.name {
            line.push_str(&format!("  {}", path));
        }
    }
    if let Some(note) = &vdev.note {
        line.push_str(&format!("  ({})", note));
    }
    out.push_str(line.trim_end());
    out.push('\n');

    for child in &vdev.children {
        push_vdev(out, child, depth + 1);
    }
}
