use crate::collectors::device_path::resolve;
use crate::collectors::vdev_type::classify;
use crate::collectors::zfs_date::parse_zfs_date;
use crate::models::zfs::{Pool, ScrubState, Vdev, VdevType};
use chrono::{DateTime, Duration, Utc};

const TAB_WIDTH: usize = 8;
/// First column after READ WRITE CKSUM.
const NOTE_COLUMN: usize = 5;

/// Parse a whole `zpool status` document into one Pool per "pool:" block.
/// Text with no recognizable pool yields an empty vec.
pub fn parse_pool_status(text: &str) -> Vec<Pool> {
    let lines: Vec<&str> = text.lines().collect();
    let starts: Vec<usize> = lines.iter()
        .enumerate()
        .filter(|(_, l)| field_key(l) == Some("pool"))
        .map(|(i, _)| i)
        .collect();

    starts.iter()
        .enumerate()
        .filter_map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(lines.len());
            let section = &lines[start..end];
            let name = field_value(section, "pool")?;
            if name.is_empty() { return None; }
            Some(build_pool(section, &name))
        })
        .collect()
}

fn build_pool(section: &[&str], name: &str) -> Pool {
    let mut pool = Pool::new(name);
    pool.status   = field_value(section, "state").unwrap_or_default();
    pool.advisory = field_value(section, "status");
    pool.action   = field_value(section, "action");
    pool.errors   = field_value(section, "errors");
    pool.vdevs    = vdev_tree(section, name);
    calculate_total_errors(&mut pool);
    apply_scan(&mut pool, section);
    pool
}

// ── Summary fields ────────────────────────────────────────────────────

/// `"  scan: none requested"` → `Some("scan")`. Keys are lower-case words.
fn field_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let (key, _) = trimmed.split_once(':')?;
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_lowercase()) { return None; }
    Some(key)
}

/// Lines belonging to the summary field `key`: its own line plus any
/// indented continuation lines. Never looks inside the config block.
fn field_lines<'a>(section: &[&'a str], key: &str) -> Option<Vec<&'a str>> {
    let mut out: Option<Vec<&'a str>> = None;
    let mut in_config = false;

    for &line in section {
        match field_key(line) {
            Some("config") => { in_config = true; if out.is_some() { break; } continue; }
            Some("errors") => in_config = false,
            _ => {}
        }
        if in_config { continue; }

        match field_key(line) {
            Some(k) if k == key => {
                let rest = line.trim_start()[k.len() + 1..].trim();
                out = Some(vec![rest]);
            }
            Some(_) => if out.is_some() { break },
            None => {
                let is_continuation = line.starts_with(char::is_whitespace) && !line.trim().is_empty();
                match out.as_mut() {
                    Some(v) if is_continuation => v.push(line.trim()),
                    Some(_) => break,
                    None => {}
                }
            }
        }
    }
    out
}

fn field_value(section: &[&str], key: &str) -> Option<String> {
    let joined = field_lines(section, key)?
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Some(joined)
}

/// The lines of one pool's block. Text without any "pool:" header is
/// treated as a single anonymous block; an empty name picks the first pool.
fn pool_lines<'a>(text: &'a str, pool_name: &str) -> Option<Vec<&'a str>> {
    let lines: Vec<&str> = text.lines().collect();
    let headers: Vec<usize> = lines.iter()
        .enumerate()
        .filter(|(_, l)| field_key(l) == Some("pool"))
        .map(|(i, _)| i)
        .collect();

    if headers.is_empty() {
        return Some(lines);
    }
    let idx = headers.iter().position(|&i| {
        pool_name.is_empty() || field_value(&lines[i..=i], "pool").as_deref() == Some(pool_name)
    })?;
    let end = headers.get(idx + 1).copied().unwrap_or(lines.len());
    Some(lines[headers[idx]..end].to_vec())
}

// ── Vdev tree ─────────────────────────────────────────────────────────

/// Build the vdev topology of `pool_name` from `zpool status` text.
///
/// Returns the top-level vdevs: the children of the pool's own line plus
/// any group lines (`logs`, `cache`, `spares`, ...) printed beside it.
/// Missing or malformed config sections yield an empty vec.
pub fn parse_vdev_tree(text: &str, pool_name: &str) -> Vec<Vdev> {
    match pool_lines(text, pool_name) {
        Some(lines) => vdev_tree(&lines, pool_name),
        None => {
            tracing::debug!(pool = pool_name, "pool not present in status text");
            Vec::new()
        }
    }
}

fn vdev_tree(lines: &[&str], pool_name: &str) -> Vec<Vdev> {
    let config = match lines.iter().position(|l| l.trim() == "config:") {
        Some(i) => i,
        None    => return Vec::new(),
    };

    let mut rest = lines[config + 1..].iter().skip_while(|l| l.trim().is_empty());

    let header = match rest.next() {
        Some(h) if h.split_whitespace().next() == Some("NAME") => h,
        other => {
            tracing::debug!(pool = pool_name, line = ?other, "config section without NAME header");
            return Vec::new();
        }
    };
    let base = indent_of(header);

    let mut roots: Vec<Vdev> = Vec::new();
    let mut stack: Vec<(usize, Vdev)> = Vec::new();

    for line in rest {
        if line.trim().is_empty() || field_key(line) == Some("errors") { break; }
        let indent = indent_of(line);
        if indent < base {
            tracing::debug!(pool = pool_name, line, "line outdented past header, stopping");
            break;
        }
        let node = match parse_vdev_line(line) {
            Some(v) => v,
            None    => continue,
        };

        while stack.last().is_some_and(|(d, _)| *d >= indent) {
            if let Some((_, done)) = stack.pop() {
                attach(&mut stack, &mut roots, done);
            }
        }
        stack.push((indent, node));
    }
    while let Some((_, done)) = stack.pop() {
        attach(&mut stack, &mut roots, done);
    }

    // The pool's own line comes first; with no name given, take it on position.
    let mut top = Vec::new();
    for (i, root) in roots.into_iter().enumerate() {
        if root.name == pool_name || (pool_name.is_empty() && i == 0) {
            top.extend(root.children);
        } else {
            top.push(root);
        }
    }
    top
}

fn attach(stack: &mut [(usize, Vdev)], roots: &mut Vec<Vdev>, node: Vdev) {
    match stack.last_mut() {
        Some((_, parent)) => parent.children.push(node),
        None              => roots.push(node),
    }
}

fn indent_of(line: &str) -> usize {
    let mut col = 0;
    for c in line.chars() {
        match c {
            '\t'                  => col = (col / TAB_WIDTH + 1) * TAB_WIDTH,
            c if c.is_whitespace() => col += 1,
            _                     => break,
        }
    }
    col
}

/// `"  sda  ONLINE  1  2  3  (resilvering)"` → Vdev.
fn parse_vdev_line(line: &str) -> Option<Vdev> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let name = *tokens.first()?;

    let vdev_type = classify(name);
    let mut vdev = Vdev::new(name, vdev_type);
    vdev.status = tokens.get(1).map(|s| s.to_string()).unwrap_or_default();
    if vdev_type == VdevType::Disk {
        vdev.path = Some(resolve(name));
    }

    // READ WRITE CKSUM sit in columns 2, 3 and 4; a "-" or absent column reads 0.
    // The note starts at the first word that is not a counter, or after CKSUM.
    let note_at = tokens.iter()
        .enumerate()
        .skip(2)
        .find(|(_, t)| **t != "-" && parse_counter(t).is_none())
        .map_or(tokens.len(), |(i, _)| i)
        .min(NOTE_COLUMN);
    let counter = |col: usize| {
        if col < note_at { tokens.get(col).and_then(|t| parse_counter(t)).unwrap_or(0) } else { 0 }
    };
    vdev.read_errors     = counter(2);
    vdev.write_errors    = counter(3);
    vdev.checksum_errors = counter(4);

    if note_at < tokens.len() {
        vdev.note = Some(tokens[note_at..].join(" "));
    }
    Some(vdev)
}

/// zpool abbreviates large counters: `0`, `17`, `1.2K`, `3M`.
fn parse_counter(s: &str) -> Option<u64> {
    if let Ok(v) = s.parse::<u64>() { return Some(v); }

    let (num, mult) = match s.chars().last()? {
        'K' => (&s[..s.len() - 1], 1u64 << 10),
        'M' => (&s[..s.len() - 1], 1u64 << 20),
        'G' => (&s[..s.len() - 1], 1u64 << 30),
        'T' => (&s[..s.len() - 1], 1u64 << 40),
        _   => return None,
    };
    let v: f64 = num.parse().ok()?;
    if !v.is_finite() || v < 0.0 { return None; }
    Some((v * mult as f64).round() as u64)
}

// ── Errors ────────────────────────────────────────────────────────────

/// Sum every vdev's own read/write/checksum counters into the pool totals.
pub fn calculate_total_errors(pool: &mut Pool) {
    let (mut read, mut write, mut cksum) = (0u64, 0u64, 0u64);
    for top in &pool.vdevs {
        top.walk(&mut |v| {
            read  = read.saturating_add(v.read_errors);
            write = write.saturating_add(v.write_errors);
            cksum = cksum.saturating_add(v.checksum_errors);
        });
    }
    pool.total_read_errors     = read;
    pool.total_write_errors    = write;
    pool.total_checksum_errors = cksum;
}

// ── Scrub ─────────────────────────────────────────────────────────────

/// Classify the "scan:" field of `text` and overwrite the pool's scrub state.
///
/// The pool is left untouched when there is no scan field, when it
/// describes something other than a scrub, or when its date is unreadable.
pub fn parse_scrub_status(pool: &mut Pool, text: &str) {
    if let Some(lines) = pool_lines(text, &pool.name) {
        apply_scan(pool, &lines);
    }
}

#[derive(Debug, PartialEq)]
struct Scan {
    state:   ScrubState,
    start:   Option<DateTime<Utc>>,
    end:     Option<DateTime<Utc>>,
    percent: f64,
    errors:  u64,
}

fn apply_scan(pool: &mut Pool, section: &[&str]) {
    let scan = match field_lines(section, "scan") {
        Some(lines) => lines,
        None        => return,
    };
    let scan = match classify_scan(&scan) {
        Some(s) => s,
        None    => {
            tracing::debug!(pool = %pool.name, scan = ?scan.first(), "scan line not classified");
            return;
        }
    };
    pool.scrub_state            = scan.state;
    pool.scrub_start_time       = scan.start;
    pool.scrub_end_time         = scan.end;
    pool.scrub_percent_complete = scan.percent;
    pool.scrub_errors_count     = scan.errors;
}

fn classify_scan(lines: &[&str]) -> Option<Scan> {
    let first = lines.first()?.trim();

    if first.starts_with("none requested") {
        return Some(Scan { state: ScrubState::None, start: None, end: None, percent: 0.0, errors: 0 });
    }

    if let Some(since) = first.strip_prefix("scrub in progress since ") {
        let start = date_or_log(since)?;
        let percent = lines.iter().find_map(|l| percent_done(l)).unwrap_or(0.0);
        return Some(Scan { state: ScrubState::Scanning, start: Some(start), end: None, percent, errors: 0 });
    }

    if let Some(rest) = first.strip_prefix("scrub repaired ") {
        // "0B in 00:00:01 with 0 errors on Sun Jan  5 00:34:31 2026"
        let (head, date) = rest.split_once(" on ")?;
        let end = date_or_log(date)?;
        let errors = word_after(head, "with").and_then(|w| w.parse().ok()).unwrap_or(0);
        let start = head.split_once(" in ")
            .and_then(|(_, d)| parse_duration(d.split(" with ").next().unwrap_or(d)))
            .and_then(|d| end.checked_sub_signed(d));
        return Some(Scan { state: ScrubState::Finished, start, end: Some(end), percent: 100.0, errors });
    }

    if let Some(date) = first.strip_prefix("scrub canceled on ") {
        let end = date_or_log(date)?;
        return Some(Scan { state: ScrubState::Canceled, start: None, end: Some(end), percent: 0.0, errors: 0 });
    }

    None
}

fn date_or_log(s: &str) -> Option<DateTime<Utc>> {
    match parse_zfs_date(s) {
        Ok(ts) => Some(ts),
        Err(err) => {
            tracing::warn!(%err, "unreadable scrub timestamp, keeping previous scrub state");
            None
        }
    }
}

/// `"0B repaired, 50.00% done, 00:10:00 to go"` → 50.0
fn percent_done(line: &str) -> Option<f64> {
    let words: Vec<&str> = line.split_whitespace().collect();
    words.windows(2).find_map(|w| {
        if w[1].trim_end_matches(',') != "done" { return None; }
        w[0].strip_suffix('%')?.parse::<f64>().ok()
    })
}

fn word_after<'a>(s: &'a str, marker: &str) -> Option<&'a str> {
    let mut words = s.split_whitespace();
    words.by_ref().find(|w| *w == marker)?;
    words.next()
}

/// `"00:00:01"` or `"1 days 02:03:04"` → Duration. Figures too large for
/// a Duration give None.
fn parse_duration(s: &str) -> Option<Duration> {
    let words: Vec<&str> = s.split_whitespace().collect();
    let (days, clock) = match words.as_slice() {
        [clock]                                   => (0i64, *clock),
        [d, unit, clock] if unit.starts_with("day") => (d.parse().ok()?, *clock),
        _                                         => return None,
    };
    let parts: Vec<i64> = clock.split(':').map(|p| p.parse().ok()).collect::<Option<_>>()?;
    let [h, m, sec] = parts.as_slice() else { return None };
    Duration::try_days(days)?
        .checked_add(&Duration::try_hours(*h)?)?
        .checked_add(&Duration::try_minutes(*m)?)?
        .checked_add(&Duration::try_seconds(*sec)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    const MIRROR: &str = "  pool: tank
 state: ONLINE
status: One or more devices has experienced an unrecoverable error.  An
\tattempt was made to correct the error.  Applications are unaffected.
action: Determine if the device needs to be replaced, and clear the errors
\tusing 'zpool clear' or replace the device with 'zpool replace'.
  scan: scrub repaired 0B in 00:00:01 with 0 errors on Sun Jan  5 00:34:31 2026
config:

\tNAME        STATE     READ WRITE CKSUM
\ttank        ONLINE       0     0     0
\t  mirror-0  ONLINE       0     0     0
\t    sda     ONLINE       1     2     3
\t    sdb     ONLINE       0     0     0

errors: No known data errors
";

    const RAIDZ2: &str = "  pool: datapool
 state: ONLINE
  scan: scrub in progress since Sun Jan  5 00:24:31 2026
\t1.23T scanned at 1.2G/s, 600G issued at 600M/s, 1.2T total
\t0B repaired, 50.00% done, 00:10:00 to go
config:

\tNAME        STATE     READ WRITE CKSUM
\tdatapool    ONLINE       0     0     0
\t  raidz2-0  ONLINE       0     0     0
\t    sda     ONLINE       0     0     0
\t    sdb     ONLINE       0     1     0
\t    sdc     ONLINE       0     0     0
\t    sdd     ONLINE       2     0     0

errors: No known data errors
";

    const CANCELED: &str = "  pool: tank
 state: ONLINE
  scan: scrub canceled on Mon Feb 16 08:00:00 2026
config:

\tNAME        STATE     READ WRITE CKSUM
\ttank        ONLINE       0     0     0
\t  sda       ONLINE       0     0     0

errors: No known data errors
";

    const COMPLEX: &str = "  pool: backup
 state: DEGRADED
status: One or more devices could not be opened.
  scan: none requested
config:

\tNAME                                   STATE     READ WRITE CKSUM
\tbackup                                 DEGRADED     0     0     0
\t  mirror-0                             DEGRADED     0     0     0
\t    ata-WDC_WD40EFRX-68N32N0_WD-WCC7K0  ONLINE       0     0     0
\t    sdx                                UNAVAIL      0     0     0  cannot open
\t  mirror-1                             ONLINE       0     0     0
\t    nvme0n1                            ONLINE       0     0  1.5K
\t    ada0                               ONLINE       0     0     0
\tlogs
\t  nvme1n1                              ONLINE       0     0     0
\tcache
\t  sdy                                  ONLINE       0     0     0
\tspares
\t  sdz                                  AVAIL

errors: No known data errors

  pool: tank
 state: ONLINE
  scan: scrub repaired 0B in 1 days 02:00:00 with 2 errors on Tue Mar  3 04:05:06 2026
config:

\tNAME        STATE     READ WRITE CKSUM
\ttank        ONLINE       0     0     0
\t  sda       ONLINE       0     0     0

errors: No known data errors
";

    #[test]
    fn mirror_tree() {
        let vdevs = parse_vdev_tree(MIRROR, "tank");
        assert_eq!(vdevs.len(), 1);

        let mirror = &vdevs[0];
        assert_eq!(mirror.name, "mirror-0");
        assert_eq!(mirror.vdev_type, VdevType::Mirror);
        assert_eq!(mirror.status, "ONLINE");
        assert_eq!(mirror.path, None);
        assert_eq!(mirror.children.len(), 2);

        let sda = &mirror.children[0];
        assert_eq!(sda.name, "sda");
        assert_eq!(sda.vdev_type, VdevType::Disk);
        assert_eq!(sda.path.as_deref(), Some("/dev/sda"));
        assert_eq!((sda.read_errors, sda.write_errors, sda.checksum_errors), (1, 2, 3));

        let sdb = &mirror.children[1];
        assert_eq!(sdb.name, "sdb");
        assert!(!sdb.has_errors());
    }

    #[test]
    fn raidz2_tree() {
        let vdevs = parse_vdev_tree(RAIDZ2, "datapool");
        assert_eq!(vdevs.len(), 1);
        let raidz = &vdevs[0];
        assert_eq!(raidz.vdev_type, VdevType::Raidz2);
        assert_eq!(raidz.name, "raidz2-0");
        assert_eq!(raidz.children.len(), 4);
        assert_eq!(raidz.children[1].name, "sdb");
        assert_eq!(raidz.children[1].write_errors, 1);
        assert_eq!(raidz.children[3].name, "sdd");
        assert_eq!(raidz.children[3].read_errors, 2);
    }

    #[test]
    fn empty_or_configless_text_gives_no_vdevs() {
        assert!(parse_vdev_tree("", "tank").is_empty());
        assert!(parse_vdev_tree("  pool: tank\n state: ONLINE\n", "tank").is_empty());
        assert!(parse_vdev_tree("config:\n\n\tgarbage here\n", "tank").is_empty());
        assert!(parse_vdev_tree(MIRROR, "other").is_empty());
    }

    #[test]
    fn empty_name_selects_first_pool() {
        let vdevs = parse_vdev_tree(MIRROR, "");
        assert_eq!(vdevs.len(), 1);
        assert_eq!(vdevs[0].name, "mirror-0");
        assert_eq!(vdevs[0].children.len(), 2);

        let vdevs = parse_vdev_tree(COMPLEX, "");
        let names: Vec<&str> = vdevs.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["mirror-0", "mirror-1", "logs", "cache", "spares"]);
        assert!(vdevs.iter().all(|v| v.name != "backup"));
    }

    #[test]
    fn groups_and_annotations() {
        let vdevs = parse_vdev_tree(COMPLEX, "backup");
        let names: Vec<&str> = vdevs.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["mirror-0", "mirror-1", "logs", "cache", "spares"]);

        let m0 = &vdevs[0];
        assert_eq!(
            m0.children[0].path.as_deref(),
            Some("/dev/disk/by-id/ata-WDC_WD40EFRX-68N32N0_WD-WCC7K0")
        );
        assert_eq!(m0.children[1].status, "UNAVAIL");
        assert_eq!(m0.children[1].note.as_deref(), Some("cannot open"));

        assert_eq!(vdevs[1].children[0].checksum_errors, 1536);
        assert_eq!(vdevs[1].children[1].path.as_deref(), Some("/dev/ada0"));

        assert_eq!(vdevs[2].vdev_type, VdevType::Log);
        assert_eq!(vdevs[2].status, "");
        assert_eq!(vdevs[2].path, None);
        assert_eq!(vdevs[2].children[0].path.as_deref(), Some("/dev/nvme1n1"));
        assert_eq!(vdevs[3].vdev_type, VdevType::Cache);
        assert_eq!(vdevs[4].vdev_type, VdevType::Spare);
        assert_eq!(vdevs[4].children[0].status, "AVAIL");
    }

    #[test]
    fn only_disks_carry_paths() {
        for pool in parse_pool_status(COMPLEX) {
            for top in &pool.vdevs {
                top.walk(&mut |v| assert_eq!(v.path.is_some(), v.vdev_type == VdevType::Disk, "{}", v.name));
            }
        }
    }

    #[test]
    fn totals_sum_every_node() {
        let leaf = |name: &str, r, w, c| {
            let mut v = Vdev::new(name, VdevType::Disk);
            (v.read_errors, v.write_errors, v.checksum_errors) = (r, w, c);
            v
        };
        let mut m0 = leaf("mirror-0", 1, 2, 3);
        m0.vdev_type = VdevType::Mirror;
        m0.children = vec![leaf("sda", 10, 20, 30), leaf("sdb", 5, 0, 1)];
        let mut spare = leaf("spare-0", 0, 0, 7);
        spare.vdev_type = VdevType::Spare;
        spare.children = vec![leaf("sdd", 1000, 0, 0), leaf("sde", 0, 2000, 0)];
        let mut m1 = leaf("mirror-1", 0, 0, 0);
        m1.vdev_type = VdevType::Mirror;
        m1.children = vec![leaf("sdc", 100, 200, 300), spare];

        let mut pool = Pool::new("tank");
        pool.vdevs = vec![m0.clone(), m1.clone()];
        calculate_total_errors(&mut pool);
        assert_eq!(pool.total_read_errors, 1116);
        assert_eq!(pool.total_write_errors, 2222);
        assert_eq!(pool.total_checksum_errors, 341);

        pool.vdevs = vec![m1, m0];
        calculate_total_errors(&mut pool);
        assert_eq!(pool.total_errors(), 1116 + 2222 + 341);
    }

    #[test]
    fn scrub_finished() {
        let mut pool = Pool::default();
        parse_scrub_status(&mut pool, MIRROR);
        assert_eq!(pool.scrub_state, ScrubState::Finished);
        assert_eq!(pool.scrub_errors_count, 0);
        assert_eq!(pool.scrub_percent_complete, 100.0);
        let end = pool.scrub_end_time.unwrap();
        assert_eq!(end.year(), 2026);
        assert_eq!(pool.scrub_start_time, Some(end - Duration::seconds(1)));
    }

    #[test]
    fn scrub_finished_with_oversized_duration() {
        let end = Utc.with_ymd_and_hms(2026, 1, 5, 0, 34, 31).single();
        for scan in [
            "  scan: scrub repaired 0B in 99999999999999 days 00:00:00 with 0 errors on Sun Jan  5 00:34:31 2026\n",
            "  scan: scrub repaired 0B in 9223372036854775807:00:00 with 0 errors on Sun Jan  5 00:34:31 2026\n",
            "  scan: scrub repaired 0B in 106751991 days 00:00:00 with 0 errors on Sun Jan  5 00:34:31 2026\n",
        ] {
            let mut pool = Pool::default();
            parse_scrub_status(&mut pool, scan);
            assert_eq!(pool.scrub_state, ScrubState::Finished);
            assert_eq!(pool.scrub_end_time, end);
            assert_eq!(pool.scrub_start_time, None);
        }
    }

    #[test]
    fn scrub_in_progress() {
        let mut pool = Pool::default();
        parse_scrub_status(&mut pool, RAIDZ2);
        assert_eq!(pool.scrub_state, ScrubState::Scanning);
        assert_eq!(pool.scrub_start_time.map(|t| t.year()), Some(2026));
        assert_eq!(pool.scrub_end_time, None);
        assert_eq!(pool.scrub_percent_complete, 50.0);
    }

    #[test]
    fn scrub_canceled() {
        let mut pool = Pool::default();
        parse_scrub_status(&mut pool, CANCELED);
        assert_eq!(pool.scrub_state, ScrubState::Canceled);
        assert_eq!(pool.scrub_end_time.map(|t| t.year()), Some(2026));
    }

    #[test]
    fn scrub_none_clears_timestamps() {
        let mut pool = Pool::default();
        pool.scrub_state = ScrubState::Finished;
        pool.scrub_end_time = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single();
        parse_scrub_status(&mut pool, "  scan: none requested\n");
        assert_eq!(pool.scrub_state, ScrubState::None);
        assert_eq!(pool.scrub_start_time, None);
        assert_eq!(pool.scrub_end_time, None);
    }

    #[test]
    fn unrecognized_scan_leaves_pool_alone() {
        let mut pool = Pool::default();
        pool.scrub_state = ScrubState::Finished;
        parse_scrub_status(&mut pool, "  scan: resilvered 1.2G in 00:01:00 with 0 errors on Sun Jan  5 00:34:31 2026\n");
        assert_eq!(pool.scrub_state, ScrubState::Finished);

        parse_scrub_status(&mut pool, "  scan: scrub canceled on someday\n");
        assert_eq!(pool.scrub_state, ScrubState::Finished);

        parse_scrub_status(&mut pool, " state: ONLINE\n");
        assert_eq!(pool.scrub_state, ScrubState::Finished);
    }

    #[test]
    fn multi_pool_document() {
        let pools = parse_pool_status(COMPLEX);
        assert_eq!(pools.len(), 2);

        let backup = &pools[0];
        assert_eq!(backup.name, "backup");
        assert_eq!(backup.status, "DEGRADED");
        assert!(!backup.is_healthy());
        assert_eq!(backup.advisory.as_deref(), Some("One or more devices could not be opened."));
        assert_eq!(backup.errors.as_deref(), Some("No known data errors"));
        assert_eq!(backup.scrub_state, ScrubState::None);
        assert_eq!(backup.total_checksum_errors, 1536);
        assert_eq!(backup.disks().len(), 7);

        let tank = &pools[1];
        assert_eq!(tank.name, "tank");
        assert_eq!(tank.vdevs.len(), 1);
        assert_eq!(tank.scrub_state, ScrubState::Finished);
        assert_eq!(tank.scrub_errors_count, 2);
        let end = Utc.with_ymd_and_hms(2026, 3, 3, 4, 5, 6).single();
        assert_eq!(tank.scrub_end_time, end);
        assert_eq!(tank.scrub_start_time, end.map(|e| e - Duration::hours(26)));
    }

    #[test]
    fn continuation_lines_are_joined() {
        let pools = parse_pool_status(MIRROR);
        assert_eq!(
            pools[0].action.as_deref(),
            Some("Determine if the device needs to be replaced, and clear the errors using 'zpool clear' or replace the device with 'zpool replace'.")
        );
    }

    #[test]
    fn counter_columns_are_read_independently() {
        let text = "config:\n\n\tNAME STATE READ WRITE CKSUM\n\ttank ONLINE 0 0 0\n\t  sda ONLINE - 2 3\n\t  sdb ONLINE 4 - 1.5K\n\t  sdc FAULTED 1 2 3 4 too many errors\n\t  sdd REMOVED 7\n";
        let vdevs = parse_vdev_tree(text, "tank");
        let got: Vec<_> = vdevs.iter()
            .map(|v| (v.name.as_str(), v.read_errors, v.write_errors, v.checksum_errors, v.note.as_deref()))
            .collect();
        assert_eq!(got, [
            ("sda", 0, 2, 3, None),
            ("sdb", 4, 0, 1536, None),
            ("sdc", 1, 2, 3, Some("4 too many errors")),
            ("sdd", 7, 0, 0, None),
        ]);
    }

    #[test]
    fn counters() {
        assert_eq!(parse_counter("0"), Some(0));
        assert_eq!(parse_counter("17"), Some(17));
        assert_eq!(parse_counter("2K"), Some(2048));
        assert_eq!(parse_counter("1M"), Some(1 << 20));
        assert_eq!(parse_counter("ONLINE"), None);
        assert_eq!(parse_counter("-"), None);
    }

    #[test]
    fn indentation_counts_tabs() {
        assert_eq!(indent_of("\tNAME"), 8);
        assert_eq!(indent_of("\t  mirror-0"), 10);
        assert_eq!(indent_of("    sda"), 4);
    }
}
