const LINUX_DEV: &str = "/dev/";
const LINUX_BY_ID: &str = "/dev/disk/by-id/";
const BSD_DEV: &str = "/dev/";

/// How much of the name after the prefix a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Tail {
    /// Kernel names: `sda`, `nvme0n1p2`, `ada0`.
    Alnum,
    /// Persistent link names: `ata-WDC_WD40EFRX-68N32N0_WD-WCC7K0`.
    Any,
}

struct Rule {
    prefix: &'static str,
    tail:   Tail,
    dir:    &'static str,
}

/// Ordered, first match wins. Persistent links are listed first so that
/// `nvme-Samsung_…` never falls through to the kernel `nvme` rule.
const RULES: &[Rule] = &[
    Rule { prefix: "ata-",  tail: Tail::Any,   dir: LINUX_BY_ID },
    Rule { prefix: "nvme-", tail: Tail::Any,   dir: LINUX_BY_ID },
    Rule { prefix: "scsi-", tail: Tail::Any,   dir: LINUX_BY_ID },
    Rule { prefix: "wwn-",  tail: Tail::Any,   dir: LINUX_BY_ID },
    Rule { prefix: "usb-",  tail: Tail::Any,   dir: LINUX_BY_ID },
    Rule { prefix: "nvme",  tail: Tail::Alnum, dir: LINUX_DEV },
    Rule { prefix: "xvd",   tail: Tail::Alnum, dir: LINUX_DEV },
    Rule { prefix: "sd",    tail: Tail::Alnum, dir: LINUX_DEV },
    Rule { prefix: "hd",    tail: Tail::Alnum, dir: LINUX_DEV },
    Rule { prefix: "vd",    tail: Tail::Alnum, dir: LINUX_DEV },
    Rule { prefix: "nda",   tail: Tail::Alnum, dir: BSD_DEV },
    Rule { prefix: "nvd",   tail: Tail::Alnum, dir: BSD_DEV },
    Rule { prefix: "ada",   tail: Tail::Alnum, dir: BSD_DEV },
    Rule { prefix: "da",    tail: Tail::Alnum, dir: BSD_DEV },
];

impl Rule {
    fn matches(&self, name: &str) -> bool {
        let rest = match name.strip_prefix(self.prefix) {
            Some(r) if !r.is_empty() => r,
            _ => return false,
        };
        match self.tail {
            Tail::Any   => true,
            Tail::Alnum => rest.chars().all(|c| c.is_ascii_alphanumeric()),
        }
    }
}

/// Map a bare device name from `zpool status` to its device node.
/// Absolute paths and names no rule recognizes come back unchanged.
pub fn resolve(name: &str) -> String {
    if name.starts_with('/') {
        return name.to_string();
    }
    match RULES.iter().find(|r| r.matches(name)) {
        Some(rule) => format!("{}{}", rule.dir, name),
        None       => name.to_string(),
    }
}
