use crate::models::zfs::VdevType;

/// How a rule matches a lower-cased vdev name.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    /// The whole name.
    Exact(&'static str),
    /// The stem alone, or followed by `-<n>` or a draid `:<geometry>` suffix.
    Stem(&'static str),
}

impl Pattern {
    fn matches(&self, name: &str) -> bool {
        match *self {
            Pattern::Exact(s) => name == s,
            Pattern::Stem(s)  => match name.strip_prefix(s) {
                Some(rest) => rest.is_empty() || rest.starts_with('-') || rest.starts_with(':'),
                None       => false,
            },
        }
    }
}

/// Ordered, first match wins. Anything unmatched is a disk.
const RULES: &[(Pattern, VdevType)] = &[
    (Pattern::Stem("mirror"),  VdevType::Mirror),
    (Pattern::Stem("raidz"),   VdevType::Raidz1),
    (Pattern::Stem("raidz1"),  VdevType::Raidz1),
    (Pattern::Stem("raidz2"),  VdevType::Raidz2),
    (Pattern::Stem("raidz3"),  VdevType::Raidz3),
    (Pattern::Stem("draid"),   VdevType::Draid1),
    (Pattern::Stem("draid1"),  VdevType::Draid1),
    (Pattern::Stem("draid2"),  VdevType::Draid2),
    (Pattern::Stem("draid3"),  VdevType::Draid3),
    (Pattern::Stem("spare"),   VdevType::Spare),
    (Pattern::Exact("spares"), VdevType::Spare),
    (Pattern::Exact("log"),    VdevType::Log),
    (Pattern::Exact("logs"),   VdevType::Log),
    (Pattern::Exact("cache"),  VdevType::Cache),
    (Pattern::Exact("special"), VdevType::Special),
    (Pattern::Exact("dedup"),  VdevType::Dedup),
];

/// Classify a vdev name from `zpool status` into its role.
pub fn classify(name: &str) -> VdevType {
    let lower = name.trim().to_ascii_lowercase();
    RULES.iter()
        .find(|(pat, _)| pat.matches(&lower))
        .map(|&(_, t)| t)
        .unwrap_or(VdevType::Disk)
}
