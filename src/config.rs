use crate::models::smart::{AttributeFamily, AttributeMetadata, Ideal};
use crate::thresholds::MetadataTable;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// tracing filter used when RUST_LOG is unset, e.g. "warn" or "diskeval=debug"
    pub log_level: String,
    /// Attribute family assumed for plain attribute records: "ata", "nvme" or "scsi"
    pub default_family: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Entries merged over the built-in metadata tables.
    #[serde(default)]
    pub overrides: Vec<MetadataOverride>,
}

/// One metadata entry supplied by the user.
///
/// Example in diskeval.toml:
/// ```toml
/// [[metadata.overrides]]
/// family = "nvme"
/// id     = "temperature"
/// ideal  = "low"
/// display_name = "Composite Temperature"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataOverride {
    pub family: String,
    pub id:     String,
    pub ideal:  Ideal,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub critical: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { log_level: "warn".to_string(), default_family: "nvme".to_string() }
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    pub fn load() -> Self {
        match try_load() {
            Ok(c)  => c,
            Err(_) => {
                // Write defaults on first run (best-effort)
                let _ = try_write_defaults();
                Config::default()
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("diskeval").join("diskeval.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn default_family(&self) -> AttributeFamily {
        AttributeFamily::from_name(&self.general.default_family).unwrap_or_default()
    }

    /// Built-in tables with this config's overrides applied.
    /// Overrides naming an unknown family are skipped.
    pub fn metadata_table(&self) -> MetadataTable {
        let mut table = MetadataTable::builtin().clone();
        for o in &self.metadata.overrides {
            let family = match AttributeFamily::from_name(&o.family) {
                Some(f) => f,
                None    => {
                    tracing::warn!(family = %o.family, id = %o.id, "ignoring metadata override for unknown family");
                    continue;
                }
            };
            table.insert(family, &o.id, AttributeMetadata {
                display_name: o.display_name.clone().unwrap_or_else(|| o.id.clone()),
                ideal:        o.ideal,
                critical:     o.critical,
            });
        }
        table
    }
}

fn try_load() -> Result<Config> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    Config::load_from(&path)
}

fn try_write_defaults() -> Result<()> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# diskeval configuration\n# Generated on first run, edit freely\n\n{}", text))?;
    Ok(())
}
