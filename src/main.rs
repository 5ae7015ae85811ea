use anyhow::{bail, Context, Result};
use clap::Parser;
use diskeval::collectors::{smart as smart_collector, zfs};
use diskeval::config::Config;
use diskeval::models::record::{FlatRecord, Flatten};
use diskeval::models::smart::{Attribute, AttributeFamily, AttributeRecord};
use diskeval::models::zfs::Pool;
use diskeval::thresholds::MetadataTable;
use diskeval::util::{attribute_status, report};
use std::io::{self, Read};

#[derive(Parser, Debug)]
#[command(name = "diskeval", about = "Evaluate zpool status text and SMART attributes", version = "0.1")]
struct Cli {
    /// `zpool status` output to parse ("-" for stdin)
    #[arg(long, value_name = "FILE")]
    zpool: Option<String>,

    /// Only report this pool
    #[arg(long, value_name = "NAME")]
    pool: Option<String>,

    /// JSON array of {id, value, threshold} attribute records ("-" for stdin)
    #[arg(long, value_name = "FILE")]
    attrs: Option<String>,

    /// `smartctl --json -a` output ("-" for stdin)
    #[arg(long, value_name = "FILE")]
    smartctl: Option<String>,

    /// Attribute family for --attrs: ata, nvme, scsi
    #[arg(short, long)]
    family: Option<String>,

    /// Print flattened key/value records instead of structured JSON
    #[arg(long)]
    flat: bool,

    /// Print a human-readable health report instead of JSON
    #[arg(long)]
    report: bool,

    /// Print config file path and current values, then exit
    #[arg(long)]
    config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load();
    init_logging(&cfg.general.log_level);

    if cli.config {
        return run_print_config(&cfg);
    }

    if cli.zpool.is_none() && cli.attrs.is_none() && cli.smartctl.is_none() {
        bail!("nothing to do: pass --zpool, --attrs or --smartctl (see --help)");
    }

    let table = cfg.metadata_table();

    let pools = match &cli.zpool {
        Some(src) => read_pools(&read_input(src)?, cli.pool.as_deref()),
        None      => Vec::new(),
    };

    let mut attributes: Vec<Attribute> = Vec::new();
    if let Some(src) = &cli.attrs {
        let family = match &cli.family {
            Some(name) => AttributeFamily::from_name(name)
                .with_context(|| format!("unknown attribute family {:?}", name))?,
            None => cfg.default_family(),
        };
        attributes.extend(read_attribute_records(&read_input(src)?, family)?);
    }
    if let Some(src) = &cli.smartctl {
        attributes.extend(read_smartctl(&read_input(src)?)?);
    }

    attribute_status::evaluate_all(&mut attributes, &table);
    tracing::info!(pools = pools.len(), attributes = attributes.len(), "snapshot evaluated");

    if cli.report {
        print!("{}", report::generate(&pools, &attributes, &table));
    } else if cli.flat {
        print_flat(&pools, &attributes)?;
    } else {
        print_json(&pools, &attributes)?;
    }
    Ok(())
}

fn init_logging(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(src: &str) -> Result<String> {
    if src == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).context("reading stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(src).with_context(|| format!("reading {}", src))
}

/// All pools in the document, or only `only` when given. A bare config
/// fragment with no "pool:" header is accepted when the pool is named.
fn read_pools(text: &str, only: Option<&str>) -> Vec<Pool> {
    let mut pools = zfs::parse_pool_status(text);
    if pools.is_empty() {
        if let Some(name) = only {
            let mut pool = Pool::new(name);
            pool.vdevs = zfs::parse_vdev_tree(text, name);
            zfs::calculate_total_errors(&mut pool);
            zfs::parse_scrub_status(&mut pool, text);
            pools.push(pool);
        }
    }
    if let Some(name) = only {
        pools.retain(|p| p.name == name);
    }
    if pools.is_empty() {
        tracing::warn!("no pools found in zpool status input");
    }
    pools
}

fn read_attribute_records(text: &str, family: AttributeFamily) -> Result<Vec<Attribute>> {
    let records: Vec<AttributeRecord> = serde_json::from_str(text).context("parsing attribute records")?;
    Ok(records.into_iter().map(|r| r.into_attribute(family)).collect())
}

fn read_smartctl(text: &str) -> Result<Vec<Attribute>> {
    let doc: serde_json::Value = serde_json::from_str(text).context("parsing smartctl JSON")?;
    match smart_collector::read_attributes(&doc) {
        Some((family, attrs)) => {
            tracing::debug!(%family, count = attrs.len(), "read smartctl attributes");
            Ok(attrs)
        }
        None => {
            tracing::warn!("smartctl document has no ATA, NVMe or SCSI health data");
            Ok(Vec::new())
        }
    }
}

fn print_json(pools: &[Pool], attributes: &[Attribute]) -> Result<()> {
    let snapshot = serde_json::json!({
        "diskeval_version": env!("CARGO_PKG_VERSION"),
        "timestamp":  chrono::Local::now().to_rfc3339(),
        "pools":      pools,
        "attributes": attributes,
    });
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn print_flat(pools: &[Pool], attributes: &[Attribute]) -> Result<()> {
    let mut record = FlatRecord::new();
    for pool in pools {
        record.extend(pool.flatten());
    }
    for attr in attributes {
        record.extend(attr.flatten());
    }
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn run_print_config(cfg: &Config) -> Result<()> {
    let path = Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    let builtin = MetadataTable::builtin();
    println!("Config: {}", path);
    println!();
    println!("[general]");
    println!("  log_level      = {}", cfg.general.log_level);
    println!("  default_family = {}", cfg.default_family());
    println!();
    println!("[metadata]");
    for family in [AttributeFamily::Ata, AttributeFamily::Nvme, AttributeFamily::Scsi] {
        println!("  {:5} {} built-in: {}", family.label(), builtin.len(family), builtin.ids(family).join(", "));
    }
    if cfg.metadata.overrides.is_empty() {
        println!("  overrides = (none)");
    } else {
        for o in &cfg.metadata.overrides {
            println!("  override: {}.{} → ideal {:?}", o.family, o.id, o.ideal);
        }
    }
    Ok(())
}
