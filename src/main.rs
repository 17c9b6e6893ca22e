use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use megaraid_manager::{
    Adapter, AdapterProperties, BbuCachePolicy, CachePolicy, Disk, DiskAddress, Enclosure,
    LogicalDrive, LogicalDriveProperties, MegaCli, ReadPolicy, SystemRunner, ToolConfig,
    WritePolicy,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "megaraid")]
#[command(about = "Inspect and configure MegaRAID controllers through MegaCLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (defaults to the per-user config.toml)
    #[arg(long, global = true, env = "MEGARAID_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the MegaCLI version
    Version,

    /// List all adapters
    Adapters,

    /// Show one adapter
    Adapter { adapter: u32 },

    /// Show adapter properties
    AdapterProps { adapter: u32 },

    /// Change adapter properties (unspecified ones keep their current value)
    SetAdapterProps {
        adapter: u32,

        /// Cache flush interval in seconds
        #[arg(long)]
        cache_flush: Option<u32>,

        /// Rebuild rate in percent
        #[arg(long)]
        rebuild_rate: Option<u32>,

        #[arg(long)]
        cluster: Option<bool>,

        #[arg(long)]
        ncq: Option<bool>,
    },

    /// Show the physical drive at enclosure:slot
    Disk {
        adapter: u32,
        enclosure: u32,
        slot: u32,
    },

    /// List enclosures on an adapter
    Enclosures { adapter: u32 },

    /// Show the enclosure at a 0-based position in the adapter's report
    Enclosure {
        adapter: u32,
        ordinal: usize,

        /// Also list the drives in its slots
        #[arg(long)]
        disks: bool,
    },

    /// List logical drives on an adapter
    Lds { adapter: u32 },

    /// Show one logical drive and its member drives
    Ld { adapter: u32, ld: u32 },

    /// Show logical drive cache policies and name
    LdProps { adapter: u32, ld: u32 },

    /// Change logical drive properties (unspecified ones keep their current value)
    SetLdProps {
        adapter: u32,
        ld: u32,

        /// WT or WB
        #[arg(long)]
        write: Option<WritePolicy>,

        /// NORA, RA or ADRA
        #[arg(long)]
        read: Option<ReadPolicy>,

        /// Direct or Cached
        #[arg(long)]
        cache: Option<CachePolicy>,

        /// NoCachedBadBBU or CachedBadBBU
        #[arg(long)]
        bbu: Option<BbuCachePolicy>,

        #[arg(long)]
        name: Option<String>,
    },

    /// Create a logical drive
    AddLd {
        adapter: u32,

        /// RAID level (0, 1, 5, 6, ...)
        #[arg(long)]
        raid: String,

        /// Strip size in KB
        #[arg(long, default_value = "")]
        strip: String,

        /// Member drives as enclosure:slot, comma-separated
        #[arg(long, value_delimiter = ',', required = true)]
        disks: Vec<DiskAddress>,

        #[arg(long)]
        write: Option<WritePolicy>,

        #[arg(long)]
        read: Option<ReadPolicy>,

        #[arg(long)]
        cache: Option<CachePolicy>,

        #[arg(long)]
        bbu: Option<BbuCachePolicy>,
    },

    /// Delete a logical drive (DESTROYS DATA)
    ///
    /// The boot drive is refused unless --force is given. When MegaCLI
    /// reports no boot drive for the adapter, no logical drive counts as the
    /// boot drive and the guard does not apply.
    DelLd {
        adapter: u32,
        ld: u32,

        /// Allow deleting the boot drive (only checked when the adapter
        /// reports one)
        #[arg(long)]
        force: bool,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.json || !cfg!(feature = "color-output") {
        colored::control::set_override(false);
    }

    let config = ToolConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let runner = SystemRunner::from_config(&config);
    let mega = MegaCli::connect(runner, &config)
        .with_context(|| format!("Cannot use MegaCLI binary '{}'", config.binary))?;

    run(&mega, &cli)
}

fn run(mega: &MegaCli<SystemRunner>, cli: &Cli) -> Result<()> {
    let json = cli.json;

    match &cli.command {
        Commands::Version => {
            let version = mega.version()?;
            emit(json, &version, |v| println!("MegaCLI {}", v.bold()))
        }

        Commands::Adapters => {
            let count = mega.adapter_count()?;
            let adapters = (0..count)
                .map(|id| mega.adapter(id))
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read adapters")?;
            emit(json, &adapters, |list| {
                if list.is_empty() {
                    println!("No adapters found");
                }
                list.iter().for_each(print_adapter)
            })
        }

        Commands::Adapter { adapter } => {
            let record = mega.adapter(*adapter)?;
            emit(json, &record, print_adapter)
        }

        Commands::AdapterProps { adapter } => {
            let props = mega.adapter_properties(*adapter)?;
            emit(json, &props, print_adapter_props)
        }

        Commands::SetAdapterProps {
            adapter,
            cache_flush,
            rebuild_rate,
            cluster,
            ncq,
        } => {
            let mut props = mega
                .adapter_properties(*adapter)
                .context("Failed to read current adapter properties")?;
            if let Some(value) = cache_flush {
                props.cache_flush_interval = *value;
            }
            if let Some(value) = rebuild_rate {
                props.rebuild_rate = *value;
            }
            if let Some(value) = cluster {
                props.cluster_enabled = *value;
            }
            if let Some(value) = ncq {
                props.ncq_enabled = *value;
            }

            let applied = mega.set_adapter_properties(&props)?;
            println!("{} Applied {} adapter setting(s)", "✓".green(), applied);
            Ok(())
        }

        Commands::Disk {
            adapter,
            enclosure,
            slot,
        } => {
            let disk = mega.disk(*adapter, *enclosure, *slot)?;
            emit(json, &disk, print_disk)
        }

        Commands::Enclosures { adapter } => {
            let enclosures = mega.enclosures(*adapter)?;
            emit(json, &enclosures, |list| list.iter().for_each(print_enclosure))
        }

        Commands::Enclosure {
            adapter,
            ordinal,
            disks,
        } => {
            let enclosure = mega.enclosure(*adapter, *ordinal)?;
            if *disks {
                let report = EnclosureReport {
                    disks: mega.enclosure_disks(&enclosure)?,
                    enclosure,
                };
                emit(json, &report, |r| {
                    print_enclosure(&r.enclosure);
                    r.disks.iter().for_each(print_disk);
                })
            } else {
                emit(json, &enclosure, print_enclosure)
            }
        }

        Commands::Lds { adapter } => {
            let count = mega.logical_drive_count(*adapter)?;
            let ids = mega.logical_drive_ids(*adapter, count)?;
            let drives = ids
                .iter()
                .map(|id| mega.logical_drive(*adapter, *id))
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read logical drives")?;
            emit(json, &drives, |list| {
                if list.is_empty() {
                    println!("No logical drives on adapter {}", adapter);
                }
                list.iter().for_each(print_logical_drive)
            })
        }

        Commands::Ld { adapter, ld } => {
            let report = LogicalDriveReport {
                logical_drive: mega.logical_drive(*adapter, *ld)?,
                disks: mega.logical_drive_disks(*adapter, *ld)?,
                boot: mega.is_boot_drive(*adapter, *ld)?,
            };
            emit(json, &report, |r| {
                print_logical_drive(&r.logical_drive);
                let members: Vec<String> = r.disks.iter().map(ToString::to_string).collect();
                println!("  Members:    {}", members.join(", "));
                if r.boot {
                    println!("  {}", "Boot drive".yellow());
                }
            })
        }

        Commands::LdProps { adapter, ld } => {
            let props = mega.logical_drive_properties(*adapter, *ld)?;
            emit(json, &props, print_ld_props)
        }

        Commands::SetLdProps {
            adapter,
            ld,
            write,
            read,
            cache,
            bbu,
            name,
        } => {
            let mut props = mega
                .logical_drive_properties(*adapter, *ld)
                .context("Failed to read current logical drive properties")?;
            props.write_policy = write.unwrap_or(props.write_policy);
            props.read_policy = read.unwrap_or(props.read_policy);
            props.cache_policy = cache.unwrap_or(props.cache_policy);
            props.bbu_cache_policy = bbu.unwrap_or(props.bbu_cache_policy);
            // The name is only sent when asked for
            props.name = name.clone().unwrap_or_default();

            let applied = mega.set_logical_drive_properties(&props)?;
            println!("{} Applied {} logical drive setting(s)", "✓".green(), applied);
            Ok(())
        }

        Commands::AddLd {
            adapter,
            raid,
            strip,
            disks,
            write,
            read,
            cache,
            bbu,
        } => {
            let props = LogicalDriveProperties {
                write_policy: write.unwrap_or_default(),
                read_policy: read.unwrap_or_default(),
                cache_policy: cache.unwrap_or_default(),
                bbu_cache_policy: bbu.unwrap_or_default(),
                ..LogicalDriveProperties::new(*adapter, 0)
            };

            mega.add_logical_drive(&props, disks, raid, strip)
                .with_context(|| format!("Failed to create RAID {} logical drive", raid))?;
            println!(
                "{} Created RAID {} logical drive on adapter {}",
                "✓".green(),
                raid,
                adapter
            );
            Ok(())
        }

        Commands::DelLd {
            adapter,
            ld,
            force,
            yes,
        } => {
            if mega.is_boot_drive(*adapter, *ld)? && !force {
                bail!(
                    "Logical drive {} is the boot drive of adapter {}; use --force to delete it",
                    ld,
                    adapter
                );
            }

            if !yes {
                println!(
                    "{}",
                    format!(
                        "⚠ This will delete logical drive {} on adapter {} and ALL data on it.",
                        ld, adapter
                    )
                    .red()
                    .bold()
                );
                print!("\nType 'YES' to confirm: ");
                io::stdout().flush()?;

                let mut input = String::new();
                io::stdin().read_line(&mut input)?;

                if input.trim() != "YES" {
                    println!("Operation cancelled.");
                    return Ok(());
                }
            }

            mega.delete_logical_drive(*adapter, *ld)?;
            println!("{} Deleted logical drive {}", "✓".green(), ld);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct EnclosureReport {
    enclosure: Enclosure,
    disks: Vec<Disk>,
}

#[derive(Serialize)]
struct LogicalDriveReport {
    logical_drive: LogicalDrive,
    disks: Vec<DiskAddress>,
    boot: bool,
}

/// Print `value` as JSON, or through `render` for humans
fn emit<T: Serialize + ?Sized>(json: bool, value: &T, render: impl FnOnce(&T)) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
        println!("{}", text);
    } else {
        render(value);
    }
    Ok(())
}

fn print_adapter(adapter: &Adapter) {
    println!("{}", format!("Adapter {}", adapter.adapter_id).bold());
    println!("  Product:    {}", adapter.product_name);
    println!("  Serial:     {}", adapter.serial);
    println!("  Firmware:   {}", adapter.firmware);
    println!("  BBU:        {}", adapter.bbu);
    println!("  Memory:     {}", adapter.memory);
    println!("  Interface:  {}", adapter.host_interface);
    println!("  Virtual drives: {}", adapter.logical_drive_count);
    println!("  Disks:      {}", adapter.disk_count);
    println!(
        "  Cluster:    permitted {}, active {}",
        adapter.cluster_permitted, adapter.cluster_active
    );
}

fn print_adapter_props(props: &AdapterProperties) {
    println!("{}", format!("Adapter {} properties", props.adapter_id).bold());
    println!("  Cache flush interval: {}s", props.cache_flush_interval);
    println!("  Rebuild rate:         {}%", props.rebuild_rate);
    println!("  Cluster:              {}", on_off(props.cluster_enabled));
    println!("  NCQ:                  {}", on_off(props.ncq_enabled));
}

fn print_disk(disk: &Disk) {
    if !disk.present {
        println!("  {}", "(no drive)".dimmed());
        return;
    }
    let role = if disk.part_of_logical_drive {
        "in use"
    } else {
        "unconfigured"
    };
    println!(
        "  [{}] {} {} {} {} ({})",
        disk.address(),
        disk.pd_type,
        disk.raw_size,
        state_colored(&disk.state),
        disk.inquiry,
        role
    );
}

fn print_enclosure(enclosure: &Enclosure) {
    println!(
        "{} {} ({} {})",
        format!("Enclosure {}", enclosure.device_id).bold(),
        state_colored(&enclosure.status),
        enclosure.vendor,
        enclosure.product
    );
    println!(
        "  Slots: {}  Power supplies: {}  Fans: {}",
        enclosure.slot_count, enclosure.power_supply_count, enclosure.fan_count
    );
}

fn print_logical_drive(ld: &LogicalDrive) {
    println!(
        "{} {}",
        format!("Logical drive {}", ld.ldrive_id).bold(),
        state_colored(&ld.state)
    );
    println!("  RAID level: {}", ld.raid_level);
    println!("  Size:       {}", ld.size);
    println!("  Strip size: {}", ld.strip_size);
    println!("  Drives:     {}", ld.drive_count);
}

fn print_ld_props(props: &LogicalDriveProperties) {
    println!(
        "{}",
        format!("Logical drive {} properties", props.ldrive_id).bold()
    );
    println!("  Name:   {}", props.name);
    println!("  Write:  {}", props.write_policy);
    println!("  Read:   {}", props.read_policy);
    println!("  Cache:  {}", props.cache_policy);
    println!("  BBU:    {}", props.bbu_cache_policy);
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

fn state_colored(state: &str) -> colored::ColoredString {
    if state.starts_with("Optimal") || state.starts_with("Online") || state == "Normal" {
        state.green()
    } else if state.is_empty() {
        state.normal()
    } else {
        state.yellow()
    }
}
