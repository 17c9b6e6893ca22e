use super::{mutation_args, query_args, MegaCli, MutationPlan, MutationStep};
use crate::model::{Adapter, AdapterProperties};
use crate::parsing::{token, FieldExtractor};
use crate::tool::{ExitPolicy, ToolRunner};
use crate::RaidResult;

const VERSION_BANNER: &str = "MegaCLI SAS RAID Management Tool  Ver";
const CONTROLLER_COUNT: &str = "Controller Count:";
const BOOT_DRIVE: &str = "Boot Virtual Drive -";

/// Version token from the `-help` banner:
/// `MegaCLI SAS RAID Management Tool  Ver 8.07.14 Dec 16, 2013`
pub fn parse_version(lines: &[String]) -> Option<String> {
    let mut version = None;
    for line in lines {
        if line.contains(VERSION_BANNER) {
            if let Some(value) = token(line, 6) {
                version = Some(value.to_string());
            }
        }
    }
    version
}

/// Adapter count from `-adpCount`; zero when the line is missing
pub fn parse_adapter_count(extractor: &FieldExtractor, lines: &[String]) -> u32 {
    lines
        .iter()
        .filter_map(|line| extractor.int_token(line, CONTROLLER_COUNT, 2))
        .last()
        .unwrap_or(0)
}

/// Populate an [`Adapter`] from `-AdpAllInfo` output. Missing fields stay
/// empty.
pub fn parse_adapter(extractor: &FieldExtractor, adapter_id: u32, lines: &[String]) -> Adapter {
    let mut adapter = Adapter::new(adapter_id);

    for line in lines {
        let line = line.as_str();
        if extractor.assign_text(&mut adapter.product_name, line, "Product Name    :")
            || extractor.assign_text(&mut adapter.serial, line, "Serial No       :")
            || extractor.assign_text(&mut adapter.firmware, line, "FW Package Build:")
            || extractor.assign_text(&mut adapter.bbu, line, "BBU              :")
            || extractor.assign_text(&mut adapter.memory, line, "Memory Size      :")
            || extractor.assign_text(&mut adapter.host_interface, line, "Host Interface  :")
        {
            continue;
        }

        if line.contains("Virtual Drives    :") {
            if let Some(count) = extractor.int_token(line, "Virtual Drives    :", 3) {
                adapter.logical_drive_count = count;
            }
        } else if line.contains("  Disks           :") {
            if let Some(count) = extractor.int_token(line, "  Disks           :", 2) {
                adapter.disk_count = count;
            }
        } else if !extractor.assign_text(&mut adapter.cluster_permitted, line, "Cluster Permitted     :") {
            extractor.assign_text(&mut adapter.cluster_active, line, "Cluster Active        :");
        }
    }

    adapter
}

/// Boot logical drive id from `-AdpBootDrive -Get`:
/// `Adapter 0: Boot Virtual Drive - #1 (target id - 1).`
pub fn parse_boot_drive(extractor: &FieldExtractor, lines: &[String]) -> Option<u32> {
    lines
        .iter()
        .filter_map(|line| extractor.int(line, BOOT_DRIVE, &['#'], 1))
        .last()
}

/// `Enabled` / `Disabled` phrase to a flag; anything else leaves it alone
fn parse_toggle(value: &str, enabled: &str, disabled: &str) -> Option<bool> {
    if value == enabled {
        Some(true)
    } else if value == disabled {
        Some(false)
    } else {
        None
    }
}

impl<R: ToolRunner> MegaCli<R> {
    /// Number of adapters. The tool also returns the count as its exit
    /// code, so the exit status is ignored here after a liveness probe.
    pub fn adapter_count(&self) -> RaidResult<u32> {
        self.require_tool()?;
        let lines = self.query(&query_args(["-adpCount"]), ExitPolicy::IgnoreExit)?;
        Ok(parse_adapter_count(self.extractor(), &lines))
    }

    pub fn adapter(&self, adapter_id: u32) -> RaidResult<Adapter> {
        let lines = self.query(
            &query_args(["-AdpAllInfo".to_string(), format!("-a{}", adapter_id)]),
            ExitPolicy::Strict,
        )?;
        Ok(parse_adapter(self.extractor(), adapter_id, &lines))
    }

    /// Read the four settable adapter properties, one query each
    pub fn adapter_properties(&self, adapter_id: u32) -> RaidResult<AdapterProperties> {
        let extractor = self.extractor();
        let mut props = AdapterProperties::new(adapter_id);

        for line in self.adapter_prop_query("CacheFlushInterval", adapter_id)? {
            if let Some(value) = extractor.int(&line, "Cache Flush Interval", &['='], 1) {
                props.cache_flush_interval = value;
            }
        }

        for line in self.adapter_prop_query("RebuildRate", adapter_id)? {
            if let Some(value) = extractor.int(&line, "Rebuild Rate", &['='], 1) {
                props.rebuild_rate = value;
            }
        }

        // "Adapter 0: Cluster : Disabled"
        for line in self.adapter_prop_query("ClusterEnable", adapter_id)? {
            if let Some(value) = extractor.text(&line, "Cluster :", &[':'], 2) {
                if let Some(flag) = parse_toggle(&value, "Enabled", "Disabled") {
                    props.cluster_enabled = flag;
                }
            }
        }

        // "Adapter 0: NCQ Status is Enabled"
        for line in self.adapter_prop_query("NCQDsply", adapter_id)? {
            if let Some(value) = extractor.text(&line, "NCQ Status is", &[':'], 1) {
                if let Some(flag) =
                    parse_toggle(&value, "NCQ Status is Enabled", "NCQ Status is Disabled")
                {
                    props.ncq_enabled = flag;
                }
            }
        }

        Ok(props)
    }

    fn adapter_prop_query(&self, property: &str, adapter_id: u32) -> RaidResult<Vec<String>> {
        self.query(
            &query_args([
                "-AdpGetProp".to_string(),
                property.to_string(),
                format!("-a{}", adapter_id),
            ]),
            ExitPolicy::Strict,
        )
    }

    /// Apply adapter properties in a fixed order, stopping at the first
    /// failure. Already applied properties are not rolled back.
    pub fn set_adapter_properties(&self, props: &AdapterProperties) -> RaidResult<usize> {
        adapter_properties_plan(props).execute(self.runner())
    }

    /// Whether `ldrive_id` is the adapter's boot drive. No boot drive line
    /// means no logical drive is marked bootable.
    pub fn is_boot_drive(&self, adapter_id: u32, ldrive_id: u32) -> RaidResult<bool> {
        let lines = self.query(
            &query_args([
                "-AdpBootDrive".to_string(),
                "-Get".to_string(),
                format!("-a{}", adapter_id),
            ]),
            ExitPolicy::Strict,
        )?;
        Ok(parse_boot_drive(self.extractor(), &lines) == Some(ldrive_id))
    }
}

/// Ordered commands for `set_adapter_properties`
pub(crate) fn adapter_properties_plan(props: &AdapterProperties) -> MutationPlan {
    let adapter = format!("-a{}", props.adapter_id);
    let set_prop = |name: &str, value: Option<String>| {
        let mut parts = vec!["-AdpSetProp".to_string(), name.to_string()];
        parts.extend(value);
        parts.push(adapter.clone());
        mutation_args(parts)
    };

    let ncq = if props.ncq_enabled { "NCQEnbl" } else { "NCQDsbl" };

    MutationPlan::new()
        .with_step(MutationStep::new(
            "CacheFlushInterval",
            set_prop(
                "CacheFlushInterval",
                Some(format!("-{}", props.cache_flush_interval)),
            ),
        ))
        .with_step(MutationStep::new(
            "RebuildRate",
            set_prop("RebuildRate", Some(format!("-{}", props.rebuild_rate))),
        ))
        .with_step(MutationStep::new(
            "ClusterEnable",
            set_prop(
                "ClusterEnable",
                Some(format!("-{}", u8::from(props.cluster_enabled))),
            ),
        ))
        .with_step(MutationStep::new(ncq, set_prop(ncq, None)))
}
