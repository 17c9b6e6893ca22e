use super::{mutation_args, query_args, MegaCli, MutationPlan, MutationStep, PdListBuilder};
use crate::model::{
    BbuCachePolicy, CachePolicy, DiskAddress, LogicalDrive, LogicalDriveProperties, ReadPolicy,
    WritePolicy,
};
use crate::parsing::{segment, FieldExtractor};
use crate::tool::{ExitPolicy, ToolRunner};
use crate::{RaidError, RaidResult};

/// `-CfgLdAdd` exits with 254 after creating the volume, alongside a
/// harmless "proc_add_new_ld: scandir failed" message.
pub const ADD_LD_SUCCESS_QUIRK: i32 = 254;

const LD_COUNT: &str = "Number of Virtual Drives Configured on Adapter";
const VIRTUAL_DRIVE: &str = "Virtual Drive:";
const DRIVE_COUNT: &str = "Number Of Drives    :";
// Spanned levels (10, 50, 60) print these instead of DRIVE_COUNT
const DRIVES_PER_SPAN: &str = "Number Of Drives per span:";
const SPAN_DEPTH: &str = "Span Depth          :";
const ENCLOSURE_ID: &str = "Enclosure Device ID:";
const SLOT_NUMBER: &str = "Slot Number:";
const CACHE_POLICY: &str = "Cache Policy:";
const LD_NAME: &str = "Name:";

pub fn parse_ld_count(extractor: &FieldExtractor, lines: &[String]) -> u32 {
    lines
        .iter()
        .filter_map(|line| extractor.int(line, LD_COUNT, &[':'], 1))
        .last()
        .unwrap_or(0)
}

/// Logical drive ids from `-LDInfo -Lall`: `Virtual Drive: 1 (Target Id: 1)`
pub fn parse_ld_ids(extractor: &FieldExtractor, lines: &[String]) -> Vec<u32> {
    lines
        .iter()
        .filter_map(|line| extractor.int_token(line, VIRTUAL_DRIVE, 2))
        .collect()
}

pub fn parse_logical_drive(
    extractor: &FieldExtractor,
    adapter_id: u32,
    ldrive_id: u32,
    lines: &[String],
) -> LogicalDrive {
    let mut ld = LogicalDrive::new(adapter_id, ldrive_id);
    let mut per_span = None;
    let mut span_depth = None;

    for line in lines {
        let line = line.as_str();
        if extractor.assign_text(&mut ld.raid_level, line, "RAID Level          :")
            || extractor.assign_text(&mut ld.size, line, "Size                :")
            || extractor.assign_text(&mut ld.state, line, "State               :")
            || extractor.assign_text(&mut ld.strip_size, line, "Strip Size          :")
        {
            continue;
        }
        if let Some(count) = extractor.int_token(line, DRIVE_COUNT, 4) {
            ld.drive_count = count;
        } else if let Some(count) = extractor.int(line, DRIVES_PER_SPAN, &[':'], 1) {
            per_span = Some(count);
        } else if let Some(depth) = extractor.int(line, SPAN_DEPTH, &[':'], 1) {
            span_depth = Some(depth);
        }
    }

    if ld.drive_count == 0 {
        if let (Some(per_span), Some(depth)) = (per_span, span_depth) {
            ld.drive_count = per_span.saturating_mul(depth);
        }
    }

    ld
}

/// Where the membership scan is within `-LdPdInfo` output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipScan {
    /// Looking for the target `Virtual Drive: <id>` header
    Seeking,
    /// Inside the target block; `declared` is the drive count once read.
    /// Spanned drives declare it as a per-span count and a span depth.
    InTargetBlock {
        declared: Option<usize>,
        per_span: Option<usize>,
    },
    /// Reached the next block's header
    Finished { declared: Option<usize> },
}

impl MembershipScan {
    /// Advance on one output line. Drive entries seen while the count is
    /// still unknown are an error.
    fn advance(
        self,
        extractor: &FieldExtractor,
        ldrive_id: u32,
        line: &str,
    ) -> RaidResult<MembershipScan> {
        let header = extractor.int(line, VIRTUAL_DRIVE, &[':'], 1);

        Ok(match self {
            MembershipScan::Seeking => match header {
                Some(id) if id == ldrive_id => MembershipScan::InTargetBlock {
                    declared: None,
                    per_span: None,
                },
                _ => MembershipScan::Seeking,
            },
            MembershipScan::InTargetBlock { declared, .. } if header.is_some() => {
                MembershipScan::Finished { declared }
            }
            MembershipScan::InTargetBlock {
                declared: None,
                per_span,
            } => {
                if let Some(count) = extractor.int(line, DRIVE_COUNT, &[':'], 1) {
                    MembershipScan::InTargetBlock {
                        declared: Some(count as usize),
                        per_span,
                    }
                } else if let Some(count) = extractor.int(line, DRIVES_PER_SPAN, &[':'], 1) {
                    MembershipScan::InTargetBlock {
                        declared: None,
                        per_span: Some(count as usize),
                    }
                } else if let (Some(count), Some(depth)) =
                    (per_span, extractor.int(line, SPAN_DEPTH, &[':'], 1))
                {
                    MembershipScan::InTargetBlock {
                        declared: Some(count.saturating_mul(depth as usize)),
                        per_span,
                    }
                } else if line.contains(ENCLOSURE_ID) || line.contains(SLOT_NUMBER) {
                    let missing = if per_span.is_some() {
                        "a span depth"
                    } else {
                        "a drive count"
                    };
                    return Err(RaidError::ConsistencyError(format!(
                        "virtual drive {} lists drives without {}",
                        ldrive_id, missing
                    )));
                } else {
                    self
                }
            }
            other => other,
        })
    }
}

/// Collect the enclosure/slot pairs belonging to `ldrive_id`.
///
/// The block's `Number Of Drives` line bounds how many pairs are taken;
/// extra pairs are ignored. Spanned drives give the bound as
/// `Number Of Drives per span` times `Span Depth`. Drive entries before
/// the bound is known, a missing block, or uneven enclosure/slot lists are
/// reported as inconsistencies.
pub fn parse_ld_membership(
    extractor: &FieldExtractor,
    ldrive_id: u32,
    lines: &[String],
) -> RaidResult<Vec<DiskAddress>> {
    let mut state = MembershipScan::Seeking;
    let mut enclosures: Vec<u32> = Vec::new();
    let mut slots: Vec<u32> = Vec::new();

    for line in lines {
        state = state.advance(extractor, ldrive_id, line)?;

        match state {
            MembershipScan::InTargetBlock {
                declared: Some(bound),
                ..
            } => {
                if line.contains(ENCLOSURE_ID) {
                    if enclosures.len() < bound {
                        let id = extractor
                            .int(line, ENCLOSURE_ID, &[':'], 1)
                            .ok_or_else(|| unparsable(ldrive_id, line))?;
                        enclosures.push(id);
                    }
                } else if line.contains(SLOT_NUMBER) && slots.len() < bound {
                    let slot = extractor
                        .int(line, SLOT_NUMBER, &[':'], 1)
                        .ok_or_else(|| unparsable(ldrive_id, line))?;
                    slots.push(slot);
                }
            }
            MembershipScan::Finished { .. } => break,
            _ => {}
        }
    }

    let declared = match state {
        MembershipScan::Seeking => {
            return Err(RaidError::ConsistencyError(format!(
                "virtual drive {} not present in -LdPdInfo output",
                ldrive_id
            )))
        }
        MembershipScan::InTargetBlock { declared: None, .. }
        | MembershipScan::Finished { declared: None } => {
            return Err(RaidError::ConsistencyError(format!(
                "virtual drive {} has no drive count",
                ldrive_id
            )))
        }
        MembershipScan::InTargetBlock {
            declared: Some(count),
            ..
        }
        | MembershipScan::Finished {
            declared: Some(count),
        } => count,
    };

    if enclosures.len() != declared || slots.len() != declared {
        return Err(RaidError::ConsistencyError(format!(
            "virtual drive {} declares {} drive(s) but lists {} enclosure id(s) and {} slot(s)",
            ldrive_id,
            declared,
            enclosures.len(),
            slots.len()
        )));
    }

    Ok(enclosures
        .into_iter()
        .zip(slots)
        .map(|(enclosure_id, slot)| DiskAddress::new(enclosure_id, slot))
        .collect())
}

fn unparsable(ldrive_id: u32, line: &str) -> RaidError {
    RaidError::ConsistencyError(format!(
        "virtual drive {}: unparsable drive entry '{}'",
        ldrive_id,
        line.trim()
    ))
}

/// Decode the composite cache policy line from `-LDGetProp -Cache`:
///
/// `Adapter 0-VD 0(target id: 0): Cache Policy:WriteBack, ReadAdaptive, Direct, No Write Cache if bad BBU`
///
/// The comma-separated parts always come in the order write, read, cache,
/// BBU. Unrecognised parts decode as `Unknown`.
pub fn parse_cache_policy_line(
    line: &str,
) -> Option<(WritePolicy, ReadPolicy, CachePolicy, BbuCachePolicy)> {
    if !line.contains(CACHE_POLICY) {
        return None;
    }
    let policies = segment(line, &[':'], 3).unwrap_or("");
    let mut parts = policies.split(',').map(str::trim);

    let write = WritePolicy::from_phrase(parts.next().unwrap_or(""));
    let read = ReadPolicy::from_phrase(parts.next().unwrap_or(""));
    let cache = CachePolicy::from_phrase(parts.next().unwrap_or(""));
    let bbu = BbuCachePolicy::from_phrase(parts.next().unwrap_or(""));

    Some((write, read, cache, bbu))
}

impl<R: ToolRunner> MegaCli<R> {
    /// Number of logical drives. Like `adapter_count`, the tool returns the
    /// count as its exit code, so only a liveness probe guards the result.
    pub fn logical_drive_count(&self, adapter_id: u32) -> RaidResult<u32> {
        self.require_tool()?;
        let lines = self.query(
            &query_args(["-LDGetNum".to_string(), format!("-a{}", adapter_id)]),
            ExitPolicy::IgnoreExit,
        )?;
        Ok(parse_ld_count(self.extractor(), &lines))
    }

    /// Logical drive ids on the adapter; `expected` is the count the caller
    /// obtained from [`MegaCli::logical_drive_count`].
    pub fn logical_drive_ids(&self, adapter_id: u32, expected: u32) -> RaidResult<Vec<u32>> {
        let lines = self.query(
            &query_args([
                "-LDInfo".to_string(),
                "-Lall".to_string(),
                format!("-a{}", adapter_id),
            ]),
            ExitPolicy::Strict,
        )?;

        let ids = parse_ld_ids(self.extractor(), &lines);
        if ids.len() != expected as usize {
            return Err(RaidError::ConsistencyError(format!(
                "expected {} logical drive(s) on adapter {} but found {}",
                expected,
                adapter_id,
                ids.len()
            )));
        }
        Ok(ids)
    }

    pub fn logical_drive(&self, adapter_id: u32, ldrive_id: u32) -> RaidResult<LogicalDrive> {
        let lines = self.query(
            &query_args([
                "-LDInfo".to_string(),
                format!("-L{}", ldrive_id),
                format!("-a{}", adapter_id),
            ]),
            ExitPolicy::Strict,
        )?;
        Ok(parse_logical_drive(self.extractor(), adapter_id, ldrive_id, &lines))
    }

    /// Enclosure/slot addresses of the drives backing `ldrive_id`
    pub fn logical_drive_disks(&self, adapter_id: u32, ldrive_id: u32) -> RaidResult<Vec<DiskAddress>> {
        let lines = self.query(
            &query_args(["-LdPdInfo".to_string(), format!("-a{}", adapter_id)]),
            ExitPolicy::Strict,
        )?;
        parse_ld_membership(self.extractor(), ldrive_id, &lines)
    }

    pub fn logical_drive_properties(
        &self,
        adapter_id: u32,
        ldrive_id: u32,
    ) -> RaidResult<LogicalDriveProperties> {
        let extractor = self.extractor();
        let mut props = LogicalDriveProperties::new(adapter_id, ldrive_id);

        for line in self.ld_prop_query("-Cache", adapter_id, ldrive_id)? {
            if let Some((write, read, cache, bbu)) = parse_cache_policy_line(&line) {
                props.write_policy = write;
                props.read_policy = read;
                props.cache_policy = cache;
                props.bbu_cache_policy = bbu;
                if write == WritePolicy::Unknown
                    || read == ReadPolicy::Unknown
                    || cache == CachePolicy::Unknown
                    || bbu == BbuCachePolicy::Unknown
                {
                    tracing::warn!(line = %line.trim(), "Unrecognised cache policy phrase");
                }
            }
        }

        // "Adapter 0-VD 0(target id: 0): Name:backup"
        for line in self.ld_prop_query("-Name", adapter_id, ldrive_id)? {
            if let Some(name) = extractor.text(&line, LD_NAME, &[':'], 3) {
                props.name = name;
            }
        }

        Ok(props)
    }

    fn ld_prop_query(&self, property: &str, adapter_id: u32, ldrive_id: u32) -> RaidResult<Vec<String>> {
        self.query(
            &query_args([
                "-LDGetProp".to_string(),
                property.to_string(),
                format!("-L{}", ldrive_id),
                format!("-a{}", adapter_id),
            ]),
            ExitPolicy::Strict,
        )
    }

    /// Apply logical drive properties in a fixed order (cache, write, read,
    /// BBU, then name if non-empty), stopping at the first failure. Already
    /// applied properties are not rolled back.
    pub fn set_logical_drive_properties(&self, props: &LogicalDriveProperties) -> RaidResult<usize> {
        logical_drive_properties_plan(props).execute(self.runner())
    }

    pub fn delete_logical_drive(&self, adapter_id: u32, ldrive_id: u32) -> RaidResult<()> {
        MutationPlan::new()
            .with_step(MutationStep::new(
                "CfgLdDel",
                mutation_args([
                    "-CfgLdDel".to_string(),
                    format!("-L{}", ldrive_id),
                    format!("-a{}", adapter_id),
                ]),
            ))
            .execute(self.runner())
            .map(|_| ())
    }

    /// Create a logical drive from `disks` with the policies in `props`.
    ///
    /// The drive list is assembled before anything runs; if it does not fit
    /// the configured capacity no command is issued.
    pub fn add_logical_drive(
        &self,
        props: &LogicalDriveProperties,
        disks: &[DiskAddress],
        raid_level: &str,
        strip_size: &str,
    ) -> RaidResult<()> {
        if disks.is_empty() {
            return Err(RaidError::ConsistencyError(
                "a logical drive needs at least one physical drive".to_string(),
            ));
        }

        let pd_list = PdListBuilder::build(disks, self.max_pd_list_len())?;
        let plan = add_logical_drive_plan(props, &pd_list, raid_level, strip_size);
        plan.execute(self.runner()).map(|_| ())
    }
}

/// Ordered commands for `set_logical_drive_properties`. Policies that are
/// `Unknown` are skipped since the tool has no spelling for them.
pub(crate) fn logical_drive_properties_plan(props: &LogicalDriveProperties) -> MutationPlan {
    let target = [format!("-L{}", props.ldrive_id), format!("-a{}", props.adapter_id)];
    let mut plan = MutationPlan::new();

    let policies = known_policies(
        props.ldrive_id,
        [
            ("cache policy", props.cache_policy.as_arg()),
            ("write policy", props.write_policy.as_arg()),
            ("read policy", props.read_policy.as_arg()),
            ("BBU cache policy", props.bbu_cache_policy.as_arg()),
        ],
    );

    for (label, arg) in policies {
        let mut parts = vec!["-LDSetProp".to_string(), arg.to_string()];
        parts.extend(target.iter().cloned());
        plan.push(MutationStep::new(label, mutation_args(parts)));
    }

    if !props.name.is_empty() {
        let mut parts = vec![
            "-LDSetProp".to_string(),
            "-Name".to_string(),
            props.name.clone(),
        ];
        parts.extend(target.iter().cloned());
        plan.push(MutationStep::new("name", mutation_args(parts)));
    }

    plan
}

/// Keep the policies the tool has a spelling for, in order, warning about
/// each `Unknown` one that is left out
fn known_policies<const N: usize>(
    ldrive_id: u32,
    policies: [(&'static str, Option<&'static str>); N],
) -> Vec<(&'static str, &'static str)> {
    policies
        .into_iter()
        .filter_map(|(label, arg)| {
            if arg.is_none() {
                tracing::warn!(ldrive_id, "Skipping {} with unknown value", label);
            }
            arg.map(|arg| (label, arg))
        })
        .collect()
}

/// Single-step plan for `-CfgLdAdd`, with the 254 exit quirk accepted
pub(crate) fn add_logical_drive_plan(
    props: &LogicalDriveProperties,
    pd_list: &str,
    raid_level: &str,
    strip_size: &str,
) -> MutationPlan {
    let mut parts = vec![
        "-CfgLdAdd".to_string(),
        format!("-r{}[{}]", raid_level, pd_list),
    ];
    parts.extend(
        known_policies(
            props.ldrive_id,
            [
                ("write policy", props.write_policy.as_arg()),
                ("read policy", props.read_policy.as_arg()),
                ("cache policy", props.cache_policy.as_arg()),
                ("BBU cache policy", props.bbu_cache_policy.as_arg()),
            ],
        )
        .into_iter()
        .map(|(_, arg)| arg.to_string()),
    );
    if !strip_size.is_empty() {
        parts.push(format!("-strpsz{}", strip_size));
    }
    parts.push(format!("-a{}", props.adapter_id));

    MutationPlan::new().with_step(
        MutationStep::new("CfgLdAdd", mutation_args(parts)).accept_code(ADD_LD_SUCCESS_QUIRK),
    )
}
