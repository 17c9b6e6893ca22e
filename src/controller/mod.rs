// MegaRAID controller operations over MegaCLI
//
// Organized structure:
// - adapter.rs: adapter inventory, adapter properties, boot drive check
// - disk.rs: physical drive lookup by enclosure/slot
// - enclosure.rs: enclosure selection from the -EncInfo report
// - logical_drive.rs: logical drive inventory, membership, properties,
//   create and delete
// - mutation.rs: ordered mutating command plans
// - pd_list.rs: capacity-bounded enclosure:slot list for -CfgLdAdd

mod adapter;
mod disk;
mod enclosure;
mod logical_drive;
pub mod mutation;
pub mod pd_list;

pub use adapter::{parse_adapter, parse_adapter_count, parse_boot_drive, parse_version};
pub use disk::parse_disk;
pub use enclosure::{parse_enclosure, parse_enclosure_count, EnclosureField};
pub use logical_drive::{
    parse_cache_policy_line, parse_ld_count, parse_ld_ids, parse_ld_membership,
    parse_logical_drive, MembershipScan, ADD_LD_SUCCESS_QUIRK,
};
pub use mutation::{MutationPlan, MutationStep};
pub use pd_list::PdListBuilder;

use crate::parsing::FieldExtractor;
use crate::tool::{display_command, ExitPolicy, ToolRunner};
use crate::{RaidError, RaidResult, ToolConfig};

/// Build a MegaCLI argument list
pub(crate) fn cli_args<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}

/// Arguments for a read query; tool logging is always suppressed
pub(crate) fn query_args<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = cli_args(parts);
    args.push("-NoLog".to_string());
    args
}

/// Arguments for a mutating command
pub(crate) fn mutation_args<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = cli_args(parts);
    args.push("-Silent".to_string());
    args.push("-NoLog".to_string());
    args
}

/// Handle to a MegaCLI installation that answered the version probe.
///
/// Holds no inventory state: every call runs the tool again and returns a
/// freshly built record. Calls are synchronous and must not overlap against
/// the same controller.
#[derive(Debug)]
pub struct MegaCli<R: ToolRunner> {
    runner: R,
    extractor: FieldExtractor,
    max_pd_list_len: usize,
    version: String,
}

impl<R: ToolRunner> MegaCli<R> {
    /// Probe the tool and return a handle, or `ToolUnavailable` when the
    /// probe fails. No other command is run before the probe succeeds.
    pub fn connect(runner: R, config: &ToolConfig) -> RaidResult<Self> {
        config.validate()?;
        let version = probe_version(&runner)?;
        tracing::info!(version = %version, "MegaCLI available");

        Ok(Self {
            runner,
            extractor: FieldExtractor::new(config.max_attr_len),
            max_pd_list_len: config.max_pd_list_len,
            version,
        })
    }

    /// Version reported when the handle was created
    pub fn connected_version(&self) -> &str {
        &self.version
    }

    /// Run the version probe again
    pub fn version(&self) -> RaidResult<String> {
        probe_version(&self.runner)
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub(crate) fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    pub(crate) fn max_pd_list_len(&self) -> usize {
        self.max_pd_list_len
    }

    /// Run a read query and return its lines after applying `policy`
    pub(crate) fn query(&self, args: &[String], policy: ExitPolicy) -> RaidResult<Vec<String>> {
        let output = self.runner.run(args)?;
        policy.check(&display_command(args), output.outcome)?;
        Ok(output.lines)
    }

    /// Liveness check used by the count queries before trusting their
    /// exit-code-as-payload output
    pub(crate) fn require_tool(&self) -> RaidResult<()> {
        probe_version(&self.runner).map(|_| ())
    }
}

/// Run `-help` and pull the version token from the banner line
fn probe_version<R: ToolRunner + ?Sized>(runner: &R) -> RaidResult<String> {
    let args = query_args(["-help"]);
    let output = runner
        .run(&args)
        .map_err(|e| RaidError::ToolUnavailable(e.to_string()))?;

    if !output.outcome.is_success() {
        return Err(RaidError::ToolUnavailable(format!(
            "version probe exited with {:?}",
            output.outcome
        )));
    }

    parse_version(&output.lines)
        .ok_or_else(|| RaidError::ToolUnavailable("no version banner in -help output".to_string()))
}
