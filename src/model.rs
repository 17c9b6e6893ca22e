// MegaRAID inventory records
//
// Every record is built fresh per query and handed to the caller; nothing
// here is cached or shared.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RAID host controller as reported by `-AdpAllInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adapter {
    pub adapter_id: u32,
    pub product_name: String,
    pub serial: String,
    pub firmware: String,
    pub bbu: String,
    pub memory: String,
    pub host_interface: String,
    pub logical_drive_count: u32,
    pub disk_count: u32,
    pub cluster_permitted: String,
    pub cluster_active: String,
}

impl Adapter {
    pub fn new(adapter_id: u32) -> Self {
        Self {
            adapter_id,
            ..Self::default()
        }
    }
}

/// Settable adapter properties (`-AdpGetProp` / `-AdpSetProp`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterProperties {
    pub adapter_id: u32,
    /// Seconds between cache flushes
    pub cache_flush_interval: u32,
    /// Percent of controller resources given to rebuilds
    pub rebuild_rate: u32,
    pub cluster_enabled: bool,
    pub ncq_enabled: bool,
}

impl AdapterProperties {
    pub fn new(adapter_id: u32) -> Self {
        Self {
            adapter_id,
            ..Self::default()
        }
    }
}

/// Enclosure/slot pair used to address a physical drive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiskAddress {
    pub enclosure_id: u32,
    pub slot: u32,
}

impl DiskAddress {
    pub fn new(enclosure_id: u32, slot: u32) -> Self {
        Self { enclosure_id, slot }
    }
}

impl fmt::Display for DiskAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.enclosure_id, self.slot)
    }
}

impl FromStr for DiskAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (encl, slot) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected <enclosure>:<slot>, got '{}'", s))?;
        let enclosure_id = encl
            .trim()
            .parse()
            .map_err(|_| format!("invalid enclosure id '{}'", encl))?;
        let slot = slot
            .trim()
            .parse()
            .map_err(|_| format!("invalid slot number '{}'", slot))?;
        Ok(Self { enclosure_id, slot })
    }
}

/// Physical drive as reported by `-pdInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disk {
    pub adapter_id: u32,
    pub enclosure_id: u32,
    pub slot_num: u32,
    /// False when the tool reports the address as not found
    pub present: bool,
    /// True when the drive reports a position inside a logical drive
    pub part_of_logical_drive: bool,
    pub pd_type: String,
    pub raw_size: String,
    pub state: String,
    pub inquiry: String,
    pub link_speed: String,
}

impl Disk {
    pub fn new(adapter_id: u32) -> Self {
        Self {
            adapter_id,
            present: true,
            ..Self::default()
        }
    }

    pub fn address(&self) -> DiskAddress {
        DiskAddress::new(self.enclosure_id, self.slot_num)
    }
}

/// Enclosure selected by ordinal from the `-EncInfo` report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    pub adapter_id: u32,
    pub device_id: u32,
    pub slot_count: u32,
    pub power_supply_count: u32,
    pub fan_count: u32,
    pub status: String,
    pub vendor: String,
    pub product: String,
}

impl Enclosure {
    pub fn new(adapter_id: u32) -> Self {
        Self {
            adapter_id,
            ..Self::default()
        }
    }
}

/// Logical (virtual) drive as reported by `-LDInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalDrive {
    pub adapter_id: u32,
    pub ldrive_id: u32,
    pub raid_level: String,
    pub size: String,
    pub state: String,
    pub strip_size: String,
    pub drive_count: u32,
}

impl LogicalDrive {
    pub fn new(adapter_id: u32, ldrive_id: u32) -> Self {
        Self {
            adapter_id,
            ldrive_id,
            ..Self::default()
        }
    }
}

/// Declares a policy enum with its MegaCLI argument spelling.
///
/// `Unknown` is never sent to the tool; it stands for any phrase this
/// crate does not recognise yet.
macro_rules! tool_policy {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $arg:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant,)+
            #[default]
            Unknown,
        }

        impl $name {
            /// Argument spelling understood by `-LDSetProp` / `-CfgLdAdd`
            pub fn as_arg(&self) -> Option<&'static str> {
                match self {
                    $($name::$variant => Some($arg),)+
                    $name::Unknown => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_arg().unwrap_or("UNKNOWN"))
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $(v if v.eq_ignore_ascii_case($arg) => Ok($name::$variant),)+
                    v if v.eq_ignore_ascii_case("UNKNOWN") => Ok($name::Unknown),
                    other => Err(format!(
                        "invalid {} '{}'",
                        stringify!($name),
                        other
                    )),
                }
            }
        }
    };
}

tool_policy!(
    /// Write cache policy
    WritePolicy {
        WriteThrough => "WT",
        WriteBack => "WB",
    }
);

tool_policy!(
    /// Read-ahead policy
    ReadPolicy {
        NoReadAhead => "NORA",
        ReadAhead => "RA",
        Adaptive => "ADRA",
    }
);

tool_policy!(
    /// I/O cache policy
    CachePolicy {
        Direct => "Direct",
        Cached => "Cached",
    }
);

tool_policy!(
    /// Write caching behaviour when the BBU is bad
    BbuCachePolicy {
        NoCachedBadBbu => "NoCachedBadBBU",
        CachedBadBbu => "CachedBadBBU",
    }
);

impl WritePolicy {
    pub fn from_phrase(phrase: &str) -> Self {
        if phrase.contains("WriteThrough") {
            WritePolicy::WriteThrough
        } else if phrase.contains("WriteBack") {
            WritePolicy::WriteBack
        } else {
            WritePolicy::Unknown
        }
    }
}

impl ReadPolicy {
    pub fn from_phrase(phrase: &str) -> Self {
        // "ReadAheadNone" contains "ReadAhead", so it must be tested first
        if phrase.contains("ReadAheadNone") {
            ReadPolicy::NoReadAhead
        } else if phrase.contains("ReadAhead") {
            ReadPolicy::ReadAhead
        } else if phrase.contains("ReadAdaptive") {
            ReadPolicy::Adaptive
        } else {
            ReadPolicy::Unknown
        }
    }
}

impl CachePolicy {
    pub fn from_phrase(phrase: &str) -> Self {
        if phrase.contains("Direct") {
            CachePolicy::Direct
        } else if phrase.contains("Cached") {
            CachePolicy::Cached
        } else {
            CachePolicy::Unknown
        }
    }
}

impl BbuCachePolicy {
    pub fn from_phrase(phrase: &str) -> Self {
        if phrase.contains("No Write Cache if bad BBU") {
            BbuCachePolicy::NoCachedBadBbu
        } else if phrase.contains("Write Cache OK if bad BBU") {
            BbuCachePolicy::CachedBadBbu
        } else {
            BbuCachePolicy::Unknown
        }
    }
}

/// Settable logical drive properties (`-LDGetProp` / `-LDSetProp`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalDriveProperties {
    pub adapter_id: u32,
    pub ldrive_id: u32,
    pub write_policy: WritePolicy,
    pub read_policy: ReadPolicy,
    pub cache_policy: CachePolicy,
    pub bbu_cache_policy: BbuCachePolicy,
    pub name: String,
}

impl LogicalDriveProperties {
    pub fn new(adapter_id: u32, ldrive_id: u32) -> Self {
        Self {
            adapter_id,
            ldrive_id,
            ..Self::default()
        }
    }
}
