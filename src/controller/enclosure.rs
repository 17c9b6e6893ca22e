use super::{query_args, MegaCli};
use crate::model::Enclosure;
use crate::parsing::{FieldExtractor, OrdinalSelector};
use crate::tool::{ExitPolicy, ToolRunner};
use crate::{RaidError, RaidResult};

/// Fields tracked per enclosure block in `-EncInfo` output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnclosureField {
    DeviceId,
    SlotCount,
    PowerSupplyCount,
    FanCount,
    Status,
    Vendor,
    Product,
}

impl EnclosureField {
    pub const ALL: [EnclosureField; 7] = [
        EnclosureField::DeviceId,
        EnclosureField::SlotCount,
        EnclosureField::PowerSupplyCount,
        EnclosureField::FanCount,
        EnclosureField::Status,
        EnclosureField::Vendor,
        EnclosureField::Product,
    ];

    /// Literal marker, indentation included
    pub fn marker(&self) -> &'static str {
        match self {
            EnclosureField::DeviceId => "    Device ID                     :",
            EnclosureField::SlotCount => "    Number of Slots               :",
            EnclosureField::PowerSupplyCount => "    Number of Power Supplies      :",
            EnclosureField::FanCount => "    Number of Fans                :",
            EnclosureField::Status => "    Status                        :",
            EnclosureField::Vendor => "        Vendor Identification     :",
            EnclosureField::Product => "        Product Identification    :",
        }
    }

    /// First field whose marker occurs in `line`
    pub fn match_line(line: &str) -> Option<EnclosureField> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| line.contains(field.marker()))
    }
}

const ENCLOSURE_COUNT: &str = "    Number of enclosures on adapter";

/// Select the enclosure at `ordinal` from the `-EncInfo` report.
///
/// Returns the populated record together with the selector so callers can
/// tell whether the ordinal was present at all.
pub fn parse_enclosure(
    extractor: &FieldExtractor,
    adapter_id: u32,
    ordinal: usize,
    lines: &[String],
) -> (Enclosure, OrdinalSelector<EnclosureField>) {
    let mut enclosure = Enclosure::new(adapter_id);
    let mut selector = OrdinalSelector::new(ordinal);

    for line in lines {
        let Some(field) = EnclosureField::match_line(line) else {
            continue;
        };
        if !selector.offer(field) {
            continue;
        }

        let marker = field.marker();
        match field {
            EnclosureField::DeviceId => {
                if let Some(value) = extractor.int(line, marker, &[':'], 1) {
                    enclosure.device_id = value;
                }
            }
            EnclosureField::SlotCount => {
                if let Some(value) = extractor.int(line, marker, &[':'], 1) {
                    enclosure.slot_count = value;
                }
            }
            EnclosureField::PowerSupplyCount => {
                if let Some(value) = extractor.int(line, marker, &[':'], 1) {
                    enclosure.power_supply_count = value;
                }
            }
            EnclosureField::FanCount => {
                if let Some(value) = extractor.int(line, marker, &[':'], 1) {
                    enclosure.fan_count = value;
                }
            }
            EnclosureField::Status => {
                extractor.assign_text(&mut enclosure.status, line, marker);
            }
            EnclosureField::Vendor => {
                extractor.assign_text(&mut enclosure.vendor, line, marker);
            }
            EnclosureField::Product => {
                extractor.assign_text(&mut enclosure.product, line, marker);
            }
        }
    }

    (enclosure, selector)
}

/// Enclosure count from the `-EncInfo` header:
/// `    Number of enclosures on adapter 0 -- 2`
pub fn parse_enclosure_count(extractor: &FieldExtractor, lines: &[String]) -> u32 {
    lines
        .iter()
        .filter_map(|line| extractor.int(line, ENCLOSURE_COUNT, &['-'], 1))
        .last()
        .unwrap_or(0)
}

impl<R: ToolRunner> MegaCli<R> {
    /// Enclosure at position `ordinal` (0-based) in the adapter's report.
    /// MegaCLI cannot address a single enclosure, so the whole report is
    /// read and the Nth block picked out.
    pub fn enclosure(&self, adapter_id: u32, ordinal: usize) -> RaidResult<Enclosure> {
        let lines = self.query(&encinfo_args(adapter_id), ExitPolicy::Strict)?;
        let (enclosure, selector) = parse_enclosure(self.extractor(), adapter_id, ordinal, &lines);

        let seen = selector.occurrences(EnclosureField::DeviceId);
        if seen <= ordinal {
            return Err(RaidError::ConsistencyError(format!(
                "enclosure ordinal {} requested but adapter {} reports {} enclosure block(s)",
                ordinal, adapter_id, seen
            )));
        }

        Ok(enclosure)
    }

    pub fn enclosure_count(&self, adapter_id: u32) -> RaidResult<u32> {
        let lines = self.query(&encinfo_args(adapter_id), ExitPolicy::Strict)?;
        Ok(parse_enclosure_count(self.extractor(), &lines))
    }

    /// Every enclosure on the adapter, in report order
    pub fn enclosures(&self, adapter_id: u32) -> RaidResult<Vec<Enclosure>> {
        let count = self.enclosure_count(adapter_id)?;
        (0..count as usize)
            .map(|ordinal| self.enclosure(adapter_id, ordinal))
            .collect()
    }
}

fn encinfo_args(adapter_id: u32) -> Vec<String> {
    query_args(["-EncInfo".to_string(), format!("-a{}", adapter_id)])
}
