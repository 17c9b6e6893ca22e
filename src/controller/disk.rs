use super::{query_args, MegaCli};
use crate::model::{Disk, Enclosure};
use crate::parsing::FieldExtractor;
use crate::tool::{ExitPolicy, ToolRunner};
use crate::RaidResult;

const NOT_FOUND: &str = "is not found.";
const DRIVE_POSITION: &str = "Drive's position:";

/// Populate a [`Disk`] from `-pdInfo` output.
///
/// `"... is not found."` marks the slot empty; the scan keeps going so the
/// rest of the stream is still consumed.
pub fn parse_disk(extractor: &FieldExtractor, adapter_id: u32, lines: &[String]) -> Disk {
    let mut disk = Disk::new(adapter_id);

    for line in lines {
        let line = line.as_str();

        if line.contains(NOT_FOUND) {
            disk.present = false;
            continue;
        }

        if let Some(id) = extractor.int_token(line, "Enclosure Device ID:", 3) {
            disk.enclosure_id = id;
        } else if let Some(slot) = extractor.int_token(line, "Slot Number:", 2) {
            disk.slot_num = slot;
        } else if extractor.assign_text(&mut disk.pd_type, line, "PD Type:")
            || extractor.assign_text(&mut disk.raw_size, line, "Raw Size:")
            || extractor.assign_text(&mut disk.state, line, "Firmware state:")
            || extractor.assign_text(&mut disk.inquiry, line, "Inquiry Data:")
            || extractor.assign_text(&mut disk.link_speed, line, "Link Speed:")
        {
            continue;
        } else if line.contains(DRIVE_POSITION) {
            disk.part_of_logical_drive = true;
        }
    }

    disk
}

impl<R: ToolRunner> MegaCli<R> {
    /// Look up the physical drive at `enclosure_id:slot`. An empty slot is
    /// returned as a record with `present == false`, not as an error.
    pub fn disk(&self, adapter_id: u32, enclosure_id: u32, slot: u32) -> RaidResult<Disk> {
        let lines = self.query(
            &query_args([
                "-pdInfo".to_string(),
                format!("-PhysDrv[{}:{}]", enclosure_id, slot),
                format!("-a{}", adapter_id),
            ]),
            ExitPolicy::Strict,
        )?;

        let disk = parse_disk(self.extractor(), adapter_id, &lines);
        if !disk.present {
            tracing::debug!(adapter_id, enclosure_id, slot, "No drive in slot");
        }
        Ok(disk)
    }

    /// Present drives in every slot of `enclosure`, one `-pdInfo` per slot
    pub fn enclosure_disks(&self, enclosure: &Enclosure) -> RaidResult<Vec<Disk>> {
        let mut disks = Vec::new();
        for slot in 0..enclosure.slot_count {
            let disk = self.disk(enclosure.adapter_id, enclosure.device_id, slot)?;
            if disk.present {
                disks.push(disk);
            }
        }
        Ok(disks)
    }
}
