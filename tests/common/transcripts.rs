/// Canned MegaCLI output
///
/// Layouts follow what MegaCLI 8.x prints, including the fixed column
/// padding the parsers key on.

pub struct MockMegaCliData;

/// One logical drive in an `-LdPdInfo` report
#[allow(dead_code)]
pub struct MockLogicalDrive<'a> {
    pub id: u32,
    pub raid_level: &'a str,
    pub members: &'a [(u32, u32)],
}

/// One enclosure block in an `-EncInfo` report
#[allow(dead_code)]
pub struct MockEnclosure<'a> {
    pub device_id: u32,
    pub slots: u32,
    pub status: &'a str,
    pub vendor: &'a str,
    pub product: &'a str,
}

#[allow(dead_code)]
impl MockMegaCliData {
    /// `-help` banner
    pub fn help(version: &str) -> String {
        format!(
            r#"
      MegaCLI SAS RAID Management Tool  Ver {} Dec 16, 2013

    (c)Copyright 2013, LSI Corporation, All Rights Reserved.

NOTE: The following options may be given at the end of any command below:
    [-Silent] [-AppLogFile filename] [-NoLog] [-page[N]]"#,
            version
        )
    }

    pub fn adp_count(count: u32) -> String {
        format!(
            "\nController Count: {}.\n\nExit Code: 0x{:02x}",
            count, count
        )
    }

    pub fn adp_all_info(product: &str, serial: &str, virtual_drives: u32, disks: u32) -> String {
        format!(
            r#"
Adapter #0

==============================================================================
                    Versions
                ================
Product Name    : {}
Serial No       : {}
FW Package Build: 21.3.2-0005

                    Mfg. Data
                ================
Mfg. Date       : 03/18/14
Rework Date     : 03/18/14
Revision No     : A05

                HW Configuration
                ================
SAS Address      : 5b8ca3a0f4f8c600
BBU              : Present
Alarm            : Absent
NVRAM            : Present
Memory           : Present
Flash            : Present
Memory Size      : 1024MB
TPM              : Absent

                Device Present
                ================
Virtual Drives    : {}
  Degraded        : 0
  Offline         : 0
Physical Devices  : {}
  Disks           : {}
  Critical Disks  : 0
  Failed Disks    : 0

                Supported Adapter Operations
                ================
Rebuild Rate                    : Yes
Cluster Support                 : No

Host Interface  : PCIE

Cluster Permitted     : No
Cluster Active        : No

Exit Code: 0x00"#,
            product,
            serial,
            virtual_drives,
            disks + 2,
            disks
        )
    }

    pub fn pd_info(enclosure: u32, slot: u32, state: &str, in_array: bool) -> String {
        let position = if in_array {
            "Drive's position: DiskGroup: 0, Span: 0, Arm: 0\n"
        } else {
            ""
        };
        format!(
            r#"
Enclosure Device ID: {}
Slot Number: {}
{}Enclosure position: 1
Device Id: {}
WWN: 5000C500A1B2C3D4
Sequence Number: 2
Media Error Count: 0
Other Error Count: 0
Predictive Failure Count: 0
PD Type: SAS

Raw Size: 558.911 GB [0x45dd2fb0 Sectors]
Non Coerced Size: 558.411 GB [0x45cd2fb0 Sectors]
Coerced Size: 558.375 GB [0x45cc0000 Sectors]
Firmware state: {}
Device Firmware Level: ES65
Inquiry Data: SEAGATE ST3600057SS     ES656SE1ANH9
Device Speed: 6.0Gb/s
Link Speed: 6.0Gb/s
Media Type: Hard Disk Device

Exit Code: 0x00"#,
            enclosure, slot, position, slot, state
        )
    }

    pub fn pd_not_found(adapter: u32, enclosure: u32, slot: u32) -> String {
        format!(
            "\nAdapter {}: Device at EnclId-{} SlotId-{}  is not found.\n",
            adapter, enclosure, slot
        )
    }

    pub fn enc_info(adapter: u32, enclosures: &[MockEnclosure<'_>]) -> String {
        let mut out = format!(
            "\n    Number of enclosures on adapter {} -- {}\n",
            adapter,
            enclosures.len()
        );
        for (index, enclosure) in enclosures.iter().enumerate() {
            out.push_str(&format!(
                r#"
    Enclosure {}:
    Device ID                     : {}
    Number of Slots               : {}
    Number of Power Supplies      : 2
    Number of Fans                : 3
    Number of Temperature Sensors : 1
    Number of Alarms              : 0
    Number of SIM Modules         : 1
    Number of Physical Drives     : {}
    Status                        : {}
    Position                      : 1
    Connector Name                : Port 0 - 3
    Enclosure type                : SES
    Partner Device Id             : Unavailable

    Inquiry data                  :
        Vendor Identification     : {}
        Product Identification    : {}
        Product Revision Level    : 2.25
        Vendor Specific           :
"#,
                index,
                enclosure.device_id,
                enclosure.slots,
                enclosure.slots,
                enclosure.status,
                enclosure.vendor,
                enclosure.product
            ));
        }
        out.push_str("\nExit Code: 0x00");
        out
    }

    pub fn ld_get_num(adapter: u32, count: u32) -> String {
        format!(
            "\nNumber of Virtual Drives Configured on Adapter {}:  {}\n\nExit Code: 0x{:02x}",
            adapter, count, count
        )
    }

    /// `-LDInfo -Lall` listing with one block per id
    pub fn ld_info_all(adapter: u32, ids: &[u32]) -> String {
        let mut out = format!("\nAdapter {} -- Virtual Drive Information:\n", adapter);
        for id in ids {
            out.push_str(&Self::ld_block(*id, "Primary-1, Secondary-0, RAID Level Qualifier-0", 2));
        }
        out.push_str("\nExit Code: 0x00");
        out
    }

    pub fn ld_info(adapter: u32, id: u32, raid_level: &str, drives: u32) -> String {
        format!(
            "\nAdapter {} -- Virtual Drive Information:\n{}\nExit Code: 0x00",
            adapter,
            Self::ld_block(id, raid_level, drives)
        )
    }

    fn ld_block(id: u32, raid_level: &str, drives: u32) -> String {
        format!(
            r#"Virtual Drive: {id} (Target Id: {id})
Name                :vd{id}
RAID Level          : {raid_level}
Size                : 557.861 GB
Sector Size         : 512
Is VD emulated      : No
Mirror Data         : 557.861 GB
State               : Optimal
Strip Size          : 64 KB
Number Of Drives    : {drives}
Span Depth          : 1
Default Cache Policy: WriteBack, ReadAdaptive, Direct, No Write Cache if Bad BBU
Current Cache Policy: WriteBack, ReadAdaptive, Direct, No Write Cache if Bad BBU
Default Access Policy: Read/Write
Current Access Policy: Read/Write
Disk Cache Policy   : Disk's Default
"#
        )
    }

    pub fn ld_pd_info(drives: &[MockLogicalDrive<'_>]) -> String {
        let mut out = format!("\nAdapter #0\n\nNumber of Virtual Disks: {}\n", drives.len());
        for ld in drives {
            out.push_str(&format!(
                r#"Virtual Drive: {id} (Target Id: {id})
Name                :
RAID Level          : {level}
Size                : 557.861 GB
State               : Optimal
Strip Size          : 64 KB
Number Of Drives    : {count}
Span Depth          : 1
Number of Spans: 1
Span: 0 - Number of PDs: {count}

"#,
                id = ld.id,
                level = ld.raid_level,
                count = ld.members.len()
            ));
            for (arm, (enclosure, slot)) in ld.members.iter().enumerate() {
                out.push_str(&format!(
                    "PD: {} Information\nEnclosure Device ID: {}\nSlot Number: {}\nDrive's position: DiskGroup: {}, Span: 0, Arm: {}\nFirmware state: Online, Spun Up\n\n",
                    arm, enclosure, slot, ld.id, arm
                ));
            }
        }
        out.push_str("\nExit Code: 0x00");
        out
    }

    pub fn ld_cache_policy(adapter: u32, id: u32, policy: &str) -> String {
        format!(
            "\nAdapter {}-VD {}(target id: {}): Cache Policy:{}\n\nExit Code: 0x00",
            adapter, id, id, policy
        )
    }

    pub fn ld_name(adapter: u32, id: u32, name: &str) -> String {
        format!(
            "\nAdapter {}-VD {}(target id: {}): Name:{}\n\nExit Code: 0x00",
            adapter, id, id, name
        )
    }

    pub fn boot_drive(adapter: u32, id: u32) -> String {
        format!(
            "\nAdapter {}: Boot Virtual Drive - #{} (target id - {}).\n\nExit Code: 0x00",
            adapter, id, id
        )
    }

    pub fn adp_prop(adapter: u32, line: &str) -> String {
        format!("\nAdapter {}: {}\n\nExit Code: 0x00", adapter, line)
    }
}
