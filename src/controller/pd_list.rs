use crate::model::DiskAddress;
use crate::{RaidError, RaidResult};

/// Builds the `e:s,e:s,...` drive list for `-CfgLdAdd` under a hard
/// capacity.
///
/// The capacity counts a terminator byte, so a list may be at most
/// `capacity - 1` bytes long. Overflow is an error, never a truncation.
#[derive(Debug, Clone)]
pub struct PdListBuilder {
    buffer: String,
    capacity: usize,
}

impl PdListBuilder {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: String::new(),
            capacity,
        }
    }

    /// Append one address, comma-separated from the previous one
    pub fn push(&mut self, address: DiskAddress) -> RaidResult<()> {
        let entry = if self.buffer.is_empty() {
            address.to_string()
        } else {
            format!(",{}", address)
        };

        let needed = self.buffer.len() + entry.len() + 1;
        if needed > self.capacity {
            return Err(RaidError::CapacityExceeded {
                needed,
                capacity: self.capacity,
            });
        }

        self.buffer.push_str(&entry);
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    /// Render `addresses` or fail before anything is returned
    pub fn build(addresses: &[DiskAddress], capacity: usize) -> RaidResult<String> {
        let mut builder = Self::new(capacity);
        for address in addresses {
            builder.push(*address)?;
        }
        Ok(builder.finish())
    }
}
