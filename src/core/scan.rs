use std::fmt::Display;
use std::time::Instant;

use memchr::memmem;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::core::mem::{
    DEFAULT_SEARCH_PERMS, MemoryError, MemoryRegion, MemoryRegionPerms, get_memory_regions,
    read_memory_address, write_memory_address,
};
use crate::core::value::ValueType;

const BLOCK_SIZE: usize = 0x10000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    #[error("Value can not be empty")]
    EmptyValue,
    #[error("Invalid value: {value:.20} for type: {value_type}")]
    InvalidValue { value: String, value_type: ValueType },
    #[error("Unknown value type: {0}")]
    UnknownType(String),
    #[error("{len} bytes can not hold a {value_type} value")]
    TypeMismatch { value_type: ValueType, len: usize },
    #[error("Invalid hex address: {0:.18}")]
    InvalidAddress(String),
    #[error("Start address should be smaller than end address")]
    AddressMismatch,
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Parses a hex address, with or without `0x`.
pub fn parse_address(text: &str) -> Result<u64, ScanError> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u64::from_str_radix(digits, 16).map_err(|_| ScanError::InvalidAddress(text.to_owned()))
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub start_address: Option<u64>,
    pub end_address: Option<u64>,
    pub perms: Vec<MemoryRegionPerms>,
    /// Only keep matches whose address is a multiple of the value size.
    pub aligned: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            start_address: None,
            end_address: None,
            perms: DEFAULT_SEARCH_PERMS.to_vec(),
            aligned: true,
        }
    }
}

impl ScanOptions {
    pub fn validate(&self) -> Result<(), ScanError> {
        match (self.start_address, self.end_address) {
            (Some(start), Some(end)) if start >= end => Err(ScanError::AddressMismatch),
            _ => Ok(()),
        }
    }

    pub fn regions(&self, pid: u32) -> Result<Vec<MemoryRegion>, ScanError> {
        self.validate()?;
        Ok(get_memory_regions(
            pid,
            self.start_address,
            self.end_address,
            Some(&self.perms),
        )?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub address: u64,
    pub value_type: ValueType,
    pub value: Vec<u8>,
}

impl ScanResult {
    pub fn new(address: u64, value_type: ValueType, value: Vec<u8>) -> Self {
        ScanResult {
            address,
            value_type,
            value,
        }
    }

    pub fn hex(&self) -> String {
        hex::encode(&self.value)
    }
}

impl Display for ScanResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value_type.decode(&self.value) {
            Ok(text) => write!(f, "{text}"),
            Err(_) => write!(f, "0x{}", self.hex()),
        }
    }
}

/// Reads one value of `value_type` at `address`.
pub fn read_value(pid: u32, address: u64, value_type: ValueType) -> Result<ScanResult, ScanError> {
    let bytes = read_memory_address(pid, address as usize, value_type.size())?;
    Ok(ScanResult::new(address, value_type, bytes))
}

/// Encodes `text` as `value_type` and writes it at `address`. Returns what was written.
pub fn write_value(
    pid: u32,
    address: u64,
    value_type: ValueType,
    text: &str,
) -> Result<ScanResult, ScanError> {
    let bytes = value_type.encode(text)?;
    write_memory_address(pid, address as usize, &bytes)?;
    debug!(pid, address = %format!("{address:#x}"), %value_type, "value written");
    Ok(ScanResult::new(address, value_type, bytes))
}

#[derive(Debug)]
pub struct Scan {
    pub pid: u32,
    pub value: Vec<u8>,
    pub value_type: ValueType,
    pub results: Vec<ScanResult>,
    options: ScanOptions,
    memory_regions: Vec<MemoryRegion>,
}

impl Scan {
    pub fn new(pid: u32, value_type: ValueType, options: ScanOptions) -> Result<Self, ScanError> {
        let memory_regions = options.regions(pid)?;

        Ok(Scan {
            pid,
            value: vec![],
            value_type,
            results: vec![],
            options,
            memory_regions,
        })
    }

    pub fn regions(&self) -> &[MemoryRegion] {
        &self.memory_regions
    }

    pub fn set_value_from_str(&mut self, text: &str) -> Result<(), ScanError> {
        self.value = self.value_type.encode(text)?;
        Ok(())
    }

    fn scan_region(&self, region: &MemoryRegion) -> Result<Vec<ScanResult>, ScanError> {
        let mut results: Vec<ScanResult> = Vec::new();
        let size = self.value_type.size();
        let finder = memmem::Finder::new(&self.value);

        let mut current_address = region
            .start
            .max(self.options.start_address.unwrap_or(0)) as usize;
        let end = region
            .end
            .min(self.options.end_address.unwrap_or(u64::MAX)) as usize;

        if self.options.aligned && current_address % size != 0 {
            current_address += size - current_address % size;
        }

        while current_address < end {
            let to_read = std::cmp::min(BLOCK_SIZE, end - current_address);
            if to_read < size {
                break;
            }

            match read_memory_address(self.pid, current_address, to_read) {
                Err(e @ MemoryError::ProcessAttach(_)) => return Err(e.into()),
                Err(e) => trace!(address = %format!("{current_address:#x}"), "skipping block: {e}"),
                Ok(block) if self.options.aligned => {
                    // block starts aligned, so every slot is aligned too
                    for (slot, bytes) in block.chunks_exact(size).enumerate() {
                        if bytes == self.value.as_slice() {
                            results.push(ScanResult::new(
                                (current_address + slot * size) as u64,
                                self.value_type,
                                bytes.to_vec(),
                            ));
                        }
                    }
                }
                Ok(block) => {
                    let mut from = 0;
                    while let Some(hit) = finder.find(&block[from..]) {
                        let offset = from + hit;
                        results.push(ScanResult::new(
                            (current_address + offset) as u64,
                            self.value_type,
                            block[offset..offset + size].to_vec(),
                        ));
                        from = offset + 1;
                    }
                }
            }

            if current_address + to_read >= end {
                break;
            }
            if self.options.aligned {
                current_address += to_read;
            } else {
                // overlap so values straddling two blocks are still found
                current_address += to_read - (size - 1);
            }
        }

        Ok(results)
    }

    /// First scan over every region.
    pub fn init(&mut self) -> Result<&Vec<ScanResult>, ScanError> {
        if self.value.is_empty() {
            return Err(ScanError::EmptyValue);
        }

        let started = Instant::now();
        let per_region = self
            .memory_regions
            .par_iter()
            .map(|region| self.scan_region(region))
            .collect::<Result<Vec<_>, ScanError>>()?;

        self.results = per_region.into_iter().flatten().collect();
        debug!(
            pid = self.pid,
            regions = self.memory_regions.len(),
            matches = self.results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "initial scan done"
        );

        Ok(&self.results)
    }

    /// Re-reads every result without filtering.
    pub fn refresh(&mut self) -> Result<&Vec<ScanResult>, ScanError> {
        for result in &mut self.results {
            match read_memory_address(self.pid, result.address as usize, result.value_type.size()) {
                Err(e @ MemoryError::ProcessAttach(_)) => return Err(e.into()),
                Err(_) => {}
                Ok(val) => result.value = val,
            }
        }

        Ok(&self.results)
    }

    /// Keeps only the results that currently hold the search value.
    pub fn next_scan(&mut self) -> Result<&Vec<ScanResult>, ScanError> {
        if self.value.is_empty() {
            return Err(ScanError::EmptyValue);
        }

        let mut new_results = Vec::with_capacity(self.results.len());
        for result in &self.results {
            match read_memory_address(self.pid, result.address as usize, result.value_type.size()) {
                Err(e @ MemoryError::ProcessAttach(_)) => return Err(e.into()),
                Err(_) => {}
                Ok(val) => {
                    if val == self.value {
                        new_results.push(ScanResult::new(result.address, result.value_type, val));
                    }
                }
            }
        }

        debug!(
            before = self.results.len(),
            after = new_results.len(),
            "next scan done"
        );
        self.results = new_results;
        Ok(&self.results)
    }
}
