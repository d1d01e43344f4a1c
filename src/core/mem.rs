use process_memory::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MemoryError {
    #[error("Permission Denied: OS Error ({0})")]
    NoPermission(i32),
    #[error("Could not read memory: OS Error ({0})")]
    MemRead(i32),
    #[error("Could not write memory: OS Error ({0})")]
    MemWrite(i32),
    #[error("Could not attach to process: OS Error ({0})")]
    ProcessAttach(i32),
    #[error("Malformed memory map entry: {0}")]
    MapParse(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemoryRegionPerms {
    Read,
    Write,
    Execute,
}

pub const DEFAULT_SEARCH_PERMS: [MemoryRegionPerms; 1] = [MemoryRegionPerms::Write];

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRegion {
    pub start: u64,
    pub end: u64,
    pub perms: Vec<MemoryRegionPerms>,
    pub shared: bool,
}

impl MemoryRegion {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matches(&self, search_perms: &[MemoryRegionPerms]) -> bool {
        search_perms.iter().any(|p| self.perms.contains(p))
    }

    fn overlaps(&self, start: u64, end: u64) -> bool {
        !(self.end < start || self.start > end)
    }

    pub fn describe(&self) -> String {
        let flag = |perm, c| if self.perms.contains(&perm) { c } else { '-' };
        format!(
            "Range: [0x{:x} - 0x{:x}]\tPermissions: [{}{}{}{}]",
            self.start,
            self.end,
            flag(MemoryRegionPerms::Read, 'r'),
            flag(MemoryRegionPerms::Write, 'w'),
            flag(MemoryRegionPerms::Execute, 'x'),
            if self.shared { 's' } else { 'p' },
        )
    }
}

/// Parses one `/proc/<pid>/maps` line.
///
/// `00400000-00452000 r-xp 00000000 fd:00 1234  /usr/bin/foo`
pub fn parse_maps_line(line: &str) -> Result<MemoryRegion, MemoryError> {
    let malformed = || MemoryError::MapParse(line.to_owned());

    let mut parts = line.split_whitespace();
    let range = parts.next().ok_or_else(malformed)?;
    let perms = parts.next().ok_or_else(malformed)?;

    let (start_str, end_str) = range.split_once('-').ok_or_else(malformed)?;
    let start = u64::from_str_radix(start_str, 16).map_err(|_| malformed())?;
    let end = u64::from_str_radix(end_str, 16).map_err(|_| malformed())?;

    let perms = perms.as_bytes();
    if perms.len() != 4 {
        return Err(malformed());
    }

    let mut region_perms = Vec::with_capacity(3);
    if perms[0] == b'r' {
        region_perms.push(MemoryRegionPerms::Read);
    }
    if perms[1] == b'w' {
        region_perms.push(MemoryRegionPerms::Write);
    }
    if perms[2] == b'x' {
        region_perms.push(MemoryRegionPerms::Execute);
    }

    Ok(MemoryRegion {
        start,
        end,
        perms: region_perms,
        shared: perms[3] == b's',
    })
}

#[cfg(target_os = "macos")]
pub fn get_memory_regions(
    pid: u32,
    start: Option<u64>,
    end: Option<u64>,
    search_perms: Option<&[MemoryRegionPerms]>,
) -> Result<Vec<MemoryRegion>, MemoryError> {
    use mach_sys::{
        kern_return::{KERN_INVALID_ADDRESS, KERN_SUCCESS},
        port::mach_port_name_t,
        traps::{mach_task_self, task_for_pid},
        vm::mach_vm_region,
        vm_prot::{VM_PROT_EXECUTE, VM_PROT_READ, VM_PROT_WRITE},
        vm_region::{VM_REGION_BASIC_INFO_64, vm_region_info_t},
        vm_types::{mach_vm_address_t, mach_vm_size_t, vm_map_t},
    };
    use mach_sys::{port::mach_port_t, vm_region::vm_region_basic_info_data_64_t};

    let search_perms = search_perms.unwrap_or(&DEFAULT_SEARCH_PERMS);

    let task: mach_port_name_t = 0;
    let kret = unsafe {
        task_for_pid(
            mach_task_self() as mach_port_name_t,
            pid as i32,
            &task as *const u32 as *mut u32,
        )
    };

    if kret != KERN_SUCCESS {
        return Err(MemoryError::NoPermission(kret));
    }

    let mut regions = Vec::new();
    let mut address: mach_vm_address_t = start.unwrap_or(1);
    let end: mach_vm_address_t = end.unwrap_or(u64::MAX);
    let mut size: mach_vm_size_t = 0;

    loop {
        if address > end {
            break;
        }

        let mut info = vm_region_basic_info_data_64_t::default();
        let mut info_count = VM_REGION_BASIC_INFO_64 as u32;
        let mut object_name: mach_port_t = 0;
        let kr = unsafe {
            mach_vm_region(
                task as vm_map_t,
                &mut address,
                &mut size,
                VM_REGION_BASIC_INFO_64,
                (&mut info as *mut vm_region_basic_info_data_64_t) as vm_region_info_t,
                &mut info_count as *mut u32,
                &mut object_name,
            )
        };

        if kr == KERN_INVALID_ADDRESS {
            break;
        } else if kr != KERN_SUCCESS {
            return Err(MemoryError::MemRead(kr));
        }

        let mut perms = Vec::with_capacity(3);
        if info.protection & VM_PROT_READ != 0 {
            perms.push(MemoryRegionPerms::Read);
        }
        if info.protection & VM_PROT_WRITE != 0 {
            perms.push(MemoryRegionPerms::Write);
        }
        if info.protection & VM_PROT_EXECUTE != 0 {
            perms.push(MemoryRegionPerms::Execute);
        }

        let region = MemoryRegion {
            start: address,
            end: address + size,
            perms,
            shared: info.shared != 0,
        };

        if region.matches(search_perms) {
            regions.push(region);
        }

        address += size;
    }

    Ok(regions)
}

#[cfg(target_os = "linux")]
pub fn get_memory_regions(
    pid: u32,
    start: Option<u64>,
    end: Option<u64>,
    search_perms: Option<&[MemoryRegionPerms]>,
) -> Result<Vec<MemoryRegion>, MemoryError> {
    use std::fs::File;
    use std::io::{self, BufRead};
    use std::path::PathBuf;

    let search_perms = search_perms.unwrap_or(&DEFAULT_SEARCH_PERMS);
    let path = PathBuf::from(format!("/proc/{}/maps", pid));
    let file =
        File::open(&path).map_err(|e| MemoryError::NoPermission(e.raw_os_error().unwrap_or(-1)))?;
    let reader = io::BufReader::new(file);

    let start_addr = start.unwrap_or(0);
    let end_addr = end.unwrap_or(u64::MAX);

    let mut regions = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(|e| MemoryError::MemRead(e.raw_os_error().unwrap_or(0)))?;
        let region = parse_maps_line(&line)?;

        if region.overlaps(start_addr, end_addr) && region.matches(search_perms) {
            regions.push(region);
        }
    }

    Ok(regions)
}

pub fn read_memory_address(pid: u32, addr: usize, size: usize) -> Result<Vec<u8>, MemoryError> {
    let handle = (pid as Pid)
        .try_into_process_handle()
        .map_err(|e| MemoryError::ProcessAttach(e.raw_os_error().unwrap_or(-1)))?;

    let mut result = vec![0; size];
    handle.copy_address(addr, &mut result).map_err(|e| {
        // linux attaches fine but refuses the read itself (EPERM); report it like macOS does
        if std::env::consts::OS == "linux" && e.raw_os_error().unwrap_or(-1) == 1 {
            return MemoryError::ProcessAttach(1);
        }
        MemoryError::MemRead(e.raw_os_error().unwrap_or(-1))
    })?;

    Ok(result)
}

pub fn write_memory_address(pid: u32, addr: usize, value: &[u8]) -> Result<(), MemoryError> {
    let handle = (pid as Pid)
        .try_into_process_handle()
        .map_err(|e| MemoryError::ProcessAttach(e.raw_os_error().unwrap_or(-1)))?;

    handle
        .put_address(addr, value)
        .map_err(|e| MemoryError::MemWrite(e.raw_os_error().unwrap_or(-1)))?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_maps_line() {
        let region =
            parse_maps_line("7ffd1000-7ffd3000 rw-p 00000000 00:00 0                  [stack]")
                .unwrap();
        assert_eq!(region.start, 0x7ffd1000);
        assert_eq!(region.end, 0x7ffd3000);
        assert_eq!(region.len(), 0x2000);
        assert_eq!(
            region.perms,
            vec![MemoryRegionPerms::Read, MemoryRegionPerms::Write]
        );
        assert!(!region.shared);
    }

    #[test]
    fn test_parse_maps_line_shared_exec() {
        let region = parse_maps_line("00400000-00452000 r-xs 00000000 fd:00 1234 /bin/x").unwrap();
        assert_eq!(
            region.perms,
            vec![MemoryRegionPerms::Read, MemoryRegionPerms::Execute]
        );
        assert!(region.shared);
        assert_eq!(
            region.describe(),
            "Range: [0x400000 - 0x452000]\tPermissions: [r-xs]"
        );
    }

    #[test]
    fn test_parse_maps_line_malformed() {
        assert!(matches!(
            parse_maps_line("garbage"),
            Err(MemoryError::MapParse(_))
        ));
        assert!(matches!(
            parse_maps_line("zz-10 rw-p"),
            Err(MemoryError::MapParse(_))
        ));
        assert!(matches!(
            parse_maps_line("10-20 rw"),
            Err(MemoryError::MapParse(_))
        ));
    }

    #[test]
    fn test_region_filters() {
        let region = parse_maps_line("1000-2000 r--p 0 0:0 0").unwrap();
        assert!(region.matches(&[MemoryRegionPerms::Read]));
        assert!(!region.matches(&DEFAULT_SEARCH_PERMS));
        assert!(region.overlaps(0, 0x1000));
        assert!(region.overlaps(0x1800, u64::MAX));
        assert!(!region.overlaps(0x2001, u64::MAX));
        assert!(!region.overlaps(0, 0xfff));
    }

    #[test]
    pub fn test_get_regions_error() {
        let result = get_memory_regions(0, None, None, None);

        assert!(matches!(result, Err(MemoryError::NoPermission(_))));
    }

    #[test]
    #[cfg(target_os = "linux")]
    pub fn test_get_own_regions() {
        let regions = get_memory_regions(std::process::id(), None, None, None).unwrap();
        assert!(!regions.is_empty());
        assert!(
            regions
                .iter()
                .all(|r| r.perms.contains(&MemoryRegionPerms::Write))
        );
    }

    #[test]
    #[cfg(target_os = "linux")]
    pub fn test_read_write_own_memory() {
        let target = Box::new(31337_u32);
        let addr = &*target as *const u32 as usize;
        let pid = std::process::id();

        let value = read_memory_address(pid, addr, 4).unwrap();
        assert_eq!(u32::from_le_bytes(value.try_into().unwrap()), 31337);

        write_memory_address(pid, addr, &99999_u32.to_le_bytes()).unwrap();
        let value = read_memory_address(pid, addr, 4).unwrap();
        assert_eq!(u32::from_le_bytes(value.try_into().unwrap()), 99999);
    }
}
