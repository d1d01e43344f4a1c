use sysinfo::System;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProcError {
    #[error("no process matching '{0}'")]
    NotFound(String),
}

#[derive(Debug, Clone)]
pub struct ProcInfo {
    pub pid: u32,
    pub name: String,
}

impl ProcInfo {
    pub fn new(pid: u32, name: String) -> Self {
        ProcInfo { pid, name }
    }
}

/// Running processes, optionally only those whose name starts with `filter` (shortest first).
pub fn get_list(filter: Option<&str>) -> Vec<ProcInfo> {
    let sys = System::new_all();
    let filter = filter.unwrap_or("");
    let f = filter.trim().to_lowercase();
    let mut proc_list: Vec<ProcInfo> = sys
        .processes()
        .iter()
        .filter_map(|(k, v)| {
            let name = v.name().to_str().unwrap_or("").to_owned();
            let pid = k.as_u32();
            if f.is_empty() || name.to_lowercase().starts_with(&f) {
                return Some(ProcInfo::new(pid, name));
            }

            None
        })
        .collect();

    if f.is_empty() {
        return proc_list;
    }

    proc_list.sort_by(|a, b| a.name.len().cmp(&b.name.len()).then(a.pid.cmp(&b.pid)));
    proc_list
}

/// Best match for `name`: an exact (case-insensitive) name first, then the shortest prefix match.
/// The calling process is never returned.
pub fn find_pid(name: &str) -> Option<u32> {
    let own_pid = std::process::id();
    let candidates: Vec<ProcInfo> = get_list(Some(name))
        .into_iter()
        .filter(|p| p.pid != own_pid)
        .collect();

    candidates
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
        .or_else(|| candidates.first())
        .map(|p| p.pid)
}

/// An all-digit target is a pid, anything else a process name.
pub fn resolve_target(target: &str) -> Result<u32, ProcError> {
    let target = target.trim();
    if !target.is_empty() && target.bytes().all(|b| b.is_ascii_digit()) {
        return target
            .parse()
            .map_err(|_| ProcError::NotFound(target.to_owned()));
    }

    find_pid(target).ok_or_else(|| ProcError::NotFound(target.to_owned()))
}
