//! OS process helpers for background playback supervision.

use regex::Regex;

/// Whether `pid` names a live (non-zombie) process.
#[cfg(unix)]
pub fn is_alive(pid: u32) -> bool {
    let Ok(raw) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }
    // SAFETY: signal 0 performs permission and existence checks only.
    let rc = unsafe { libc::kill(raw, 0) };
    if rc != 0 {
        let errno = std::io::Error::last_os_error().raw_os_error();
        // EPERM: exists but belongs to someone else.
        return errno == Some(libc::EPERM);
    }
    !is_zombie(pid)
}

#[cfg(not(unix))]
pub fn is_alive(_pid: u32) -> bool {
    false
}

/// Zombies still answer `kill(pid, 0)`; /proc tells them apart.
#[cfg(unix)]
fn is_zombie(pid: u32) -> bool {
    let Ok(stat) = std::fs::read_to_string(format!("/proc/{}/stat", pid)) else {
        return false;
    };
    // state follows the parenthesised comm, which may itself contain spaces
    stat.rfind(')')
        .and_then(|i| stat[i + 1..].split_whitespace().next())
        .map(|state| state == "Z")
        .unwrap_or(false)
}

/// Send SIGTERM to the process group led by `pid`, falling back to the
/// process itself when it is not a group leader. Returns whether a signal
/// was delivered.
#[cfg(unix)]
pub fn terminate(pid: u32) -> bool {
    let Ok(raw) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }
    // SAFETY: plain signal delivery, no memory is shared.
    unsafe {
        if libc::kill(-raw, libc::SIGTERM) == 0 {
            return true;
        }
        libc::kill(raw, libc::SIGTERM) == 0
    }
}

#[cfg(not(unix))]
pub fn terminate(_pid: u32) -> bool {
    false
}

/// Pids of processes whose space-joined command line matches `pattern`.
/// Never includes the calling process. Empty where /proc is unavailable.
pub fn find_processes(pattern: &Regex) -> Vec<u32> {
    let own = std::process::id();
    let Ok(entries) = std::fs::read_dir("/proc") else {
        return Vec::new();
    };
    let mut pids: Vec<u32> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
        .filter(|pid| *pid != own)
        .filter(|pid| {
            command_line(*pid)
                .map(|line| pattern.is_match(&line))
                .unwrap_or(false)
        })
        .collect();
    pids.sort_unstable();
    pids
}

fn command_line(pid: u32) -> Option<String> {
    let raw = std::fs::read(format!("/proc/{}/cmdline", pid)).ok()?;
    if raw.is_empty() {
        return None;
    }
    let line = raw
        .split(|b| *b == 0)
        .filter(|part| !part.is_empty())
        .map(|part| String::from_utf8_lossy(part).into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    Some(line)
}
