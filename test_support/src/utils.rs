// Common utilities for tests, benches and demos

use std::collections::HashSet;

const MESSAGE_PREFIX: &str = "hello-";
const MAX_BACKOFF_POW: u32 = 10;

/// Build the tagged message a producer pushes for `id`.
pub fn message_for(id: u32) -> String {
    format!("{MESSAGE_PREFIX}{id}")
}

/// Recover the id from a message built by [`message_for`].
pub fn parse_message_id(message: &str) -> u32 {
    let id_str = message
        .strip_prefix(MESSAGE_PREFIX)
        .unwrap_or_else(|| panic!("bad message prefix: {message}"));
    match id_str.parse() {
        Ok(id) => id,
        Err(e) => panic!("couldn't parse message id, err: {:?} message: {}", e, message),
    }
}

/// Spin, then yield, a little longer on every call. Reset `pow` to 0 after progress.
pub fn backoff(pow: &mut u32) {
    if *pow < MAX_BACKOFF_POW {
        for _ in 0..(1u32 << *pow) {
            std::hint::spin_loop();
        }
        *pow += 1;
    } else {
        std::thread::yield_now();
    }
}

fn read_topology_value(cpu_id: usize, file: &str) -> Option<u32> {
    let path = format!("/sys/devices/system/cpu/cpu{cpu_id}/topology/{file}");
    let contents = std::fs::read_to_string(path).ok()?;
    contents.trim().parse().ok()
}

/// Choose up to `count` CPU cores, preferring distinct physical cores first.
///
/// Returns fewer than `count` ids when the machine does not have enough cores.
pub fn select_cores(count: usize) -> Vec<core_affinity::CoreId> {
    let core_ids = core_affinity::get_core_ids().unwrap_or_default();

    let mut chosen = Vec::with_capacity(count);
    let mut used_phys = HashSet::new();

    for core in &core_ids {
        if chosen.len() == count {
            return chosen;
        }
        let package = read_topology_value(core.id, "physical_package_id");
        let physical = read_topology_value(core.id, "core_id");
        if let (Some(pkg), Some(phys)) = (package, physical) {
            if used_phys.insert((pkg, phys)) {
                chosen.push(*core);
            }
        }
    }

    for core in &core_ids {
        if chosen.len() == count {
            break;
        }
        if !chosen.contains(core) {
            chosen.push(*core);
        }
    }

    chosen
}
