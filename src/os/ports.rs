// src/os/ports.rs

//! Enumeration of serial devices via sysfs.

use anyhow::{Context, Result};
use log::trace;
use std::fs;
use std::path::{Path, PathBuf};

const SYSFS_TTY_DIR: &str = "/sys/class/tty";
const DEV_DIR: &str = "/dev";

/// A serial device found on the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub device: PathBuf,
    pub description: String,
}

/// Lists the serial ports backed by real hardware (ttys with a `device` link).
pub fn list_ports() -> Result<Vec<PortInfo>> {
    list_ports_in(Path::new(SYSFS_TTY_DIR), Path::new(DEV_DIR))
}

fn list_ports_in(sysfs: &Path, dev: &Path) -> Result<Vec<PortInfo>> {
    let entries =
        fs::read_dir(sysfs).with_context(|| format!("Failed to read {}", sysfs.display()))?;
    let mut ports = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", sysfs.display()))?;
        let device_link = entry.path().join("device");
        if !device_link.exists() {
            continue;
        }
        let name = entry.file_name();
        let description = describe(&device_link).unwrap_or_else(|| "n/a".to_string());
        trace!("Found port {:?}: {}", name, description);
        ports.push(PortInfo {
            device: dev.join(&name),
            description,
        });
    }
    ports.sort_by(|a, b| a.device.cmp(&b.device));
    Ok(ports)
}

/// USB product string if there is one, otherwise the driver name.
fn describe(device_link: &Path) -> Option<String> {
    // USB adapters keep `product` on the USB device, above the interface.
    let product = ["product", "../product", "../../product"]
        .iter()
        .map(|rel| device_link.join(rel))
        .find_map(|path| fs::read_to_string(path).ok());
    if let Some(product) = product {
        return Some(product.trim().to_string());
    }
    fs::read_link(device_link.join("driver"))
        .ok()
        .and_then(|driver| driver.file_name().map(|n| n.to_string_lossy().into_owned()))
}

/// Whether `path` names one of the listed ports.
pub fn is_available(path: &Path) -> Result<bool> {
    Ok(list_ports()?.iter().any(|p| p.device == path))
}
