//! Linux sysfs GPIO
//!
//! Drives lines through `/sys/class/gpio`. Pins are named the Allwinner way
//! (`PD22` = bank D, line 22) or given as raw line numbers.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{MountError, Result};
use super::{Level, PinBackend, PinMode};

const SYSFS_ROOT: &str = "/sys/class/gpio";

/// Lines per Allwinner bank
const SUNXI_BANK_SIZE: u32 = 32;

/// errno returned when a line is already exported
const EBUSY: i32 = 16;

/// Translate an Allwinner pin name (`PL2`) or a plain number (`354`) into a
/// sysfs line number
pub fn sunxi_pin_number(pin: &str) -> Option<u32> {
    if let Ok(number) = pin.parse::<u32>() {
        return Some(number);
    }

    let rest = pin.strip_prefix('P').or_else(|| pin.strip_prefix('p'))?;
    let mut chars = rest.chars();
    let bank = chars.next()?.to_ascii_uppercase();
    if !bank.is_ascii_uppercase() {
        return None;
    }
    let line: u32 = chars.as_str().parse().ok()?;
    if line >= SUNXI_BANK_SIZE {
        return None;
    }

    Some((bank as u32 - 'A' as u32) * SUNXI_BANK_SIZE + line)
}

/// sysfs-backed pin backend
pub struct SysfsGpio {
    root: PathBuf,
    values: HashMap<String, File>,
    exported: Vec<u32>,
}

impl SysfsGpio {
    /// Open the system GPIO class
    ///
    /// Fails when the kernel exposes no sysfs GPIO interface; callers treat
    /// this as fatal rather than falling back to simulation.
    pub fn open() -> Result<Self> {
        Self::open_at(SYSFS_ROOT)
    }

    /// Open a GPIO class rooted elsewhere
    pub fn open_at(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.join("export").exists() {
            return Err(MountError::Hardware(format!(
                "GPIO interface not available at {}",
                root.display()
            )));
        }

        Ok(Self {
            root,
            values: HashMap::new(),
            exported: Vec::new(),
        })
    }

    fn line_dir(&self, number: u32) -> PathBuf {
        self.root.join(format!("gpio{}", number))
    }

    fn export(&mut self, number: u32) -> Result<()> {
        if self.line_dir(number).exists() {
            return Ok(());
        }

        let mut export = OpenOptions::new().write(true).open(self.root.join("export"))?;
        match export.write_all(number.to_string().as_bytes()) {
            Ok(()) => {}
            // Already exported by someone else
            Err(e) if e.raw_os_error() == Some(EBUSY) => {}
            Err(e) => return Err(e.into()),
        }
        self.exported.push(number);
        Ok(())
    }
}

impl PinBackend for SysfsGpio {
    fn name(&self) -> &'static str {
        "sysfs"
    }

    fn setup(&mut self, pin: &str, mode: PinMode) -> Result<()> {
        if self.values.contains_key(pin) {
            return Ok(());
        }

        let number = sunxi_pin_number(pin)
            .ok_or_else(|| MountError::Hardware(format!("Unknown pin name: {}", pin)))?;

        self.export(number)
            .map_err(|e| MountError::Hardware(format!("Export of {} failed: {}", pin, e)))?;

        let dir = self.line_dir(number);
        let direction = match mode {
            PinMode::Output => "out",
            PinMode::Input => "in",
        };
        fs::write(dir.join("direction"), direction)
            .map_err(|e| MountError::Hardware(format!("Direction of {} failed: {}", pin, e)))?;

        let value = OpenOptions::new()
            .read(true)
            .write(true)
            .open(dir.join("value"))
            .map_err(|e| MountError::Hardware(format!("Value of {} failed: {}", pin, e)))?;
        self.values.insert(pin.to_string(), value);

        tracing::debug!("GPIO {} (line {}) set up as {}", pin, number, direction);
        Ok(())
    }

    fn output(&mut self, pin: &str, level: Level) {
        let Some(file) = self.values.get_mut(pin) else {
            tracing::warn!("GPIO write to {} before setup", pin);
            return;
        };

        let byte: &[u8] = if level.is_high() { b"1" } else { b"0" };
        if let Err(e) = file.seek(SeekFrom::Start(0)).and_then(|_| file.write_all(byte)) {
            tracing::warn!("GPIO write to {} failed: {}", pin, e);
        }
    }

    fn cleanup(&mut self) {
        self.values.clear();

        let unexport = self.root.join("unexport");
        for number in self.exported.drain(..) {
            if let Err(e) = fs::write(&unexport, number.to_string()) {
                tracing::warn!("GPIO unexport of line {} failed: {}", number, e);
            }
        }
    }
}
