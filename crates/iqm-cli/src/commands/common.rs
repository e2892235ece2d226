//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use iqm_device::{ArchitectureDescriptor, Device, devices};
use iqm_ir::{Circuit, Operation};

/// Load a circuit from a JSON file.
///
/// Accepts either a serialized [`Circuit`] (a list of moments) or a flat list
/// of operations, which is packed into moments greedily.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let source = read_file(path)?;

    let value: serde_json::Value =
        serde_json::from_str(&source).with_context(|| format!("Invalid JSON in {path}"))?;

    if value.is_array() {
        let operations: Vec<Operation> = serde_json::from_value(value)
            .with_context(|| format!("Failed to parse operations from {path}"))?;
        return Circuit::from_operations(operations)
            .with_context(|| format!("Invalid circuit in {path}"));
    }

    serde_json::from_value(value).with_context(|| format!("Failed to parse circuit from {path}"))
}

/// Resolve the target device from a static name or an architecture file.
pub fn load_device(name: &str, architecture: Option<&str>) -> Result<Device> {
    match architecture {
        Some(path) => {
            let source = read_file(path)?;
            let arch = ArchitectureDescriptor::from_json(&source)
                .with_context(|| format!("Failed to parse architecture from {path}"))?;
            let device_name = Path::new(path)
                .file_stem()
                .map_or_else(|| "Custom".to_string(), |s| s.to_string_lossy().into_owned());
            Device::from_architecture(device_name, &arch)
                .with_context(|| format!("Invalid architecture in {path}"))
        }
        None => devices::by_name(name).with_context(|| {
            format!(
                "Available devices: {}",
                devices::DEVICE_NAMES.join(", ")
            )
        }),
    }
}

fn read_file(path: &str) -> Result<String> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))
}
