//! Parsing helpers shared by the environment and YAML loaders.

use std::str::FromStr;

use crate::core::SynthesisMode;

/// Read an environment variable, treating empty or whitespace-only values as unset.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an environment variable into `T`, with a descriptive error.
pub fn parse_env<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value for {name}: '{raw}' ({e})")),
        None => Ok(None),
    }
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean environment variable.
pub fn parse_env_bool(name: &str) -> Result<Option<bool>, String> {
    match env_var(name) {
        Some(raw) => parse_bool(&raw)
            .map(Some)
            .ok_or_else(|| format!("Invalid boolean for {name}: '{raw}'")),
        None => Ok(None),
    }
}

/// Parse a list of mode names, deduplicated in first-seen order.
pub fn parse_modes<S: AsRef<str>>(names: &[S]) -> Result<Vec<SynthesisMode>, String> {
    let mut modes = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        let mode = SynthesisMode::parse(name)
            .ok_or_else(|| format!("Unknown synthesis mode '{name}' (expected realtime or v3)"))?;
        if !modes.contains(&mode) {
            modes.push(mode);
        }
    }
    Ok(modes)
}

/// Parse a comma-separated list of mode names.
pub fn parse_mode_list(value: &str) -> Result<Vec<SynthesisMode>, String> {
    let names: Vec<&str> = value.split(',').collect();
    parse_modes(&names)
}
