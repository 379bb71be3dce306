//! Installed plugins and build uploads.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::validation::require_text;

const UPLOAD_EXTENSIONS: &[&str] = &[".jar", ".zip"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginRecord {
    pub name: String,
    pub version: String,
    pub enabled: bool,
    pub description: String,
}

impl PluginRecord {
    fn new(name: &str, version: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            enabled: true,
            description: description.to_string(),
        }
    }
}

pub(super) fn default_plugins() -> Vec<PluginRecord> {
    vec![
        PluginRecord::new("EssentialsX", "2.20.1", "Core commands and features"),
        PluginRecord::new("WorldEdit", "7.2.15", "World editor"),
        PluginRecord::new("LuckPerms", "5.4.102", "Permission system"),
    ]
}

/// Flip one plugin's enabled flag and return the new value.
pub(super) fn toggle_plugin(plugins: &mut [PluginRecord], name: &str) -> Result<bool> {
    let plugin = plugins
        .iter_mut()
        .find(|p| p.name == name)
        .ok_or_else(|| AppError::plugin_not_found(name))?;
    plugin.enabled = !plugin.enabled;
    Ok(plugin.enabled)
}

/// Accept a server build archive by file name. Only `.jar` and `.zip` pass.
pub(super) fn check_upload(file_name: &str) -> Result<&str> {
    let file_name = require_text("file", file_name)?;
    let lower = file_name.to_ascii_lowercase();
    if UPLOAD_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        Ok(file_name)
    } else {
        Err(AppError::invalid_upload(file_name))
    }
}
