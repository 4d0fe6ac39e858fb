use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_yml::Value;

/// Default config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".shopdb.yml";

/// Dispatch case ids that are never shops, whatever the config says.
pub const RESERVED_SHOPS: &[i64] = &[19, 21];

/// Names and constants the walker relies on to recognize the shop setup
/// procedure. Defaults describe the vanilla procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Dispatch case ids skipped on top of `RESERVED_SHOPS`.
    pub excluded_shops: Vec<i64>,
    /// Loop upper bounds that mark an inventory scan rather than a range.
    pub inventory_slot_counts: Vec<i64>,
    /// Slot array of the registration call: `array[num].SetDefaults(id)`.
    pub slot_array: String,
    /// Slot index variable of the registration call.
    pub slot_index: String,
    /// Method invoked on the slot to register an item.
    pub register_method: String,
    /// Upper bound of the accumulation loop guard (`num < 39`).
    pub slot_capacity: i64,
    /// Largest range a single loop may unroll into.
    pub max_unroll: usize,
    pub(crate) source: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            excluded_shops: Vec::new(),
            inventory_slot_counts: vec![54, 58],
            slot_array: "array".to_string(),
            slot_index: "num".to_string(),
            register_method: "SetDefaults".to_string(),
            slot_capacity: 39,
            max_unroll: 4096,
            source: None,
        }
    }
}

impl AnalysisConfig {
    /// Path of the file this config was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_excluded(&self, shop: i64) -> bool {
        RESERVED_SHOPS.contains(&shop) || self.excluded_shops.contains(&shop)
    }

    pub fn is_inventory_bound(&self, bound: i64) -> bool {
        self.inventory_slot_counts.contains(&bound)
    }
}

/// Load config from the given path, or look for `.shopdb.yml` in the
/// current directory. Returns the defaults if the file doesn't exist.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => Path::new(DEFAULT_CONFIG_FILE).to_path_buf(),
    };

    if !config_path.exists() {
        return Ok(AnalysisConfig::default());
    }

    let contents = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read config {}", config_path.display()))?;
    let raw: Value = serde_yml::from_str(&contents)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;

    let mut config = apply(&raw)
        .with_context(|| format!("invalid config {}", config_path.display()))?;
    config.source = Some(config_path);
    Ok(config)
}

fn apply(raw: &Value) -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::default();

    let map = match raw {
        Value::Mapping(map) => map,
        Value::Null => return Ok(config),
        _ => bail!("top level must be a mapping"),
    };

    for (key, value) in map {
        let Some(key) = key.as_str() else {
            log::warn!("ignoring non-string config key {key:?}");
            continue;
        };
        match key {
            "ExcludedShops" => config.excluded_shops = int_list(key, value)?,
            "InventorySlotCounts" => config.inventory_slot_counts = int_list(key, value)?,
            "SlotArray" => config.slot_array = string(key, value)?,
            "SlotIndex" => config.slot_index = string(key, value)?,
            "RegisterMethod" => config.register_method = string(key, value)?,
            "SlotCapacity" => config.slot_capacity = int(key, value)?,
            "MaxUnroll" => {
                let n = int(key, value)?;
                config.max_unroll =
                    usize::try_from(n).with_context(|| format!("{key} must not be negative"))?;
            }
            _ => log::warn!("unknown config key {key}"),
        }
    }

    Ok(config)
}

fn int(key: &str, value: &Value) -> Result<i64> {
    match value.as_i64() {
        Some(n) => Ok(n),
        None => bail!("{key} must be an integer"),
    }
}

fn string(key: &str, value: &Value) -> Result<String> {
    match value.as_str() {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => bail!("{key} must be a non-empty string"),
    }
}

fn int_list(key: &str, value: &Value) -> Result<Vec<i64>> {
    let Some(seq) = value.as_sequence() else {
        bail!("{key} must be a list of integers");
    };
    seq.iter().map(|v| int(key, v)).collect()
}
