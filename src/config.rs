use crate::codec::ChainCodec;
use crate::error::Result;
use crate::json::JsonCodec;
use crate::registry::CodecRegistry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// File name looked up inside the store directory.
pub const CONFIG_FILE: &str = "linkchain.json";

/// Settings read from `linkchain.json`; every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Codec key used when no `--format` is given.
    pub default_format: String,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: "json".into(),
            pretty: true,
        }
    }
}

impl Config {
    /// Load `linkchain.json` from `dir`, or defaults if the file is absent.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(dir.join(CONFIG_FILE), data)?;
        Ok(())
    }

    /// Built-in registry adjusted to these settings.
    pub fn registry(&self) -> Result<CodecRegistry> {
        let mut reg = CodecRegistry::with_builtins();
        let json: Arc<dyn ChainCodec> = Arc::new(JsonCodec {
            pretty: self.pretty,
        });
        reg.register("json", json)?;
        reg.set_default(&self.default_format)?;
        Ok(reg)
    }
}
