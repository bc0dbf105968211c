use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub vm: VmConfig,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct VmConfig {
    /// Upper bound on executed instructions. `None` runs until HLT.
    pub max_steps: Option<u64>,
    /// Log a trace line before every instruction.
    pub trace: bool,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.vm.max_steps == Some(0) {
            return Err("vm.max_steps must be greater than zero".to_string());
        }
        Ok(())
    }
}
