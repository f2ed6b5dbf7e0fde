//! Config command.

use super::{Cli, CliError};
use crate::config::{default_config_path, Config};
use clap::{Args, ValueEnum};

/// Arguments for reading or changing configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// list, get or set
    #[arg(value_enum, default_value = "list")]
    pub mode: ConfigMode,

    /// Config name
    pub name: Option<String>,

    /// Config value
    pub value: Option<String>,
}

/// Config command modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigMode {
    /// Show all config entries
    List,
    /// Show one config value
    Get,
    /// Change one config value
    Set,
}

impl ConfigArgs {
    /// Execute the config command.
    ///
    /// Works directly on the config file without requiring a keypair, so
    /// the tool can be configured before a wallet exists.
    pub fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let path = cli.config.clone().unwrap_or_else(default_config_path);
        let mut config = Config::load_or_init(&path)?;

        match self.mode {
            ConfigMode::List => {
                for (name, value) in config.entries() {
                    println!("{name}: {value}");
                }
            }
            ConfigMode::Get => {
                let name = self.name.as_deref().ok_or_else(|| {
                    CliError::InvalidArgument("name of config must be specified".to_string())
                })?;
                println!("{name}: {}", config.get(name)?);
            }
            ConfigMode::Set => {
                let name = self.name.as_deref().ok_or_else(|| {
                    CliError::InvalidArgument("name and value must be specified".to_string())
                })?;
                let value = self.value.as_deref().ok_or_else(|| {
                    CliError::InvalidArgument("name and value must be specified".to_string())
                })?;

                println!("Old {name}: {}", config.get(name)?);
                config.set(name, value)?;
                config.save(&path)?;
                println!("New {name}: {value}");
            }
        }

        Ok(())
    }
}
