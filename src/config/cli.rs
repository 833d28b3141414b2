use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "moonphase")]
#[command(about = "Moon phase image service")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Address to listen on, e.g. 0.0.0.0:8000
    #[arg(long)]
    pub bind: Option<String>,

    /// Image URL template; `{n}` is replaced by the image index
    #[arg(long)]
    pub image_url_template: Option<String>,

    /// Directory of phase images to serve
    #[arg(long)]
    pub image_dir: Option<String>,

    /// Return 200 OK for errors, with the error payload as body
    #[arg(long)]
    pub flat_errors: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Loads the file named by `--config` (or defaults) and applies the flags on top.
    pub fn load(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        self.apply_to(&mut config);
        Ok(config)
    }

    pub fn apply_to(&self, config: &mut TomlConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(template) = &self.image_url_template {
            config.images.url_template = Some(template.clone());
        }
        if let Some(dir) = &self.image_dir {
            config.images.directory = Some(dir.clone());
        }
        if self.flat_errors {
            config.server.flat_errors = true;
        }
    }
}
