//! CLI context: configuration plus the negotiator built from it

use anyhow::Context as _;
use delegate_foundation::Negotiator;
use delegate_foundation::source::{StaticDeviceSource, source_from_config};
use delegate_kernel::config::load_delegate_config;
use delegate_kernel::{DelegateConfig, SourceKind, TargetDeviceOption};
use std::path::Path;

/// Shared context for CLI commands
pub struct CliContext {
    pub config: DelegateConfig,
    pub negotiator: Negotiator<StaticDeviceSource>,
}

impl CliContext {
    /// Load configuration, apply the `--source` override and build the source
    pub fn load(config_path: Option<&Path>, source: Option<SourceKind>) -> anyhow::Result<Self> {
        let mut config = load_config(config_path)?;
        if let Some(source) = source {
            config.source = source;
        }
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: DelegateConfig) -> Self {
        let source = source_from_config(&config);
        let negotiator = Negotiator::new(source, config.negotiation.clone());
        Self { config, negotiator }
    }

    /// `--option` when given, the configured option otherwise
    pub fn option(&self, option: Option<TargetDeviceOption>) -> TargetDeviceOption {
        option.unwrap_or(self.config.target_device_option)
    }
}

pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<DelegateConfig> {
    let path = config_path
        .map(|path| {
            path.to_str()
                .with_context(|| format!("config path is not valid UTF-8: {}", path.display()))
        })
        .transpose()?;

    load_delegate_config(path).with_context(|| match path {
        Some(path) => format!("failed to load configuration from {path}"),
        None => "failed to load configuration from environment".to_string(),
    })
}
