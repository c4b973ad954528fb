//! [`ToolRunner`] over the locally installed scanners

use async_trait::async_trait;
use hw_core::config::ToolsConfig;
use hw_core::traits::{ToolInputs, ToolRunner};
use hw_core::{NetworkScanResult, ToolKind};
use reqwest::Client;

use crate::{nikto, nmap, nuclei, openvas, vuls, zmap};

/// Runs network tools from the scanning machine
#[derive(Debug, Clone)]
pub struct LocalToolRunner {
    config: ToolsConfig,
    http: Client,
}

impl LocalToolRunner {
    pub fn new(config: ToolsConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }
}

#[async_trait]
impl ToolRunner for LocalToolRunner {
    async fn run(&self, tool: ToolKind, inputs: &ToolInputs) -> NetworkScanResult {
        if !inputs.satisfies(tool) {
            return NetworkScanResult::not_applicable(format!("No inputs for {}", tool));
        }

        tracing::debug!("Running network tool {}", tool);
        let config = &self.config;
        match tool {
            ToolKind::Nmap => nmap::run(&inputs.hosts, config).await,
            ToolKind::Nikto => nikto::run(&inputs.urls, config).await,
            ToolKind::Nuclei => nuclei::run(&inputs.urls, config).await,
            ToolKind::Vuls => vuls::run(&inputs.credentialed_targets, config).await,
            ToolKind::Zmap => match inputs.subnet.as_deref() {
                Some(subnet) => zmap::run(subnet, config).await,
                None => NetworkScanResult::not_applicable("No subnet"),
            },
            ToolKind::Openvas => match &inputs.openvas {
                Some(openvas) => openvas::run(&self.http, openvas, config.openvas_timeout).await,
                None => NetworkScanResult::not_applicable("No OpenVAS configuration"),
            },
        }
    }
}
