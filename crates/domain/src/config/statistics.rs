use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatisticsConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_report_interval")]
    pub report_interval: u64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            report_interval: default_report_interval(),
        }
    }
}

fn default_report_interval() -> u64 {
    60
}
