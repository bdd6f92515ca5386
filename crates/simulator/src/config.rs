//! Simulator configuration

use std::time::Duration;

use nexus_core::config::SimulationSettings;

/// Settings the simulation engine runs with
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Delay before an offline debug report is delivered
    pub debug_delay: Duration,
    /// Banner on the first line of the compiler transcript
    pub compiler_banner: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::from(&SimulationSettings::default())
    }
}

impl From<&SimulationSettings> for SimulatorConfig {
    fn from(settings: &SimulationSettings) -> Self {
        Self {
            debug_delay: Duration::from_millis(settings.debug_delay_ms),
            compiler_banner: settings.compiler_banner.clone(),
        }
    }
}

impl SimulatorConfig {
    /// Set the debug delay
    pub fn with_debug_delay(mut self, delay: Duration) -> Self {
        self.debug_delay = delay;
        self
    }

    /// Set the compiler banner
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.compiler_banner = banner.into();
        self
    }
}
