use colored::Colorize;
use landmark_core::{LandMarket, MarketConfig};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::Scenario;
use crate::backend::BackendSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub backend: String,
    pub seed: u64,
    pub passed: bool,
    pub failure: Option<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

pub struct LandTester {
    backend: BackendSpec,
    config: MarketConfig,
    verbose: bool,
}

impl LandTester {
    pub const fn new(backend: BackendSpec, config: MarketConfig, verbose: bool) -> Self {
        Self {
            backend,
            config,
            verbose,
        }
    }

    /// Run each scenario once per seed, each against a fresh market.
    #[allow(clippy::future_not_send)]
    pub async fn run_all(&self, scenarios: &[Scenario], seeds: &[u64]) -> Vec<ScenarioResult> {
        let mut results = Vec::new();
        for &scenario in scenarios {
            for &seed in self.backend.seeds_for(seeds) {
                results.push(self.run_scenario(scenario, seed).await);
            }
        }
        results
    }

    #[allow(clippy::future_not_send)]
    pub async fn run_scenario(&self, scenario: Scenario, seed: u64) -> ScenarioResult {
        let backend = self.backend.connect(seed);
        let label = backend.label().to_string();
        if self.verbose {
            println!(
                "🧪 Running scenario: {} (backend: {label} seed: {seed})",
                scenario.key().bright_white()
            );
        }
        let mut market = LandMarket::new(backend, self.config.clone());
        let start = Instant::now();
        let outcome = scenario.run(&mut market).await;
        let duration = start.elapsed();

        let failure = outcome.err().map(|err| format!("{err:#}"));
        match &failure {
            None => log::info!("{} passed in {duration:?}", scenario.key()),
            Some(reason) => log::warn!("{} failed: {reason}", scenario.key()),
        }
        if self.verbose {
            match &failure {
                None => println!("  ✅ passed ({duration:?})"),
                Some(reason) => println!("  ❌ failed: {}", reason.red()),
            }
        }
        ScenarioResult {
            scenario_name: scenario.key().to_string(),
            backend: label,
            seed,
            passed: failure.is_none(),
            failure,
            duration,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
