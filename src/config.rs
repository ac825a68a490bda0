use crate::error::{PackError, PackResult};
use clap::parser::ValueSource;
use clap::{ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub search: SearchParams,
    pub estimate: EstimateParams,
}

/// Tuning knobs for the restart driver. The defaults were tuned empirically
/// on 50x50-ish regions with 3x3 pieces; none of them is a hard constant.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    // === DETERMINISTIC PHASE ===
    #[arg(long, default_value_t = 1)]
    pub deterministic_seed: u64,
    #[arg(long, default_value_t = 2000)]
    pub deterministic_step_floor: usize,
    #[arg(long, default_value_t = 80)]
    pub deterministic_steps_per_piece: usize,
    #[arg(long, default_value_t = 1)]
    pub deterministic_remove_min: usize,
    #[arg(long, default_value_t = 4)]
    pub deterministic_remove_max: usize,

    // === RANDOMIZED PHASE ===
    #[arg(long, default_value_t = 120)]
    pub random_attempts: usize,
    #[arg(long, default_value_t = 600)]
    pub random_step_floor: usize,
    #[arg(long, default_value_t = 60)]
    pub random_steps_per_piece: usize,
    #[arg(long, default_value_t = 2)]
    pub random_remove_min: usize,
    #[arg(long, default_value_t = 6)]
    pub random_remove_max: usize,

    // === ENUMERATOR ===
    /// Stop scanning after this many empty anchors (0 = scan all)
    #[arg(long, default_value_t = 0)]
    pub anchor_scan_cap: usize,
    /// Productive anchors to inspect before committing (0 = all, 1 = greedy)
    #[arg(long, default_value_t = 1)]
    pub anchor_lookahead: usize,

    // === EXECUTION ===
    /// Worker threads for the randomized phase (0 = rayon default, 1 = sequential)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
    /// Master seed for the randomized phase (omit for entropy)
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            deterministic_seed: 1,
            deterministic_step_floor: 2000,
            deterministic_steps_per_piece: 80,
            deterministic_remove_min: 1,
            deterministic_remove_max: 4,
            random_attempts: 120,
            random_step_floor: 600,
            random_steps_per_piece: 60,
            random_remove_min: 2,
            random_remove_max: 6,
            anchor_scan_cap: 0,
            anchor_lookahead: 1,
            threads: 0,
            seed: None,
        }
    }
}

impl Config {
    /// Loads a JSON parameter file. Missing fields keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> PackResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PackResult<()> {
        self.search.validate()?;
        self.estimate.validate()
    }
}

impl SearchParams {
    pub fn validate(&self) -> PackResult<()> {
        let ranges = [
            (
                "deterministic",
                self.deterministic_remove_min,
                self.deterministic_remove_max,
            ),
            ("random", self.random_remove_min, self.random_remove_max),
        ];
        for (phase, min, max) in ranges {
            if min == 0 {
                return Err(PackError::Config(format!(
                    "{}_remove_min must be at least 1",
                    phase
                )));
            }
            if min > max {
                return Err(PackError::Config(format!(
                    "{}_remove_min ({}) exceeds {}_remove_max ({})",
                    phase, min, phase, max
                )));
            }
        }
        Ok(())
    }

    /// Overlays values the user typed on the command line onto `self`
    /// (typically loaded from a file), leaving everything else untouched.
    pub fn merge_from_cli(&mut self, cli: &SearchParams, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(deterministic_seed);
        update_if_present!(deterministic_step_floor);
        update_if_present!(deterministic_steps_per_piece);
        update_if_present!(deterministic_remove_min);
        update_if_present!(deterministic_remove_max);

        update_if_present!(random_attempts);
        update_if_present!(random_step_floor);
        update_if_present!(random_steps_per_piece);
        update_if_present!(random_remove_min);
        update_if_present!(random_remove_max);

        update_if_present!(anchor_scan_cap);
        update_if_present!(anchor_lookahead);
        update_if_present!(threads);
        update_if_present!(seed);
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateParams {
    /// Slack multiplier applied to the required cell count
    #[arg(long, default_value_t = 1.23)]
    pub factor: f64,
}

impl Default for EstimateParams {
    fn default() -> Self {
        Self { factor: 1.23 }
    }
}

impl EstimateParams {
    pub fn validate(&self) -> PackResult<()> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(PackError::Config(format!(
                "factor must be a positive number, got {}",
                self.factor
            )));
        }
        Ok(())
    }

    pub fn merge_from_cli(&mut self, cli: &EstimateParams, matches: &ArgMatches) {
        if matches.value_source("factor") == Some(ValueSource::CommandLine) {
            self.factor = cli.factor;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}
