use crate::application::SimulationSettings;
use crate::domains::crowd::{ArrivalSettings, DivergenceSettings};
use crate::domains::path_network::{
    PathDefinition, PathKind, PathParams, SpeedDistribution, StandingProfile, WalkingProfile, WaypointSpec,
    MIN_LANE_SPACING,
};
use anyhow::{bail, Result};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub crowd: CrowdConfig,
    #[serde(default)]
    pub paths: Vec<PathConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticks per simulated second.
    pub tick_rate: f32,
    /// Ticks to run before exiting; 0 runs until interrupted.
    pub ticks: u64,
    pub seed: Option<u64>,
    pub settle_time: f32,
    /// Pace ticks against the wall clock instead of running flat out.
    pub realtime: bool,
    /// JSON Lines file receiving every crowd event.
    pub event_log: Option<String>,
    /// fast_log file for user-visible warnings.
    pub log_file: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            ticks: 900,
            seed: None,
            settle_time: 5.0,
            realtime: false,
            event_log: None,
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrowdConfig {
    pub diverge_threshold: f32,
    pub min_time_between_diverge: f32,
    pub rescan_interval: f32,
    pub stickiness_exponent: f32,
    pub close_enough_distance: f32,
    pub close_enough_final_distance: f32,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        let divergence = DivergenceSettings::default();
        let arrival = ArrivalSettings::default();
        Self {
            diverge_threshold: divergence.threshold,
            min_time_between_diverge: divergence.min_time_between,
            rescan_interval: divergence.rescan_interval,
            stickiness_exponent: divergence.stickiness_exponent,
            close_enough_distance: arrival.close_enough_distance,
            close_enough_final_distance: arrival.close_enough_final_distance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKindConfig {
    Walking,
    Standing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointConfig {
    pub position: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedConfig {
    pub mean: f32,
    pub variance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub name: String,
    pub kind: PathKindConfig,
    pub waypoints: Vec<WaypointConfig>,
    pub lane_count: usize,
    pub lane_spacing: f32,
    pub loop_path: bool,
    pub stickiness: f32,
    pub kill_at_start: bool,
    pub kill_at_end: bool,
    pub density: f32,
    pub running_proportion: f32,
    pub back_proportion: f32,
    pub walk_speed: SpeedConfig,
    pub run_speed: SpeedConfig,
    pub max_sigma: f32,
    pub position_jitter: [f32; 2],
    pub clump_mean: f32,
}

impl Default for PathConfig {
    fn default() -> Self {
        let params = PathParams::default();
        let walking = WalkingProfile::default();
        Self {
            name: String::new(),
            kind: PathKindConfig::Walking,
            waypoints: Vec::new(),
            lane_count: params.lane_count,
            lane_spacing: params.lane_spacing,
            loop_path: params.loop_path,
            stickiness: params.stickiness,
            kill_at_start: params.kill_at_start,
            kill_at_end: params.kill_at_end,
            density: params.density,
            running_proportion: walking.running_proportion,
            back_proportion: walking.back_proportion,
            walk_speed: SpeedConfig {
                mean: walking.walk_speed.mean,
                variance: walking.walk_speed.variance,
            },
            run_speed: SpeedConfig {
                mean: walking.run_speed.mean,
                variance: walking.run_speed.variance,
            },
            max_sigma: walking.max_sigma,
            position_jitter: [params.position_jitter.x, params.position_jitter.y],
            clump_mean: StandingProfile::default().clump_mean,
        }
    }
}

impl PathConfig {
    pub fn into_definition(self) -> PathDefinition {
        let kind = match self.kind {
            PathKindConfig::Walking => PathKind::Walking(WalkingProfile {
                running_proportion: self.running_proportion,
                back_proportion: self.back_proportion,
                walk_speed: SpeedDistribution {
                    mean: self.walk_speed.mean,
                    variance: self.walk_speed.variance,
                },
                run_speed: SpeedDistribution {
                    mean: self.run_speed.mean,
                    variance: self.run_speed.variance,
                },
                max_sigma: self.max_sigma,
            }),
            PathKindConfig::Standing => PathKind::Standing(StandingProfile {
                clump_mean: self.clump_mean,
            }),
        };
        PathDefinition {
            name: self.name,
            kind,
            waypoints: self
                .waypoints
                .iter()
                .map(|w| WaypointSpec::scaled(Vec3::from_array(w.position), w.scale))
                .collect(),
            params: PathParams {
                lane_count: self.lane_count,
                lane_spacing: self.lane_spacing,
                loop_path: self.loop_path,
                stickiness: self.stickiness,
                kill_at_start: self.kill_at_start,
                kill_at_end: self.kill_at_end,
                density: self.density,
                position_jitter: Vec2::from_array(self.position_jitter),
            },
        }
    }

    fn walking(name: &str, points: &[[f32; 3]]) -> Self {
        Self {
            name: name.to_string(),
            waypoints: points
                .iter()
                .map(|&position| WaypointConfig { position, scale: 1.0 })
                .collect(),
            ..Self::default()
        }
    }
}

fn in_unit_range(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}

impl FromStr for Config {
    type Err = anyhow::Error;

    /// Parse and validate a TOML document.
    fn from_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        content.parse::<Config>()
    }

    /// Clamp lane count and spacing to their minimums and reject values that
    /// cannot be interpreted.
    pub fn validate(&mut self) -> Result<()> {
        if !(self.simulation.tick_rate > 0.0) {
            bail!("simulation.tick_rate must be positive");
        }
        let crowd = &self.crowd;
        for (name, value) in [
            ("diverge_threshold", crowd.diverge_threshold),
            ("min_time_between_diverge", crowd.min_time_between_diverge),
            ("close_enough_distance", crowd.close_enough_distance),
            ("close_enough_final_distance", crowd.close_enough_final_distance),
        ] {
            if !(value > 0.0) {
                bail!("crowd.{} must be positive, got {}", name, value);
            }
        }
        if crowd.rescan_interval < 0.0 || crowd.stickiness_exponent < 0.0 {
            bail!("crowd.rescan_interval and crowd.stickiness_exponent must not be negative");
        }

        for path in &mut self.paths {
            path.lane_count = path.lane_count.max(1);
            path.lane_spacing = path.lane_spacing.max(MIN_LANE_SPACING);
            for (name, value) in [
                ("stickiness", path.stickiness),
                ("running_proportion", path.running_proportion),
                ("back_proportion", path.back_proportion),
            ] {
                if !in_unit_range(value) {
                    bail!("path '{}': {} must be within [0, 1], got {}", path.name, name, value);
                }
            }
            if path.density < 0.0 || path.clump_mean < 0.0 || path.max_sigma < 0.0 {
                bail!("path '{}': density, clump_mean and max_sigma must not be negative", path.name);
            }
        }
        Ok(())
    }

    pub fn simulation_settings(&self) -> SimulationSettings {
        SimulationSettings {
            seed: self.simulation.seed,
            settle_time: self.simulation.settle_time,
            divergence: DivergenceSettings {
                threshold: self.crowd.diverge_threshold,
                min_time_between: self.crowd.min_time_between_diverge,
                rescan_interval: self.crowd.rescan_interval,
                stickiness_exponent: self.crowd.stickiness_exponent,
            },
            arrival: ArrivalSettings {
                close_enough_distance: self.crowd.close_enough_distance,
                close_enough_final_distance: self.crowd.close_enough_final_distance,
            },
        }
    }

    pub fn path_definitions(&self) -> Vec<PathDefinition> {
        self.paths.iter().cloned().map(PathConfig::into_definition).collect()
    }
}

impl Default for Config {
    /// A plaza crossed by two three-lane walkways with a standing area at the crossing.
    fn default() -> Self {
        let mut avenue = PathConfig::walking("avenue", &[[-40.0, 0.0, 0.0], [0.0, 0.0, 0.0], [40.0, 0.0, 0.0]]);
        avenue.lane_count = 3;
        avenue.lane_spacing = 1.2;

        let mut crossing = PathConfig::walking("crossing", &[[0.0, 0.0, -30.0], [0.0, 0.0, 2.0], [0.0, 0.0, 30.0]]);
        crossing.lane_count = 2;
        crossing.stickiness = 0.7;

        let mut plaza = PathConfig::walking(
            "plaza",
            &[[8.0, 0.0, 8.0], [20.0, 0.0, 8.0], [20.0, 0.0, 20.0], [8.0, 0.0, 20.0]],
        );
        plaza.kind = PathKindConfig::Standing;
        plaza.density = 0.1;
        plaza.position_jitter = [0.8, 0.8];

        Self {
            simulation: SimulationConfig {
                seed: Some(42),
                ..SimulationConfig::default()
            },
            crowd: CrowdConfig::default(),
            paths: vec![avenue, crossing, plaza],
        }
    }
}
