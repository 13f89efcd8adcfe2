use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use glam::Vec2;
use umbra_engine::shadow::{ShadowConfig, ShadowTechnique};

/// Which technique the studio runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TechniqueKind {
    Dpsm,
    Ipsm,
    Cut { yaw: f32 },
}

impl TechniqueKind {
    fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dpsm" => Ok(TechniqueKind::Dpsm),
            "ipsm" | "warped" => Ok(TechniqueKind::Ipsm),
            "cut" => Ok(TechniqueKind::Cut { yaw: 0.0 }),
            other => bail!("unknown technique '{other}' (expected dpsm, ipsm or cut)"),
        }
    }

    pub fn build(self) -> ShadowTechnique {
        match self {
            TechniqueKind::Dpsm => ShadowTechnique::DualParaboloid,
            TechniqueKind::Ipsm => ShadowTechnique::warped(),
            TechniqueKind::Cut { yaw } => ShadowTechnique::Cut { angle: Vec2::new(yaw, 0.0) },
        }
    }
}

/// Settings of a studio run.
///
/// Positional arguments `[resolution] [frames] [output_dir]` win over the
/// `UMBRA_RESOLUTION`, `UMBRA_FRAMES` and `UMBRA_OUT` environment variables.
/// `UMBRA_TECHNIQUE`, `UMBRA_RELAX` and `UMBRA_CUT_YAW` are environment only.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    pub resolution: u32,
    pub frames: u32,
    pub output_dir: PathBuf,
    pub technique: TechniqueKind,
    pub relax_iterations: u32,
    pub viewport: [f32; 2],
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            resolution: 512,
            frames: 8,
            output_dir: PathBuf::from("umbra-out"),
            technique: TechniqueKind::Ipsm,
            relax_iterations: 1,
            viewport: [1280.0, 720.0],
        }
    }
}

impl StudioConfig {
    pub fn load<A, E>(args: A, env: E) -> Result<Self>
    where
        A: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = env("UMBRA_RESOLUTION") {
            config.resolution = parse_u32("UMBRA_RESOLUTION", &v)?;
        }
        if let Some(v) = env("UMBRA_FRAMES") {
            config.frames = parse_u32("UMBRA_FRAMES", &v)?;
        }
        if let Some(v) = env("UMBRA_OUT") {
            config.output_dir = PathBuf::from(v);
        }
        if let Some(v) = env("UMBRA_TECHNIQUE") {
            config.technique = TechniqueKind::parse(&v)?;
        }
        if let Some(v) = env("UMBRA_RELAX") {
            config.relax_iterations = parse_u32("UMBRA_RELAX", &v)?;
        }
        if let (TechniqueKind::Cut { .. }, Some(v)) = (config.technique, env("UMBRA_CUT_YAW")) {
            let yaw: f32 = v.trim().parse().with_context(|| format!("UMBRA_CUT_YAW: '{v}' is not a number"))?;
            config.technique = TechniqueKind::Cut { yaw };
        }

        let mut args = args.into_iter();
        if let Some(v) = args.next() {
            config.resolution = parse_u32("resolution", &v)?;
        }
        if let Some(v) = args.next() {
            config.frames = parse_u32("frames", &v)?;
        }
        if let Some(v) = args.next() {
            config.output_dir = PathBuf::from(v);
        }

        if !config.resolution.is_power_of_two() || config.resolution < 16 {
            bail!("resolution must be a power of two of at least 16, got {}", config.resolution);
        }
        Ok(config)
    }

    pub fn shadow_config(&self) -> ShadowConfig {
        ShadowConfig { relax_iterations: self.relax_iterations, ..ShadowConfig::default() }
    }
}

fn parse_u32(what: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{what}: '{value}' is not a non-negative integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_input() {
        let config = StudioConfig::load(Vec::new(), no_env).unwrap();
        assert_eq!(config, StudioConfig::default());
    }

    #[test]
    fn args_override_env() {
        let env = |k: &str| match k {
            "UMBRA_RESOLUTION" => Some("256".to_string()),
            "UMBRA_FRAMES" => Some("3".to_string()),
            _ => None,
        };
        let config = StudioConfig::load(args(&["1024"]), env).unwrap();
        assert_eq!(config.resolution, 1024);
        assert_eq!(config.frames, 3);
    }

    #[test]
    fn technique_from_env() {
        let env = |k: &str| match k {
            "UMBRA_TECHNIQUE" => Some("CUT".to_string()),
            "UMBRA_CUT_YAW" => Some("0.25".to_string()),
            "UMBRA_RELAX" => Some("0".to_string()),
            _ => None,
        };
        let config = StudioConfig::load(Vec::new(), env).unwrap();
        assert_eq!(config.technique, TechniqueKind::Cut { yaw: 0.25 });
        assert_eq!(config.shadow_config().relax_iterations, 0);
        assert_eq!(config.technique.build().name(), "CUT");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(StudioConfig::load(args(&["abc"]), no_env).is_err());
        assert!(StudioConfig::load(args(&["100"]), no_env).is_err());
        let env = |k: &str| (k == "UMBRA_TECHNIQUE").then(|| "vsm".to_string());
        assert!(StudioConfig::load(Vec::new(), env).is_err());
    }
}
