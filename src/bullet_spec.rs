//! Projectile catalog addressed by slash-delimited paths such as
//! `6.5/6.5 creedmoor/140`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BallisticsError, Result};
use crate::projectile::{BallisticCoefficient, Projectile};

const BUILTIN_CATALOG: &str = include_str!("../data/bullets.json");

/// Leaf entry of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletSpec {
    /// Millimeters
    pub diameter: f64,
    pub weight_in_grams: f64,
    /// m/s
    pub muzzle_velocity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ballistic_coefficient_g7: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ballistic_coefficient_g1: Option<f64>,
}

impl BulletSpec {
    /// Selected ballistic coefficient; G7 wins, absent or zero values are skipped
    pub fn ballistic_coefficient(&self) -> Option<BallisticCoefficient> {
        let present = |bc: Option<f64>| bc.filter(|v| *v != 0.0);
        present(self.ballistic_coefficient_g7)
            .map(BallisticCoefficient::G7)
            .or_else(|| present(self.ballistic_coefficient_g1).map(BallisticCoefficient::G1))
    }

    pub fn to_projectile(&self) -> Result<Projectile> {
        let bc = self.ballistic_coefficient().ok_or_else(|| {
            BallisticsError::Configuration("missing ballistic coefficient".to_string())
        })?;
        Ok(Projectile::new(self.diameter, self.weight_in_grams, self.muzzle_velocity)
            .with_ballistic_coefficient(bc))
    }
}

/// Nested JSON catalog of bullet specs
#[derive(Debug, Clone)]
pub struct BulletCatalog {
    root: Value,
}

impl BulletCatalog {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(Self { root: serde_json::from_str(json)? })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self { root: serde_json::from_reader(std::io::BufReader::new(file))? })
    }

    /// Catalog shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_CATALOG)
    }

    pub fn get(&self, path: &str) -> Result<BulletSpec> {
        let mut node = &self.root;
        for segment in path.split('/') {
            node = node.get(segment).ok_or_else(|| BallisticsError::UnknownBullet {
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
        }
        BulletSpec::deserialize(node).map_err(|e| BallisticsError::InvalidBulletSpec {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn projectile(&self, path: &str) -> Result<Projectile> {
        self.get(path)?.to_projectile()
    }

    /// Paths of every leaf spec, sorted
    pub fn paths(&self) -> Vec<String> {
        fn walk(node: &Value, prefix: &str, out: &mut Vec<String>) {
            let Some(map) = node.as_object() else { return };
            if map.contains_key("diameter") {
                out.push(prefix.to_string());
                return;
            }
            for (key, child) in map {
                let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}/{key}") };
                walk(child, &path, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.root, "", &mut out);
        out.sort();
        out
    }
}
