//! Drag coefficient lookup over the standard G1/G7 drag tables.

use std::io::Read;
use std::path::Path;

use log::debug;

use crate::constants::SPEED_OF_SOUND_MPS;
use crate::error::{BallisticsError, Result};
use crate::projectile::{BallisticCoefficient, Projectile};
use crate::DragModel;

const G1_TABLE_DATA: &str = include_str!("../drag_tables/g1.txt");
const G7_TABLE_DATA: &str = include_str!("../drag_tables/g7.txt");

/// Piecewise-linear table of `(speed_m_s, drag_coefficient)` points
#[derive(Debug, Clone, PartialEq)]
pub struct DragTable {
    points: Vec<(f64, f64)>,
}

impl DragTable {
    /// Build a table from `(mach, cd)` pairs, converting Mach to m/s
    pub fn from_mach_pairs(model: DragModel, pairs: &[(f64, f64)]) -> Result<Self> {
        let points: Vec<(f64, f64)> = pairs
            .iter()
            .map(|&(mach, cd)| (mach * SPEED_OF_SOUND_MPS, cd))
            .collect();
        Self::from_speed_pairs(model, points)
    }

    /// Build a table from `(speed_m_s, cd)` points
    ///
    /// Points must be non-empty and strictly ascending by speed; lookups rely
    /// on the ordering.
    pub fn from_speed_pairs(model: DragModel, points: Vec<(f64, f64)>) -> Result<Self> {
        if points.is_empty() {
            return Err(BallisticsError::InvalidDragTable {
                model: model.to_string(),
                reason: "table is empty".to_string(),
            });
        }
        if let Some(w) = points.windows(2).find(|w| w[1].0 <= w[0].0) {
            return Err(BallisticsError::InvalidDragTable {
                model: model.to_string(),
                reason: format!("speeds not strictly ascending at {} -> {} m/s", w[0].0, w[1].0),
            });
        }
        Ok(Self { points })
    }

    /// Parse a tab-separated `<mach>\t<cd>` resource, skipping blank lines
    pub fn parse<R: Read>(model: DragModel, reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut pairs = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            if record.len() != 2 {
                return Err(BallisticsError::DragTableParse {
                    line,
                    reason: format!("expected 2 fields, found {}", record.len()),
                });
            }
            let mach = parse_field(&record[0], line)?;
            let cd = parse_field(&record[1], line)?;
            pairs.push((mach, cd));
        }

        debug!("Parsed {} drag table with {} points", model, pairs.len());
        Self::from_mach_pairs(model, &pairs)
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drag coefficient at `speed` by linear interpolation between neighbours
    ///
    /// Beyond the last point the line through the last two points is
    /// extrapolated. Below the first point the interpolation runs from the
    /// origin `(0, 0)` to the second point, not from the first point.
    pub fn lookup(&self, speed: f64) -> f64 {
        let mut previous = (0.0, 0.0);
        let mut index = 0;
        for (i, &(table_speed, cd)) in self.points.iter().enumerate() {
            if speed - table_speed > 0.0 {
                previous = (table_speed, cd);
                index = i;
            } else if speed == table_speed {
                return cd;
            } else {
                break;
            }
        }

        if let Some(&next) = self.points.get(index + 1) {
            linear_interpolation(previous, next, speed)
        } else if index > 0 {
            linear_interpolation(self.points[index - 1], previous, speed)
        } else {
            self.points[0].1
        }
    }
}

fn parse_field(field: &str, line: u64) -> Result<f64> {
    field.parse::<f64>().map_err(|e| BallisticsError::DragTableParse {
        line,
        reason: format!("'{field}': {e}"),
    })
}

fn linear_interpolation((x1, y1): (f64, f64), (x2, y2): (f64, f64), x: f64) -> f64 {
    let x_ratio = (x - x1) / (x2 - x1);
    y1 + (y2 - y1) * x_ratio
}

/// Immutable pair of G1/G7 tables shared by every drag lookup
#[derive(Debug, Clone)]
pub struct DragCoefficientModel {
    g1: DragTable,
    g7: DragTable,
}

impl DragCoefficientModel {
    pub fn new(g1: DragTable, g7: DragTable) -> Self {
        Self { g1, g7 }
    }

    /// Standard G1/G7 tables compiled into the crate
    pub fn standard() -> Result<Self> {
        Ok(Self::new(
            DragTable::parse(DragModel::G1, G1_TABLE_DATA.as_bytes())?,
            DragTable::parse(DragModel::G7, G7_TABLE_DATA.as_bytes())?,
        ))
    }

    /// Load `g1.txt` and `g7.txt` from a directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let load = |model: DragModel| -> Result<DragTable> {
            let path = dir.join(model.file_name());
            debug!("Loading {} drag table from {}", model, path.display());
            DragTable::parse(model, std::fs::File::open(path)?)
        };
        Ok(Self::new(load(DragModel::G1)?, load(DragModel::G7)?))
    }

    pub fn table(&self, model: DragModel) -> &DragTable {
        match model {
            DragModel::G1 => &self.g1,
            DragModel::G7 => &self.g7,
        }
    }

    pub fn lookup(&self, model: DragModel, speed: f64) -> f64 {
        self.table(model).lookup(speed)
    }

    /// Projectile drag coefficient at the projectile's current speed
    ///
    /// The table coefficient appears in both numerator and denominator, so
    /// the value reduces to `mass / diameter²` unless the table returns zero,
    /// in which case the result is NaN.
    pub fn calculate_projectile_drag_coefficient(&self, projectile: &Projectile) -> Result<f64> {
        let model_cd = match projectile.ballistic_coefficient {
            Some(BallisticCoefficient::G7(_)) => self.g7.lookup(projectile.speed()),
            Some(BallisticCoefficient::G1(_)) => self.g1.lookup(projectile.speed()),
            None => {
                return Err(BallisticsError::Configuration(
                    "ballistic coefficient undefined".to_string(),
                ))
            }
        };
        Ok((projectile.mass_grams * model_cd) / (projectile.diameter_mm.powi(2) * model_cd))
    }
}
