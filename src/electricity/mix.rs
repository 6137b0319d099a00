//! mix.rs
//! Electricity-mix impact factors per geographic zone.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Zone code of the world-average row.
pub const WORLD_ZONE: &str = "WOR";

#[derive(Error, Debug)]
pub enum MixError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed electricity mix table: {0}")]
    Csv(#[from] csv::Error),
    #[error("Zone '{zone}' has no water factor and the table has no world row to fall back on")]
    MissingWorldWaterFactor { zone: String },
}

/// Grid impact factors per kWh of electricity consumed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridFactors {
    /// kgSbeq / kWh
    pub adpe: f64,
    /// MJ / kWh
    pub pe: f64,
    /// kgCO2eq / kWh
    pub gwp: f64,
    /// L / kWh
    pub wcf: f64,
}

/// Electricity mix of one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricityMix {
    /// ISO 3166-1 alpha-3 code of the zone.
    pub zone: String,
    pub adpe: f64,
    pub pe: f64,
    pub gwp: f64,
    pub wcf: f64,
    /// The zone had no water factor of its own; `wcf` is the world average.
    #[serde(default)]
    pub wcf_is_world_average: bool,
}

impl ElectricityMix {
    pub fn grid_factors(&self) -> GridFactors {
        GridFactors { adpe: self.adpe, pe: self.pe, gwp: self.gwp, wcf: self.wcf }
    }
}

/// One CSV row. A blank or absent `wcf` means "unknown".
#[derive(Debug, Deserialize)]
struct MixRow {
    name: String,
    adpe: f64,
    pe: f64,
    gwp: f64,
    #[serde(default)]
    wcf: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ElectricityMixRepository {
    mixes: Vec<ElectricityMix>,
}

impl ElectricityMixRepository {
    pub fn new(mixes: Vec<ElectricityMix>) -> Self {
        Self { mixes }
    }

    pub fn find(&self, zone: &str) -> Option<&ElectricityMix> {
        self.mixes.iter().find(|mix| mix.zone == zone)
    }

    pub fn len(&self) -> usize { self.mixes.len() }

    pub fn is_empty(&self) -> bool { self.mixes.is_empty() }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MixError> {
        Self::from_reader(File::open(path)?)
    }

    /// Reads a `name,adpe,pe,gwp,wcf` table.
    ///
    /// Zones whose water factor is blank or zero take the world-average water
    /// factor (a warning is logged per zone). The other factors are never
    /// substituted.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MixError> {
        let mut table = csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

        let mut rows = Vec::new();
        for row in table.deserialize::<MixRow>() {
            rows.push(row?);
        }

        let world_wcf = rows
            .iter()
            .find(|row| row.name.eq_ignore_ascii_case(WORLD_ZONE))
            .and_then(|row| row.wcf)
            .filter(|&wcf| wcf != 0.0);

        let mut mixes = Vec::with_capacity(rows.len());
        for row in rows {
            let (wcf, wcf_is_world_average) = match row.wcf {
                Some(wcf) if wcf != 0.0 => (wcf, false),
                _ => {
                    let world = world_wcf.ok_or_else(|| MixError::MissingWorldWaterFactor { zone: row.name.clone() })?;
                    warn!(zone = %row.name, world_wcf = world, "no water consumption factor for zone, using world average");
                    (world, true)
                }
            };
            mixes.push(ElectricityMix {
                zone: row.name,
                adpe: row.adpe,
                pe: row.pe,
                gwp: row.gwp,
                wcf,
                wcf_is_world_average,
            });
        }

        Ok(Self { mixes })
    }
}
