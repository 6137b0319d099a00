//! Typed impact results assembled from raw graph outputs.

use crate::compute::Ledger;
use crate::error::ImpactError;
use crate::model::llm::asset;
use crate::value::BoundedValue;
use serde::Serialize;
use std::fmt;
use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Energy,
    Gwp,
    Adpe,
    Pe,
    Water,
}

impl MetricKind {
    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Energy => "kWh",
            MetricKind::Gwp => "kgCO2eq",
            MetricKind::Adpe => "kgSbeq",
            MetricKind::Pe => "MJ",
            MetricKind::Water => "L",
        }
    }
}

/// A named quantity with its fixed unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactMetric {
    pub kind: MetricKind,
    pub value: BoundedValue,
    pub unit: &'static str,
}

impl ImpactMetric {
    pub fn new(kind: MetricKind, value: BoundedValue) -> Self {
        Self { kind, value, unit: kind.unit() }
    }
}

impl Add for ImpactMetric {
    type Output = ImpactMetric;

    fn add(self, rhs: ImpactMetric) -> ImpactMetric {
        debug_assert_eq!(self.kind, rhs.kind, "adding metrics of different kinds");
        ImpactMetric::new(self.kind, self.value + rhs.value)
    }
}

impl fmt::Display for ImpactMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// The nine raw outputs of one evaluation, before packaging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactFields {
    pub request_energy: BoundedValue,
    pub usage_gwp: BoundedValue,
    pub usage_adpe: BoundedValue,
    pub usage_pe: BoundedValue,
    pub usage_water: BoundedValue,
    pub embodied_gwp: BoundedValue,
    pub embodied_adpe: BoundedValue,
    pub embodied_pe: BoundedValue,
    pub embodied_water: BoundedValue,
}

impl ImpactFields {
    pub fn from_ledger(ledger: &Ledger<BoundedValue>) -> Result<Self, ImpactError> {
        let get = |name: &str| ledger.get(name).copied().ok_or_else(|| ImpactError::MissingOutput(name.to_string()));
        Ok(Self {
            request_energy: get(asset::REQUEST_ENERGY)?,
            usage_gwp: get(asset::REQUEST_USAGE_GWP)?,
            usage_adpe: get(asset::REQUEST_USAGE_ADPE)?,
            usage_pe: get(asset::REQUEST_USAGE_PE)?,
            usage_water: get(asset::REQUEST_USAGE_WATER)?,
            embodied_gwp: get(asset::REQUEST_EMBODIED_GWP)?,
            embodied_adpe: get(asset::REQUEST_EMBODIED_ADPE)?,
            embodied_pe: get(asset::REQUEST_EMBODIED_PE)?,
            embodied_water: get(asset::REQUEST_EMBODIED_WATER)?,
        })
    }

    /// Combines an all-minimums pass (`self`) with an all-maximums pass: each
    /// field becomes `[self.min, upper.max]`.
    pub fn span_to(&self, upper: &ImpactFields) -> Result<Self, ImpactError> {
        let span = |lo: BoundedValue, hi: BoundedValue| BoundedValue::interval(lo.min(), hi.max());
        Ok(Self {
            request_energy: span(self.request_energy, upper.request_energy)?,
            usage_gwp: span(self.usage_gwp, upper.usage_gwp)?,
            usage_adpe: span(self.usage_adpe, upper.usage_adpe)?,
            usage_pe: span(self.usage_pe, upper.usage_pe)?,
            usage_water: span(self.usage_water, upper.usage_water)?,
            embodied_gwp: span(self.embodied_gwp, upper.embodied_gwp)?,
            embodied_adpe: span(self.embodied_adpe, upper.embodied_adpe)?,
            embodied_pe: span(self.embodied_pe, upper.embodied_pe)?,
            embodied_water: span(self.embodied_water, upper.embodied_water)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageImpacts {
    pub energy: ImpactMetric,
    pub gwp: ImpactMetric,
    pub adpe: ImpactMetric,
    pub pe: ImpactMetric,
    pub water: ImpactMetric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbodiedImpacts {
    pub gwp: ImpactMetric,
    pub adpe: ImpactMetric,
    pub pe: ImpactMetric,
    pub water: ImpactMetric,
}

/// Usage, embodied and total impacts of one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactResult {
    pub energy: ImpactMetric,
    pub gwp: ImpactMetric,
    pub adpe: ImpactMetric,
    pub pe: ImpactMetric,
    pub water: ImpactMetric,
    pub usage: UsageImpacts,
    pub embodied: EmbodiedImpacts,
}

impl From<ImpactFields> for ImpactResult {
    fn from(fields: ImpactFields) -> Self {
        let usage = UsageImpacts {
            energy: ImpactMetric::new(MetricKind::Energy, fields.request_energy),
            gwp: ImpactMetric::new(MetricKind::Gwp, fields.usage_gwp),
            adpe: ImpactMetric::new(MetricKind::Adpe, fields.usage_adpe),
            pe: ImpactMetric::new(MetricKind::Pe, fields.usage_pe),
            water: ImpactMetric::new(MetricKind::Water, fields.usage_water),
        };
        let embodied = EmbodiedImpacts {
            gwp: ImpactMetric::new(MetricKind::Gwp, fields.embodied_gwp),
            adpe: ImpactMetric::new(MetricKind::Adpe, fields.embodied_adpe),
            pe: ImpactMetric::new(MetricKind::Pe, fields.embodied_pe),
            water: ImpactMetric::new(MetricKind::Water, fields.embodied_water),
        };

        Self {
            // Hardware manufacturing is not counted as energy.
            energy: usage.energy,
            gwp: usage.gwp + embodied.gwp,
            adpe: usage.adpe + embodied.adpe,
            pe: usage.pe + embodied.pe,
            water: usage.water + embodied.water,
            usage,
            embodied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(v: f64) -> ImpactFields {
        let s = BoundedValue::scalar(v);
        ImpactFields {
            request_energy: s,
            usage_gwp: s,
            usage_adpe: s,
            usage_pe: s,
            usage_water: s,
            embodied_gwp: BoundedValue::scalar(v * 10.0),
            embodied_adpe: s,
            embodied_pe: s,
            embodied_water: s,
        }
    }

    #[test]
    fn test_totals_sum_usage_and_embodied() {
        let result = ImpactResult::from(fields(1.0));
        assert_eq!(result.gwp.value, BoundedValue::scalar(11.0));
        assert_eq!(result.gwp.unit, "kgCO2eq");
        assert_eq!(result.energy, result.usage.energy);
        assert_eq!(result.water.kind, MetricKind::Water);
    }

    #[test]
    fn test_span_reduces_interval_candidates() {
        let mut lower = fields(1.0);
        lower.request_energy = BoundedValue::interval(0.5, 1.5).unwrap();
        let mut upper = fields(2.0);
        upper.request_energy = BoundedValue::interval(1.8, 2.5).unwrap();

        let merged = lower.span_to(&upper).unwrap();
        assert_eq!(merged.request_energy, BoundedValue::interval(0.5, 2.5).unwrap());
        assert_eq!(merged.usage_gwp, BoundedValue::interval(1.0, 2.0).unwrap());
    }

    #[test]
    fn test_span_rejects_non_monotone_passes() {
        let err = fields(2.0).span_to(&fields(1.0)).unwrap_err();
        assert!(matches!(err, ImpactError::InvalidRange(_)));
    }

    #[test]
    fn test_metric_serializes_with_unit() {
        let json = serde_json::to_value(ImpactMetric::new(MetricKind::Pe, BoundedValue::scalar(2.0))).unwrap();
        assert_eq!(json["kind"], "pe");
        assert_eq!(json["unit"], "MJ");
        assert_eq!(json["value"], 2.0);
    }
}
