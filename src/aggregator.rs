//! Multi constellation aggregation
use itertools::Itertools;

use crate::{
    observation::SatelliteObservation,
    prelude::{Constellation, Epoch},
    processor::EpochObservations,
};

/// [EpochAggregate] merges the [EpochObservations] of all enabled constellations,
/// for one epoch. The union of all used lists forms the solver input.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochAggregate {
    /// Reception [Epoch]
    pub t: Epoch,
    /// Per constellation [EpochObservations], in processing order
    pub constellations: Vec<EpochObservations>,
}

impl EpochAggregate {
    /// Merges these [EpochObservations] sampled at the same [Epoch]
    pub fn new(t: Epoch, constellations: Vec<EpochObservations>) -> Self {
        Self { t, constellations }
    }

    /// All used observations, constellation after constellation
    pub fn used(&self) -> Vec<&SatelliteObservation> {
        self.constellations
            .iter()
            .flat_map(|epoch| epoch.used.iter())
            .collect()
    }

    /// All unused observations, constellation after constellation
    pub fn unused(&self) -> Vec<&SatelliteObservation> {
        self.constellations
            .iter()
            .flat_map(|epoch| epoch.unused.iter())
            .collect()
    }

    /// Total number of used observations
    pub fn used_count(&self) -> usize {
        self.constellations.iter().map(|epoch| epoch.used.len()).sum()
    }

    /// Total number of [crate::prelude::SV]s in sight that were excluded
    pub fn visible_not_used(&self) -> usize {
        self.constellations
            .iter()
            .map(|epoch| epoch.visible_not_used)
            .sum()
    }

    /// [EpochObservations] of this [Constellation], if it is enabled
    pub fn constellation(&self, constellation: Constellation) -> Option<&EpochObservations> {
        self.constellations
            .iter()
            .find(|epoch| epoch.constellation == constellation)
    }

    /// Unique identifiers of used observations, for reporting
    pub fn used_ids(&self) -> String {
        self.used().iter().map(|obs| &obs.unique_id).join(", ")
    }
}
