use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::geom_id::GeomId;

/// Calibrated energy deposit in a calorimeter block
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct CalorimeterHit<B = GeomId> {
    pub block: B,
    /// Time in ns
    pub time: f64,
    /// Energy in MeV
    #[serde(default)]
    pub energy: f64,
}

impl<B> CalorimeterHit<B> {
    pub fn new(block: B, time: f64, energy: f64) -> Self {
        Self { block, time, energy }
    }
}

/// Simulated energy deposition step in a calorimeter block
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct StepHit<B = GeomId> {
    pub block: B,
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub track_id: Option<i32>,
    #[serde(default)]
    pub parent_track_id: Option<i32>,
}

impl<B> StepHit<B> {
    /// Index of the primary particle this step belongs to
    ///
    /// This is the parent track id, or the track id if the parent is
    /// unknown. Steps of a primary particle itself have parent 0, the
    /// steps of its secondaries are attributed to the primary.
    pub fn primary_index(&self) -> Option<i32> {
        self.parent_track_id.or(self.track_id)
    }
}

/// Kind of a primary particle
#[derive(
    Deserialize,
    Serialize,
    Copy,
    Clone,
    Debug,
    Display,
    EnumString,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParticleKind {
    Gamma,
    Electron,
    Positron,
    Alpha,
    #[default]
    Other,
}

#[derive(Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq)]
pub struct PrimaryParticle {
    #[serde(default)]
    pub kind: ParticleKind,
    /// Kinetic energy in MeV
    #[serde(default)]
    pub energy: f64,
}

/// Simulation truth of an event
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SimulatedData<B = GeomId> {
    #[serde(default)]
    pub primary_particles: Vec<PrimaryParticle>,
    /// Steps in calorimeter blocks, `None` if the simulation did not
    /// record them
    #[serde(default)]
    pub calo_step_hits: Option<Vec<StepHit<B>>>,
}

impl<B> SimulatedData<B> {
    /// Number of primary gammas
    pub fn ngammas(&self) -> usize {
        self.primary_particles
            .iter()
            .filter(|p| p.kind == ParticleKind::Gamma)
            .count()
    }
}

/// Calibrated detector data of an event
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct CalibratedData<B = GeomId> {
    #[serde(default)]
    pub calorimeter_hits: Vec<CalorimeterHit<B>>,
}

#[derive(
    Deserialize,
    Serialize,
    Copy,
    Clone,
    Debug,
    Display,
    EnumString,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Charge {
    #[default]
    Neutral,
    Positive,
    Negative,
    Undefined,
}

/// Reconstructed particle track
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ParticleTrack<B = GeomId> {
    pub track_id: i32,
    #[serde(default)]
    pub charge: Charge,
    /// Associated calorimeter hits in reconstruction order
    #[serde(default)]
    pub calorimeter_hits: Vec<CalorimeterHit<B>>,
}

impl<B> ParticleTrack<B> {
    pub fn is_neutral(&self) -> bool {
        self.charge == Charge::Neutral
    }

    /// Summed energy of the associated calorimeter hits
    pub fn energy(&self) -> f64 {
        self.calorimeter_hits.iter().map(|h| h.energy).sum()
    }
}

/// A detector event with all the data banks relevant for the analysis
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Event<B = GeomId> {
    #[serde(default)]
    pub id: usize,
    #[serde(default)]
    pub calibrated_data: Option<CalibratedData<B>>,
    #[serde(default)]
    pub simulated_data: Option<SimulatedData<B>>,
    #[serde(default)]
    pub particle_track_data: Option<Vec<ParticleTrack<B>>>,
}

impl<B> Event<B> {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            calibrated_data: None,
            simulated_data: None,
            particle_track_data: None,
        }
    }

    /// Neutral reconstructed tracks, i.e. gamma candidates
    pub fn neutral_tracks(&self) -> impl Iterator<Item = &ParticleTrack<B>> {
        self.particle_track_data
            .iter()
            .flatten()
            .filter(|t| t.is_neutral())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_index_prefers_parent() {
        let mut step = StepHit {
            block: 0u32,
            time: 0.,
            track_id: None,
            parent_track_id: Some(2),
        };
        assert_eq!(step.primary_index(), Some(2));
        step.track_id = Some(5);
        assert_eq!(step.primary_index(), Some(2));
        step.parent_track_id = None;
        assert_eq!(step.primary_index(), Some(5));
        step.track_id = None;
        assert_eq!(step.primary_index(), None);
    }

    #[test]
    fn read_yaml_event() {
        let ev: Event = serde_yaml::from_str(
            r"
id: 7
calibrated_data:
  calorimeter_hits:
    - { block: '[1302:0.0.3.4]', time: 1.5, energy: 0.8 }
simulated_data:
  primary_particles:
    - { kind: gamma, energy: 1.0 }
    - { kind: electron }
    - { kind: gamma }
  calo_step_hits:
    - { block: '[1302:0.0.3.4]', time: 1.2, track_id: 1 }
particle_track_data:
  - track_id: 3
    calorimeter_hits:
      - { block: '[1302:0.0.3.4]', time: 1.5, energy: 0.8 }
  - track_id: 4
    charge: negative
",
        )
        .unwrap();
        assert_eq!(ev.id, 7);
        let sd = ev.simulated_data.as_ref().unwrap();
        assert_eq!(sd.ngammas(), 2);
        assert_eq!(sd.calo_step_hits.as_ref().unwrap().len(), 1);
        let neutral: Vec<_> = ev.neutral_tracks().map(|t| t.track_id).collect();
        assert_eq!(neutral, vec![3]);
        assert_eq!(ev.neutral_tracks().next().unwrap().energy(), 0.8);
    }
}
