use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::compare::Comparison;

/// Running counters for the efficiency of one reconstruction method
#[derive(Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EfficiencyCounters {
    /// Number of scored events
    pub nevents: usize,
    /// Number of true gammas
    pub ntotal: usize,
    /// Number of primary gammas in the simulation
    pub nsimulated: usize,
    /// Number of correctly reconstructed gammas
    pub ngood: usize,
    /// Number of events without any candidate or true gamma
    pub nmiss: usize,
    /// Number of events in which no candidate matches
    pub nzero_match: usize,
    /// Number of events in which all true gammas are matched
    pub ngood_events: usize,
    /// Number of events with at least one true gamma
    pub nevents_with_gammas: usize,
}

impl EfficiencyCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one scored event
    pub fn record(&mut self, cmp: &Comparison, nsimulated: usize) {
        self.nevents += 1;
        self.nsimulated += nsimulated;
        if cmp.is_empty() {
            self.nmiss += 1;
            return;
        }
        self.ntotal += cmp.ntruth;
        self.ngood += cmp.matched;
        if cmp.matched == 0 {
            self.nzero_match += 1;
        }
        if cmp.ntruth > 0 {
            self.nevents_with_gammas += 1;
        }
        if cmp.fully_matched() {
            self.ngood_events += 1;
        }
    }

    /// Fraction of true gammas that were reconstructed correctly
    pub fn good_gammas(&self) -> Ratio {
        Ratio::new(self.ngood, self.ntotal)
    }

    /// Fraction of events without any gamma
    pub fn missed(&self) -> Ratio {
        Ratio::new(self.nmiss, self.nevents)
    }

    /// Fraction of all events that were fully reconstructed
    pub fn good_events(&self) -> Ratio {
        Ratio::new(self.ngood_events, self.nevents)
    }

    /// Fraction of events with true gammas that were fully reconstructed
    pub fn good_events_with_gammas(&self) -> Ratio {
        Ratio::new(self.ngood_events, self.nevents_with_gammas)
    }

    pub fn summary(&self) -> EfficiencySummary {
        EfficiencySummary {
            counters: *self,
            good_gammas: self.good_gammas(),
            missed: self.missed(),
            good_events: self.good_events(),
            good_events_with_gammas: self.good_events_with_gammas(),
        }
    }
}

/// A ratio of counts
///
/// The value is undefined if the denominator is zero.
#[derive(Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Ratio {
    pub numerator: usize,
    pub denominator: usize,
}

impl Ratio {
    pub fn new(numerator: usize, denominator: usize) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn value(&self) -> Option<f64> {
        (self.denominator > 0)
            .then(|| self.numerator as f64 / self.denominator as f64)
    }
}

impl Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} ", self.numerator, self.denominator)?;
        match self.value() {
            Some(v) => write!(f, "({:.2} %)", 100. * v),
            None => write!(f, "(undefined)"),
        }
    }
}

/// Final counters and derived efficiencies for one method
#[derive(Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq)]
pub struct EfficiencySummary {
    pub counters: EfficiencyCounters,
    pub good_gammas: Ratio,
    pub missed: Ratio,
    pub good_events: Ratio,
    pub good_events_with_gammas: Ratio,
}

impl Display for EfficiencySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of gammas well reconstructed = {}", self.good_gammas)?;
        writeln!(f, "Number of events without gammas = {}", self.missed)?;
        writeln!(
            f,
            "Number of events successfully reconstructed = {}",
            self.good_events
        )?;
        write!(
            f,
            "Number of events with gammas successfully reconstructed = {}",
            self.good_events_with_gammas
        )
    }
}

/// Efficiencies of the tracking and of the plain clustering
#[derive(Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq)]
pub struct EfficiencyReport {
    pub tracking: EfficiencySummary,
    pub clustering: EfficiencySummary,
}

impl Display for EfficiencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Gamma tracking:")?;
        writeln!(f, "{}", self.tracking)?;
        writeln!(f, "Gamma clustering:")?;
        write!(f, "{}", self.clustering)
    }
}
