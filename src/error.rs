use thiserror::Error;

/// Reason for not scoring an event
#[derive(Debug, Copy, Clone, Error, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Skip {
    #[error("no calibrated data")]
    MissingCalibratedData,
    #[error("no calibrated calorimeter hits")]
    NoCalibratedHits,
    #[error("calibrated hit time is not a finite number")]
    NonFiniteHitTime,
    #[error("no simulated data")]
    MissingSimulatedData,
    #[error("no simulated calorimeter step hits")]
    NoSimulatedStepHits,
    #[error("no particle track data")]
    MissingTrackData,
    #[error("no reconstructed neutral tracks")]
    NoNeutralTracks,
    #[error("no calorimeter hits associated to neutral tracks")]
    NoNeutralTrackHits,
    #[error("secondary particle from track {track_id} triggers a calorimeter block, but there are only {ngammas} primary gammas")]
    SecondaryParticle { track_id: i32, ngammas: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Missing primary track id for simulated step hit in block {block} of event {event}")]
    MissingPrimaryTrackId { event: usize, block: String },
    #[error("Skipping event {event}: {reason}")]
    Skipped { event: usize, reason: Skip },
}

impl AnalysisError {
    pub(crate) fn skip(event: usize, reason: Skip) -> Self {
        Self::Skipped { event, reason }
    }

    /// Whether the error should abort the run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Skipped { .. })
    }
}
