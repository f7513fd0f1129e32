use std::borrow::Cow;
use std::mem::take;

use derive_builder::Builder;
use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    cluster::{cluster_gammas, TIME_GAP},
    compare::{compare, Comparison},
    config::{ClusterSource, Config},
    diagnostics::{Diagnostics, EventDiagnostics, HistogramConfig},
    efficiency::{EfficiencyCounters, EfficiencyReport},
    error::{AnalysisError, Skip},
    event::Event,
    extract::{calibrated_hits, neutral_track_hits, reconstructed_gammas, simulated_gammas},
    traits::{Block, Locate},
};

/// Gamma tracking efficiency analysis
///
/// Events are first scored, which compares the reconstructed and the
/// clustered gamma candidates to the simulated truth. Recording a
/// score then updates the running counters. Scoring only needs
/// shared access and can run in parallel; see
/// [process_all](Self::process_all).
///
/// Use [GammaTrackingEfficiencyBuilder] to construct a new analysis:
///
/// ```
/// use gteff::prelude::*;
///
/// let locator: AdjacencyLocator<u32> = [(1, 2), (2, 3)].into_iter().collect();
/// let analysis = GammaTrackingEfficiencyBuilder::default()
///     .locator(locator)
///     .time_gap(2.5)
///     .build()
///     .unwrap();
/// ```
#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct GammaTrackingEfficiency<L> {
    /// Neighbourhood of calorimeter blocks
    locator: L,
    /// Maximum time difference in ns between consecutive cluster hits
    #[builder(default = "TIME_GAP")]
    time_gap: f64,
    #[builder(default)]
    cluster_source: ClusterSource,
    #[builder(default)]
    histograms: HistogramConfig,
    #[builder(setter(skip))]
    tracking: EfficiencyCounters,
    #[builder(setter(skip))]
    clustering: EfficiencyCounters,
    #[builder(setter(skip))]
    diagnostics: Option<Diagnostics>,
}

/// Per-event result of the comparison with the simulated truth
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct EventScore {
    pub event: usize,
    /// Reconstructed neutral tracks compared to the truth
    pub tracking: Comparison,
    /// Calorimeter clusters compared to the truth
    pub clustering: Comparison,
    /// Number of primary gammas in the simulation
    pub nsimulated: usize,
    pub diagnostics: EventDiagnostics,
}

/// What happened to a processed event
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProcessStatus {
    Scored,
    Skipped(Skip),
}

/// Final result of an analysis run
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub efficiency: EfficiencyReport,
    pub diagnostics: Diagnostics,
}

impl<L> GammaTrackingEfficiency<L> {
    /// New analysis with the settings from `config`
    pub fn with_config(locator: L, config: &Config) -> Self {
        Self {
            locator,
            time_gap: config.analysis.time_gap,
            cluster_source: config.analysis.cluster_source,
            histograms: config.histograms,
            tracking: Default::default(),
            clustering: Default::default(),
            diagnostics: None,
        }
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Running counters for the reconstructed neutral tracks
    pub fn tracking(&self) -> &EfficiencyCounters {
        &self.tracking
    }

    /// Running counters for the plain calorimeter clustering
    pub fn clustering(&self) -> &EfficiencyCounters {
        &self.clustering
    }

    /// Update the running counters with the score of one event
    pub fn record(&mut self, score: &EventScore) {
        trace!("Recording event {}", score.event);
        self.tracking.record(&score.tracking, score.nsimulated);
        self.clustering.record(&score.clustering, score.nsimulated);
        let histograms = &self.histograms;
        self.diagnostics
            .get_or_insert_with(|| Diagnostics::new(histograms))
            .record(&score.diagnostics);
    }

    /// Final efficiencies and distributions
    ///
    /// This resets all counters, so the analysis can be reused for a
    /// new run.
    pub fn finalize(&mut self) -> RunSummary {
        let efficiency = EfficiencyReport {
            tracking: take(&mut self.tracking).summary(),
            clustering: take(&mut self.clustering).summary(),
        };
        let diagnostics = self
            .diagnostics
            .take()
            .unwrap_or_else(|| Diagnostics::new(&self.histograms));
        RunSummary {
            efficiency,
            diagnostics,
        }
    }

    fn handle(
        &mut self,
        score: Result<EventScore, AnalysisError>,
    ) -> Result<ProcessStatus, AnalysisError> {
        match score {
            Ok(score) => {
                self.record(&score);
                Ok(ProcessStatus::Scored)
            }
            Err(AnalysisError::Skipped { event, reason }) => {
                debug!("Skipping event {event}: {reason}");
                Ok(ProcessStatus::Skipped(reason))
            }
            Err(err) => Err(err),
        }
    }
}

impl<L> GammaTrackingEfficiency<L> {
    /// Compare the gamma candidates of an event to the simulated truth
    ///
    /// This does not change the running counters.
    pub fn score<B>(&self, event: &Event<B>) -> Result<EventScore, AnalysisError>
    where
        B: Block,
        L: Locate<B>,
    {
        let calibrated = calibrated_hits(event)?;
        // steps without track id abort the run, so look at them first
        let truth = simulated_gammas(event)?;
        let hits = match self.cluster_source {
            ClusterSource::Calibrated => Cow::Borrowed(calibrated),
            ClusterSource::NeutralTracks => Cow::Owned(neutral_track_hits(event)?),
        };
        if hits.iter().any(|h| !h.time.is_finite()) {
            return Err(AnalysisError::skip(event.id, Skip::NonFiniteHitTime));
        }
        let clustered = cluster_gammas(&*hits, &self.locator, self.time_gap);
        let reconstructed = reconstructed_gammas(event)?;

        debug!("Event {}", event.id);
        truth.log_debug("Simulated gammas");
        reconstructed.log_debug("Reconstructed gammas");
        clustered.log_debug("Clustered gammas");

        let tracking = compare(&reconstructed, &truth);
        let clustering = compare(&clustered, &truth);
        debug!(
            "Event {}: {}/{} gammas tracked, {}/{} clustered",
            event.id, tracking.matched, tracking.ntruth, clustering.matched, clustering.ntruth
        );

        let nsimulated = event
            .simulated_data
            .as_ref()
            .map(|sd| sd.ngammas())
            .unwrap_or_default();
        let diagnostics = EventDiagnostics {
            clustered_calos: hits.len(),
            cluster_sizes: clustered.iter().map(|g| g.len()).collect(),
            calibrated_calos: calibrated.len(),
            gamma_energies: event.neutral_tracks().map(|t| t.energy()).collect(),
        };
        Ok(EventScore {
            event: event.id,
            tracking,
            clustering,
            nsimulated,
            diagnostics,
        })
    }

    /// Score an event and record the result
    ///
    /// Events that cannot be analysed are skipped without touching
    /// the counters. Only fatal errors are returned.
    pub fn process<B>(&mut self, event: &Event<B>) -> Result<ProcessStatus, AnalysisError>
    where
        B: Block,
        L: Locate<B>,
    {
        let score = self.score(event);
        self.handle(score)
    }

    /// Process a batch of events
    ///
    /// Events are scored in parallel and recorded in order. The first
    /// fatal error aborts the batch.
    pub fn process_all<B>(
        &mut self,
        events: &[Event<B>],
    ) -> Result<Vec<ProcessStatus>, AnalysisError>
    where
        B: Block + Send + Sync,
        L: Locate<B> + Sync,
    {
        let scores: Vec<_> = events.par_iter().map(|ev| self.score(ev)).collect();
        let mut status = Vec::with_capacity(scores.len());
        for score in scores {
            status.push(self.handle(score)?);
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        event::{
            CalibratedData, CalorimeterHit, Charge, ParticleKind, ParticleTrack,
            PrimaryParticle, SimulatedData, StepHit,
        },
        locator::AdjacencyLocator,
    };

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn analysis() -> GammaTrackingEfficiency<AdjacencyLocator<u32>> {
        let locator = [(5, 7), (7, 9)].into_iter().collect();
        GammaTrackingEfficiencyBuilder::default()
            .locator(locator)
            .build()
            .unwrap()
    }

    fn event(
        id: usize,
        hits: &[(u32, f64)],
        steps: &[(u32, i32)],
        tracks: &[(i32, &[u32])],
    ) -> Event<u32> {
        let mut ev = Event::new(id);
        ev.calibrated_data = Some(CalibratedData {
            calorimeter_hits: hits
                .iter()
                .map(|&(b, t)| CalorimeterHit::new(b, t, 0.5))
                .collect(),
        });
        let ngammas = steps.iter().map(|s| s.1).max().unwrap_or_default();
        ev.simulated_data = Some(SimulatedData {
            primary_particles: vec![
                PrimaryParticle {
                    kind: ParticleKind::Gamma,
                    energy: 1.
                };
                ngammas as usize
            ],
            calo_step_hits: Some(
                steps
                    .iter()
                    .map(|&(block, id)| StepHit {
                        block,
                        time: 0.,
                        track_id: Some(id),
                        parent_track_id: None,
                    })
                    .collect(),
            ),
        });
        ev.particle_track_data = Some(
            tracks
                .iter()
                .map(|&(track_id, blocks)| ParticleTrack {
                    track_id,
                    charge: Charge::Neutral,
                    calorimeter_hits: blocks
                        .iter()
                        .map(|&b| CalorimeterHit::new(b, 1., 0.5))
                        .collect(),
                })
                .collect(),
        );
        ev
    }

    fn events() -> Vec<Event<u32>> {
        vec![
            event(0, &[(5, 1.0), (7, 1.2)], &[(5, 1), (7, 1)], &[(1, &[5, 7])]),
            event(1, &[(5, 1.0), (7, 1.2)], &[(5, 1), (7, 1)], &[(1, &[5, 7, 9])]),
            event(
                2,
                &[(5, 1.0), (7, 5.0)],
                &[(5, 1), (7, 2)],
                &[(1, &[5]), (2, &[7])],
            ),
            event(3, &[(5, 1.0)], &[(5, 1)], &[]),
        ]
    }

    #[test]
    fn perfect_reconstruction() {
        init();
        let mut analysis = analysis();
        let ev = &events()[0];
        let score = analysis.score(ev).unwrap();
        assert_eq!(score.tracking.matched, 1);
        assert!(score.tracking.fully_matched());
        assert!(score.clustering.fully_matched());
        assert_eq!(score.diagnostics.cluster_sizes, vec![2]);
        assert_eq!(score.diagnostics.gamma_energies, vec![1.]);

        assert_eq!(analysis.process(ev).unwrap(), ProcessStatus::Scored);
        assert_eq!(analysis.tracking().ngood, 1);
        assert_eq!(analysis.tracking().ngood_events, 1);
        assert_eq!(analysis.tracking().good_gammas().value(), Some(1.));
    }

    #[test]
    fn extra_block_spoils_the_match() {
        init();
        let analysis = analysis();
        let score = analysis.score(&events()[1]).unwrap();
        assert_eq!(score.tracking.matched, 0);
        assert!(!score.tracking.fully_matched());
        assert_eq!(score.clustering.matched, 1);
    }

    #[test]
    fn time_gap_separates_gammas() {
        init();
        let analysis = analysis();
        let score = analysis.score(&events()[2]).unwrap();
        assert_eq!(score.clustering.ncandidates, 2);
        assert!(score.clustering.fully_matched());
        assert!(score.tracking.fully_matched());

        let analysis = GammaTrackingEfficiencyBuilder::default()
            .locator(analysis.locator().clone())
            .time_gap(5.)
            .build()
            .unwrap();
        let score = analysis.score(&events()[2]).unwrap();
        assert_eq!(score.clustering.ncandidates, 1);
        assert_eq!(score.clustering.matched, 0);
    }

    #[test]
    fn skipped_events_are_not_counted() {
        init();
        let mut analysis = analysis();
        let status = analysis.process(&events()[3]).unwrap();
        assert_eq!(status, ProcessStatus::Skipped(Skip::NoNeutralTracks));

        let mut ev = events()[0].clone();
        ev.calibrated_data.as_mut().unwrap().calorimeter_hits[0].time = f64::NAN;
        let status = analysis.process(&ev).unwrap();
        assert_eq!(status, ProcessStatus::Skipped(Skip::NonFiniteHitTime));

        assert_eq!(analysis.tracking(), &EfficiencyCounters::default());
        assert_eq!(analysis.clustering(), &EfficiencyCounters::default());
    }

    #[test]
    fn missing_track_id_aborts() {
        init();
        let mut analysis = analysis();
        let mut ev = events()[0].clone();
        let steps = ev
            .simulated_data
            .as_mut()
            .unwrap()
            .calo_step_hits
            .as_mut()
            .unwrap();
        steps[1].track_id = None;
        let err = analysis.process(&ev).unwrap_err();
        assert!(err.is_fatal());
        assert!(analysis.process_all(&[ev.clone()]).is_err());

        // not hidden by a broken hit time
        ev.calibrated_data.as_mut().unwrap().calorimeter_hits[0].time = f64::NAN;
        assert!(analysis.score(&ev).unwrap_err().is_fatal());

        // nor by missing neutral track hits
        let mut config = Config::default();
        config.analysis.cluster_source = ClusterSource::NeutralTracks;
        let tracks = GammaTrackingEfficiency::with_config(analysis.locator().clone(), &config);
        ev.particle_track_data = Some(Vec::new());
        assert!(tracks.score(&ev).unwrap_err().is_fatal());
    }

    #[test]
    fn parallel_processing() {
        init();
        let events = events();
        let mut sequential = analysis();
        for ev in &events {
            sequential.process(ev).unwrap();
        }
        let mut parallel = analysis();
        let status = parallel.process_all(&events).unwrap();
        assert_eq!(status.len(), events.len());
        assert_eq!(status[3], ProcessStatus::Skipped(Skip::NoNeutralTracks));
        assert_eq!(sequential.tracking(), parallel.tracking());
        assert_eq!(sequential.clustering(), parallel.clustering());

        let mut reversed: Vec<_> = events.clone();
        reversed.reverse();
        let mut other = analysis();
        other.process_all(&reversed).unwrap();
        assert_eq!(other.finalize(), parallel.finalize());
    }

    #[test]
    fn finalize_resets() {
        init();
        let mut analysis = analysis();
        analysis.process_all(&events()).unwrap();
        let summary = analysis.finalize();
        let tracking = summary.efficiency.tracking.counters;
        assert_eq!(tracking.nevents, 3);
        assert_eq!(tracking.ntotal, 4);
        assert_eq!(tracking.ngood, 3);
        assert_eq!(tracking.nzero_match, 1);
        assert_eq!(tracking.ngood_events, 2);
        assert_eq!(summary.efficiency.clustering.counters.ngood, 4);
        assert_eq!(summary.diagnostics.number_of_gammas.entries(), 3);

        assert_eq!(analysis.tracking(), &EfficiencyCounters::default());
        let empty = analysis.finalize();
        assert_eq!(empty.efficiency.tracking.good_gammas.value(), None);
        assert_eq!(empty.diagnostics.number_of_gammas.entries(), 0);
    }

    #[test]
    fn cluster_neutral_track_hits() {
        init();
        let ev = event(
            0,
            &[(5, 1.0), (7, 1.2), (20, 1.0)],
            &[(5, 1), (7, 1)],
            &[(1, &[5, 7])],
        );
        let calibrated = analysis();
        assert_eq!(calibrated.score(&ev).unwrap().clustering.ncandidates, 2);

        let mut config = Config::default();
        config.analysis.cluster_source = ClusterSource::NeutralTracks;
        let tracks = GammaTrackingEfficiency::with_config(calibrated.locator().clone(), &config);
        let score = tracks.score(&ev).unwrap();
        assert_eq!(score.clustering.ncandidates, 1);
        assert!(score.clustering.fully_matched());
        assert_eq!(score.diagnostics.calibrated_calos, 3);
        assert_eq!(score.diagnostics.clustered_calos, 2);
    }

    #[test]
    fn builder_requires_locator() {
        let res = GammaTrackingEfficiencyBuilder::<AdjacencyLocator<u32>>::default().build();
        assert!(res.is_err());
    }
}
