use std::collections::HashSet;

use log::{trace, warn};

use crate::{
    error::{AnalysisError, Skip},
    event::{CalorimeterHit, Event},
    gamma::GammaDict,
    traits::Block,
};

/// Track id of particles emitted at the primary vertex
pub const PRIMARY_VERTEX: i32 = 0;

/// Calibrated calorimeter hits of an event
///
/// Events without calibrated data or without any calorimeter hits
/// are skipped.
pub fn calibrated_hits<B>(event: &Event<B>) -> Result<&[CalorimeterHit<B>], AnalysisError> {
    let Some(cd) = event.calibrated_data.as_ref() else {
        return Err(AnalysisError::skip(event.id, Skip::MissingCalibratedData));
    };
    if cd.calorimeter_hits.is_empty() {
        return Err(AnalysisError::skip(event.id, Skip::NoCalibratedHits));
    }
    Ok(&cd.calorimeter_hits)
}

/// Calorimeter hits associated to reconstructed neutral tracks
pub fn neutral_track_hits<B: Copy>(
    event: &Event<B>,
) -> Result<Vec<CalorimeterHit<B>>, AnalysisError> {
    if event.particle_track_data.is_none() {
        return Err(AnalysisError::skip(event.id, Skip::MissingTrackData));
    }
    let hits: Vec<_> = event
        .neutral_tracks()
        .flat_map(|t| t.calorimeter_hits.iter().copied())
        .collect();
    if hits.is_empty() {
        return Err(AnalysisError::skip(event.id, Skip::NoNeutralTrackHits));
    }
    Ok(hits)
}

/// True gamma sequences from the simulated calorimeter steps
///
/// Each step is attributed to the primary particle given by its parent
/// track id, or its own track id if the parent is unknown. Steps are
/// ignored if they come from the primary vertex, are in a block
/// without calibrated hit, or in a block that already belongs to a
/// gamma. The order of blocks is the order of the steps.
///
/// If a step belongs to a particle beyond the primary gammas, the
/// event is skipped. A step without any track id is an error.
pub fn simulated_gammas<B: Block>(event: &Event<B>) -> Result<GammaDict<B>, AnalysisError> {
    let Some(sd) = event.simulated_data.as_ref() else {
        return Err(AnalysisError::skip(event.id, Skip::MissingSimulatedData));
    };
    let ngammas = sd.ngammas();
    let hits = calibrated_hits(event)?;
    let steps = match sd.calo_step_hits.as_ref() {
        Some(steps) if !steps.is_empty() => steps,
        _ => {
            return Err(AnalysisError::skip(event.id, Skip::NoSimulatedStepHits))
        }
    };

    let calibrated: HashSet<B> = hits.iter().map(|h| h.block).collect();
    let mut attributed = HashSet::with_capacity(calibrated.len());
    let mut gammas = GammaDict::new();
    for step in steps {
        let Some(track_id) = step.primary_index() else {
            return Err(AnalysisError::MissingPrimaryTrackId {
                event: event.id,
                block: format!("{:?}", step.block),
            });
        };
        if track_id == PRIMARY_VERTEX
            || !calibrated.contains(&step.block)
            || attributed.contains(&step.block)
        {
            continue;
        }
        if track_id as i64 > ngammas as i64 {
            warn!(
                "Event {}: secondary particle from track {track_id} triggers {:?}",
                event.id, step.block
            );
            let reason = Skip::SecondaryParticle { track_id, ngammas };
            return Err(AnalysisError::skip(event.id, reason));
        }
        trace!("Block {:?} belongs to gamma #{track_id}", step.block);
        attributed.insert(step.block);
        gammas.push(track_id, step.block);
    }
    Ok(gammas)
}

/// Gamma sequences from the reconstructed neutral tracks
///
/// The blocks are keyed by track id and kept in reconstruction order.
/// Events without any neutral track are skipped.
pub fn reconstructed_gammas<B: Block>(event: &Event<B>) -> Result<GammaDict<B>, AnalysisError> {
    if event.particle_track_data.is_none() {
        return Err(AnalysisError::skip(event.id, Skip::MissingTrackData));
    }
    let mut ntracks = 0;
    let mut gammas = GammaDict::new();
    for track in event.neutral_tracks() {
        ntracks += 1;
        for hit in &track.calorimeter_hits {
            gammas.push(track.track_id, hit.block);
        }
    }
    if ntracks == 0 {
        return Err(AnalysisError::skip(event.id, Skip::NoNeutralTracks));
    }
    trace!("Event {}: {ntracks} neutral tracks", event.id);
    Ok(gammas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{
        CalibratedData, Charge, ParticleKind, ParticleTrack, PrimaryParticle,
        SimulatedData, StepHit,
    };

    fn step(block: u32, track_id: Option<i32>, parent: Option<i32>) -> StepHit<u32> {
        StepHit {
            block,
            time: 0.,
            track_id,
            parent_track_id: parent,
        }
    }

    fn event(ngammas: usize, calibrated: &[u32], steps: Vec<StepHit<u32>>) -> Event<u32> {
        let mut ev = Event::new(3);
        ev.calibrated_data = Some(CalibratedData {
            calorimeter_hits: calibrated
                .iter()
                .map(|&b| CalorimeterHit::new(b, 1., 1.))
                .collect(),
        });
        ev.simulated_data = Some(SimulatedData {
            primary_particles: vec![
                PrimaryParticle {
                    kind: ParticleKind::Gamma,
                    energy: 1.
                };
                ngammas
            ],
            calo_step_hits: Some(steps),
        });
        ev
    }

    fn skip_reason(res: Result<GammaDict<u32>, AnalysisError>) -> Skip {
        match res {
            Err(AnalysisError::Skipped { reason, .. }) => reason,
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn truth_follows_step_order() {
        let ev = event(
            2,
            &[5, 7, 9, 11],
            vec![
                step(7, Some(1), None),
                step(5, Some(1), None),
                step(9, None, Some(2)),
                step(11, Some(0), None),
                step(13, Some(2), None),
                step(5, Some(2), None),
            ],
        );
        let truth = simulated_gammas(&ev).unwrap();
        assert_eq!(truth.len(), 2);
        assert_eq!(truth.get(1).unwrap().blocks(), &[7, 5]);
        // 5 already belongs to gamma 1, 13 has no calibrated hit
        assert_eq!(truth.get(2).unwrap().blocks(), &[9]);
    }

    #[test]
    fn secondaries_belong_to_their_parent() {
        let ev = event(
            1,
            &[5, 7, 9],
            vec![
                // the gamma itself, emitted at the primary vertex
                step(7, Some(1), Some(0)),
                // Compton electron of gamma 1
                step(5, Some(2), Some(1)),
                step(9, Some(3), Some(1)),
            ],
        );
        let truth = simulated_gammas(&ev).unwrap();
        assert_eq!(truth.len(), 1);
        assert_eq!(truth.get(1).unwrap().blocks(), &[5, 9]);
    }

    #[test]
    fn missing_track_id_is_fatal() {
        let ev = event(1, &[5], vec![step(5, None, None)]);
        let err = simulated_gammas(&ev).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, AnalysisError::MissingPrimaryTrackId { event: 3, .. }));
    }

    #[test]
    fn secondary_particles_skip_the_event() {
        let ev = event(1, &[5, 7], vec![step(5, Some(1), None), step(7, Some(2), None)]);
        assert_eq!(
            skip_reason(simulated_gammas(&ev)),
            Skip::SecondaryParticle {
                track_id: 2,
                ngammas: 1
            }
        );
        // only checked for blocks that would be attributed
        let ev = event(1, &[5], vec![step(5, Some(1), None), step(7, Some(2), None)]);
        assert!(simulated_gammas(&ev).is_ok());
    }

    #[test]
    fn missing_truth_data() {
        let mut ev = event(1, &[5], vec![]);
        assert_eq!(skip_reason(simulated_gammas(&ev)), Skip::NoSimulatedStepHits);
        ev.calibrated_data.as_mut().unwrap().calorimeter_hits.clear();
        assert_eq!(skip_reason(simulated_gammas(&ev)), Skip::NoCalibratedHits);
        ev.calibrated_data = None;
        assert_eq!(skip_reason(simulated_gammas(&ev)), Skip::MissingCalibratedData);
        ev.simulated_data = None;
        assert_eq!(skip_reason(simulated_gammas(&ev)), Skip::MissingSimulatedData);
    }

    #[test]
    fn reconstructed_neutral_tracks() {
        let track = |track_id, charge, blocks: &[u32]| ParticleTrack {
            track_id,
            charge,
            calorimeter_hits: blocks
                .iter()
                .map(|&b| CalorimeterHit::new(b, 1., 0.5))
                .collect(),
        };
        let mut ev = Event::new(0);
        assert_eq!(skip_reason(reconstructed_gammas(&ev)), Skip::MissingTrackData);

        ev.particle_track_data = Some(vec![track(3, Charge::Neutral, &[])]);
        assert!(matches!(
            neutral_track_hits(&ev),
            Err(AnalysisError::Skipped {
                reason: Skip::NoNeutralTrackHits,
                ..
            })
        ));

        ev.particle_track_data = Some(vec![track(1, Charge::Negative, &[2])]);
        assert_eq!(skip_reason(reconstructed_gammas(&ev)), Skip::NoNeutralTracks);

        ev.particle_track_data = Some(vec![
            track(4, Charge::Neutral, &[9, 3, 5]),
            track(1, Charge::Negative, &[2]),
            track(2, Charge::Neutral, &[6]),
        ]);
        let reco = reconstructed_gammas(&ev).unwrap();
        assert_eq!(reco.len(), 2);
        assert_eq!(reco.get(4).unwrap().blocks(), &[9, 3, 5]);
        assert_eq!(reco.get(2).unwrap().blocks(), &[6]);

        let hits = neutral_track_hits(&ev).unwrap();
        let blocks: Vec<_> = hits.iter().map(|h| h.block).collect();
        assert_eq!(blocks, vec![9, 3, 5, 6]);
    }
}
