use std::collections::{HashMap, HashSet};

use log::trace;
use noisy_float::prelude::*;

use crate::{
    event::CalorimeterHit,
    gamma::GammaDict,
    traits::{Block, Locate},
};

/// Default maximum time difference in ns between consecutive hits of a cluster
pub const TIME_GAP: f64 = 2.5;

/// Group hits into clusters of geometrically connected blocks
///
/// Two hits end up in the same cluster iff there is a chain of
/// neighbouring blocks connecting them such that each block in the
/// chain has a hit. Neighbours are only looked up for blocks owned
/// by the `locator`. Each block appears in exactly one cluster, the
/// first block of each cluster is the earliest one in `hits`.
pub fn build_clusters<B, L>(hits: &[CalorimeterHit<B>], locator: &L) -> Vec<Vec<B>>
where
    B: Block,
    L: Locate<B>,
{
    let hit_blocks: HashSet<B> = hits.iter().map(|h| h.block).collect();
    let mut visited = HashSet::with_capacity(hit_blocks.len());
    let mut clusters = Vec::new();
    for hit in hits {
        if !visited.insert(hit.block) {
            continue;
        }
        let mut cluster = vec![hit.block];
        let mut todo = vec![hit.block];
        while let Some(block) = todo.pop() {
            if !locator.owns_block(&block) {
                continue;
            }
            for neighbour in locator.neighbours(&block) {
                if hit_blocks.contains(&neighbour) && visited.insert(neighbour) {
                    cluster.push(neighbour);
                    todo.push(neighbour);
                }
            }
        }
        trace!("Geometric cluster: {cluster:?}");
        clusters.push(cluster);
    }
    clusters
}

/// Split a cluster whenever consecutive hits are more than `max_gap` apart in time
///
/// The returned sub-clusters are in time order, and so are the blocks
/// inside each of them. Hits with the same time are ordered by block.
/// Blocks without an entry in `times` are taken to have time zero.
///
/// A time of exactly zero is treated as "no previous hit", so no
/// split happens directly before or after a hit at time zero.
pub fn split_by_time<B: Block>(
    cluster: &[B],
    times: &HashMap<B, f64>,
    max_gap: f64,
) -> Vec<Vec<B>> {
    let timed = time_ordered(cluster, times);
    split_time_ordered(&timed, max_gap)
}

fn time_ordered<B: Block>(cluster: &[B], times: &HashMap<B, f64>) -> Vec<(N64, B)> {
    let mut timed: Vec<_> = cluster
        .iter()
        .map(|b| (n64(times.get(b).copied().unwrap_or_default()), *b))
        .collect();
    timed.sort_unstable();
    timed.dedup();
    timed
}

fn split_time_ordered<B: Block>(timed: &[(N64, B)], max_gap: f64) -> Vec<Vec<B>> {
    if timed.is_empty() {
        return Vec::new();
    }
    let mut res = Vec::new();
    let mut current = Vec::with_capacity(timed.len());
    let mut previous = 0.;
    for (t, block) in timed {
        let t = t.raw();
        if previous != 0. && t != 0. && t - previous > max_gap {
            trace!("Splitting cluster at time gap {}", t - previous);
            res.push(std::mem::take(&mut current));
        }
        previous = t;
        current.push(*block);
    }
    res.push(current);
    res
}

/// Gamma candidates from geometric clustering and time splitting
///
/// Clusters are ordered by their time-ordered hits, and each cluster
/// and sub-cluster gets its own label, starting from 1.
pub fn cluster_gammas<B, L>(
    hits: &[CalorimeterHit<B>],
    locator: &L,
    max_gap: f64,
) -> GammaDict<B>
where
    B: Block,
    L: Locate<B>,
{
    let mut times = HashMap::with_capacity(hits.len());
    for hit in hits {
        times.entry(hit.block).or_insert(hit.time);
    }
    let mut clusters: Vec<_> = build_clusters(hits, locator)
        .iter()
        .map(|c| time_ordered(c, &times))
        .collect();
    clusters.sort_unstable();

    let mut gammas = GammaDict::new();
    let mut label = 0;
    for cluster in clusters {
        for sub_cluster in split_time_ordered(&cluster, max_gap) {
            label += 1;
            for block in sub_cluster {
                gammas.push(label, block);
            }
        }
    }
    gammas
}
