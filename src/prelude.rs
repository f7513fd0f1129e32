pub use crate::{
    analysis::{
        GammaTrackingEfficiency, GammaTrackingEfficiencyBuilder, ProcessStatus, RunSummary,
    },
    config::{ClusterSource, Config},
    error::{AnalysisError, Skip},
    event::Event,
    geom_id::GeomId,
    locator::{AdjacencyLocator, GridLocator, NeighbourGraph},
    reader::{CombinedReader, EventReader},
    traits::{Block, Locate, Progress},
};
