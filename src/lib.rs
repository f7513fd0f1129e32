//! `gteff` measures how well gamma rays are reconstructed in a
//! segmented calorimeter.
//!
//! For each simulated event, the calorimeter blocks hit by each
//! primary gamma form a true sequence. These are compared to two kinds
//! of candidates: the neutral tracks found by the reconstruction and
//! gamma clusters built directly from the calorimeter hits by
//! geometric flood fill and splitting at time gaps. A candidate is
//! correct if it hits exactly the same blocks in exactly the same order
//! as a true gamma.
//!
//! # How to use
//!
//! ```
//! use gteff::prelude::*;
//!
//! let config = Config::default();
//! let locator = NeighbourGraph::from(&config.geometry);
//! let mut analysis = GammaTrackingEfficiency::with_config(locator, &config);
//! let events: Vec<Event> = Vec::new();
//! analysis.process_all(&events).unwrap();
//! println!("{}", analysis.finalize().efficiency);
//! ```
//!
//! ## Most relevant modules
//!
//! - [prelude] exports a list of the most relevant classes and objects
//! - [analysis] contains the main class and lists the steps that are performed
//! - [reader] defines readers from one or more event files
//! - [event] for the event format
//! - [locator] for the calorimeter geometry
//! - [cluster] for the calorimeter clustering
//!

/// Efficiency analysis driver
pub mod analysis;
/// Calorimeter clustering
pub mod cluster;
/// Comparison of gamma sequences
pub mod compare;
/// Run configuration
pub mod config;
/// Diagnostic histograms
pub mod diagnostics;
/// Efficiency counters and reports
pub mod efficiency;
pub mod error;
/// Detector event class
pub mod event;
/// Gamma sequences from the event data
pub mod extract;
pub mod gamma;
/// Geometry identifiers of calorimeter blocks
pub mod geom_id;
/// Neighbourhood of calorimeter blocks
pub mod locator;
/// Most important exports
pub mod prelude;
/// Progress bar
pub mod progress_bar;
/// Event readers
pub mod reader;
/// Common traits
pub mod traits;

use lazy_static::lazy_static;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
lazy_static! {
    pub static ref VERSION_MAJOR: u32 =
        env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap();
    pub static ref VERSION_MINOR: u32 =
        env!("CARGO_PKG_VERSION_MINOR").parse().unwrap();
    pub static ref VERSION_PATCH: u32 =
        env!("CARGO_PKG_VERSION_PATCH").parse().unwrap();
}
pub const GIT_REV: Option<&str> = option_env!("VERGEN_GIT_SHA");
pub const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");
