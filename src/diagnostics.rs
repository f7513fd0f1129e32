use serde::{Deserialize, Serialize};

/// Equidistant binning of a histogram
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct Binning {
    pub min: f64,
    pub max: f64,
    pub nbins: usize,
}

impl Binning {
    pub fn new(min: f64, max: f64, nbins: usize) -> Self {
        Self { min, max, nbins }
    }

    fn bin(&self, x: f64) -> Bin {
        if x < self.min {
            Bin::Underflow
        } else if x >= self.max || self.nbins == 0 {
            Bin::Overflow
        } else {
            let width = (self.max - self.min) / self.nbins as f64;
            let idx = ((x - self.min) / width) as usize;
            // guard against rounding at the upper edge
            Bin::Regular(idx.min(self.nbins - 1))
        }
    }
}

enum Bin {
    Underflow,
    Regular(usize),
    Overflow,
}

/// One-dimensional histogram with under- and overflow
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Histogram {
    binning: Binning,
    counts: Vec<u64>,
    underflow: u64,
    overflow: u64,
}

impl Histogram {
    pub fn new(binning: Binning) -> Self {
        Self {
            binning,
            counts: vec![0; binning.nbins],
            underflow: 0,
            overflow: 0,
        }
    }

    pub fn fill(&mut self, x: f64) {
        match self.binning.bin(x) {
            Bin::Underflow => self.underflow += 1,
            Bin::Overflow => self.overflow += 1,
            Bin::Regular(idx) => self.counts[idx] += 1,
        }
    }

    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Total number of fills
    pub fn entries(&self) -> u64 {
        self.underflow + self.overflow + self.counts.iter().sum::<u64>()
    }
}

/// Binning of the diagnostic histograms
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct HistogramConfig {
    /// Binning for numbers of calorimeter blocks and clusters
    #[serde(default = "default_calos")]
    pub calos: Binning,
    /// Binning for energies in MeV
    #[serde(default = "default_energy")]
    pub energy: Binning,
}

fn default_calos() -> Binning {
    Binning::new(0., 20., 20)
}

fn default_energy() -> Binning {
    Binning::new(0., 4., 100)
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            calos: default_calos(),
            energy: default_energy(),
        }
    }
}

/// Event quantities entering the diagnostic histograms
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct EventDiagnostics {
    /// Number of calorimeter hits entering the clustering
    pub clustered_calos: usize,
    /// Number of blocks in each gamma cluster
    pub cluster_sizes: Vec<usize>,
    /// Number of calibrated calorimeter hits
    pub calibrated_calos: usize,
    /// Energy of each reconstructed gamma in MeV
    pub gamma_energies: Vec<f64>,
}

/// Distributions accumulated over all scored events
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Diagnostics {
    pub number_of_gamma_calos: Histogram,
    pub number_of_gamma_clusters: Histogram,
    pub clusters_size: Histogram,
    pub number_of_calibrated_calos: Histogram,
    pub number_of_gammas: Histogram,
    pub total_gamma_energy: Histogram,
    /// Lowest gamma energy in events with three reconstructed gammas
    pub gamma_energy_min: Histogram,
    /// Middle gamma energy in events with three reconstructed gammas
    pub gamma_energy_mid: Histogram,
    /// Highest gamma energy in events with three reconstructed gammas
    pub gamma_energy_max: Histogram,
}

impl Diagnostics {
    pub fn new(config: &HistogramConfig) -> Self {
        let calos = || Histogram::new(config.calos);
        let energy = || Histogram::new(config.energy);
        Self {
            number_of_gamma_calos: calos(),
            number_of_gamma_clusters: calos(),
            clusters_size: calos(),
            number_of_calibrated_calos: calos(),
            number_of_gammas: calos(),
            total_gamma_energy: energy(),
            gamma_energy_min: energy(),
            gamma_energy_mid: energy(),
            gamma_energy_max: energy(),
        }
    }

    pub fn record(&mut self, ev: &EventDiagnostics) {
        self.number_of_gamma_calos.fill(ev.clustered_calos as f64);
        self.number_of_gamma_clusters
            .fill(ev.cluster_sizes.len() as f64);
        for &size in &ev.cluster_sizes {
            self.clusters_size.fill(size as f64);
        }
        self.number_of_calibrated_calos
            .fill(ev.calibrated_calos as f64);
        self.number_of_gammas.fill(ev.gamma_energies.len() as f64);
        self.total_gamma_energy
            .fill(ev.gamma_energies.iter().sum());
        if let &[e1, e2, e3] = ev.gamma_energies.as_slice() {
            let mut energies = [e1, e2, e3];
            energies.sort_by(f64::total_cmp);
            self.gamma_energy_min.fill(energies[0]);
            self.gamma_energy_mid.fill(energies[1]);
            self.gamma_energy_max.fill(energies[2]);
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(&HistogramConfig::default())
    }
}
