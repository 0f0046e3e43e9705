//! Mathematical constants

/// 0.5 ln(2π)
pub const HALF_LN_2PI: f64 = 0.918_938_533_204_672_7;
/// 0.5 (1 + ln(2π)), the entropy of a standard normal
pub const HALF_LN_2PI_E: f64 = 1.418_938_533_204_672_7;
/// ln(π)
pub const LN_PI: f64 = 1.144_729_885_849_400_2;
/// ln(2)
pub const LN_2: f64 = std::f64::consts::LN_2;
/// 0.5 ln(π / 2), the log normalizer shift of the half-normal
pub const HALF_LN_PI_OVER_2: f64 = 0.225_791_352_644_727_4;

/// Energy error above which a Hamiltonian trajectory is flagged as divergent
pub const DIVERGENCE_THRESHOLD: f64 = 1000.0;

/// Number of attempts at jittering a chain's starting point before giving up
pub const MAX_INIT_TRIES: usize = 50;
