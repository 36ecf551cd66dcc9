/// Number of playable lanes.
pub const NUM_LANES: usize = 3;

/// Raw chart lane index (0-2) to engine lane (1-3). The chart counts lanes
/// top-down while the engine counts them bottom-up.
pub const LANE_REMAP: [u8; NUM_LANES] = [3, 2, 1];

/// Seconds per minute, used by every beat-to-seconds conversion.
pub const SECONDS_PER_MINUTE: f64 = 60.0;
