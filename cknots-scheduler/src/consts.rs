pub const SPLITTER_BIN: &str = "splitter";
pub const LINEAR_MINOR_FINDER_BIN: &str = "find-k6-linear";
pub const FULL_MINOR_FINDER_BIN: &str = "find-knots";
pub const PATH_DECOMPOSITION_BIN: &str = "path-decomposition";

pub const DEFAULT_BIN_DIR: &str = "cknots/cpp/bin";

/// Six hours.
pub const DEFAULT_CCD_TIMEOUT: u64 = 6 * 60 * 60;
pub const DEFAULT_MAX_MEMORY_GB: u64 = 600;

/// Return codes recorded for dispatches that never produced an exit status.
pub const TIMEOUT_RETURN_CODE: i32 = 124;
pub const CRASH_RETURN_CODE: i32 = 1;

/// Extension of the path decomposition computed before a full minor search.
pub const PATH_DECOMPOSITION_EXT: &str = "pd";

/// Infix marking raw minor output of the full algorithm (`x.0001.mp.full.raw_minors`).
pub const FULL_OUTPUT_TAG: &str = "full";
