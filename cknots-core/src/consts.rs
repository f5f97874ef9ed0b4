/// Extension of the per-domain interaction graph files written by the splitter.
pub const DOMAIN_FILE_EXT: &str = "mp";

/// Extension appended to a domain file name for raw minor-finder output.
pub const RAW_MINORS_EXT: &str = "raw_minors";

/// Ledger file of the linear minor-finding algorithm.
pub const LEDGER_FILE: &str = "results.json";

/// Ledger file of the full (nonlinear) minor-finding algorithm.
pub const FULL_LEDGER_FILE: &str = "results_full.json";

/// Prefix of the per-chromosome output directories (`chr_01`, ..., `chr_X`).
pub const CHROMOSOME_DIR_PREFIX: &str = "chr_";

/// Token opening every minor block in raw minor-finder output.
pub const MINOR_SENTINEL: &str = "MINOR";

/// Number of endpoints on the backbone path of a link.
pub const LINK_BACKBONE_LEN: usize = 6;

/// Domains spanning more than this many bases are left out of chromosome views.
pub const MAX_DOMAIN_SPAN: u64 = 10_000_000;

/// Number of digits encoding the domain sequence number in a domain file name.
pub const SEQUENCE_NUMBER_DIGITS: usize = 4;
