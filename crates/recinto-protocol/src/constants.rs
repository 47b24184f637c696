/// Endpoint polled for the global session state.
pub const STATE_ENDPOINT: &str = "/estados/estado_global";

/// Delay between the end of one poll tick and the start of the next.
pub const POLL_INTERVAL_MS: u64 = 300;

/// Upper bound for a single state fetch.
pub const FETCH_TIMEOUT_MS: u64 = 1500;

/// How long ballots stay on the seats after a vote leaves EN_CURSO.
pub const VOTE_RESULT_COOLDOWN_MS: u64 = 6000;

/// Seat images are served as `{SEAT_IMAGE_PREFIX}/{seat}.png`.
pub const SEAT_IMAGE_PREFIX: &str = "/bancas";

/// Top-level key of the seating description holding the row list.
pub const LAYOUT_ROWS_KEY: &str = "filas";
