//! Snowflake-style token id generation.

use std::sync::Mutex;

use ak_shared::config::auth::MAX_WORKER_ID;
use ak_shared::ConfigError;
use chrono::Utc;

/// Producer of globally-unique, roughly-monotonic 64-bit ids
///
/// Supplied to the auth service at construction time; ids become the
/// `jti` of issued tokens.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> i64;
}

const WORKER_ID_BITS: u8 = 10;
const SEQUENCE_BITS: u8 = 12;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;
const TIMESTAMP_SHIFT: u8 = WORKER_ID_BITS + SEQUENCE_BITS;

/// Custom epoch: 2020-01-01T00:00:00Z in milliseconds
const EPOCH_MS: i64 = 1_577_836_800_000;

struct WorkerState {
    last_timestamp: i64,
    sequence: i64,
}

/// Default id generator: 41-bit millisecond timestamp, 10-bit worker id,
/// 12-bit per-millisecond sequence
pub struct SnowflakeIdWorker {
    worker_id: i64,
    state: Mutex<WorkerState>,
}

impl SnowflakeIdWorker {
    /// Create a worker with the given id (0..=1023)
    pub fn new(worker_id: i64) -> Result<Self, ConfigError> {
        if !(0..=MAX_WORKER_ID).contains(&worker_id) {
            return Err(ConfigError::OutOfRange {
                field: "worker_id".to_string(),
                reason: format!("must be in 0..={}", MAX_WORKER_ID),
            });
        }
        Ok(Self {
            worker_id,
            state: Mutex::new(WorkerState {
                last_timestamp: 0,
                sequence: 0,
            }),
        })
    }
}

impl IdGenerator for SnowflakeIdWorker {
    fn next_id(&self) -> i64 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let mut now = Utc::now().timestamp_millis() - EPOCH_MS;
        // A clock that runs backwards must not produce duplicate or
        // out-of-order ids; stay on the last observed timestamp instead.
        if now < state.last_timestamp {
            now = state.last_timestamp;
        }

        if now == state.last_timestamp {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // Sequence exhausted within this millisecond
                now = state.last_timestamp + 1;
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = now;

        (now << TIMESTAMP_SHIFT) | (self.worker_id << SEQUENCE_BITS) | state.sequence
    }
}
