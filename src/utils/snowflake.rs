use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

const EPOCH: u64 = 1_725_513_600_000u64;
const COUNTER_BITS: u64 = 12;
const WORKER_BITS: u64 = 5;
const SERVER_BITS: u64 = 5;

pub const MAX_SERVER_ID: u8 = (1 << SERVER_BITS) - 1;
pub const MAX_WORKER_ID: u8 = (1 << WORKER_BITS) - 1;

#[derive(Debug)]
struct GeneratorState {
    last_ts: u64,
    counter: u64,
}

/// Components of a snowflake id
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnowflakeParts {
    /// Unix time in seconds
    pub created_at: f64,
    pub server_id: u8,
    pub worker_id: u8,
    pub counter: u16,
}

/// Monotonic 64-bit id source: 42 bits of milliseconds since `EPOCH`,
/// then worker id, server id and a per-millisecond counter.
#[derive(Debug)]
pub struct SnowflakeGenerator {
    state: Mutex<GeneratorState>,
    server_id: u64,
    worker_id: u64,
}

impl SnowflakeGenerator {
    /// Ids are masked to their bit width, callers validate ranges upfront
    pub fn new(server_id: u8, worker_id: u8) -> Self {
        Self {
            state: Mutex::new(GeneratorState {
                last_ts: 0,
                counter: 0,
            }),
            server_id: u64::from(server_id & MAX_SERVER_ID),
            worker_id: u64::from(worker_id & MAX_WORKER_ID),
        }
    }

    fn current_time_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(EPOCH)
    }

    fn lock(&self) -> MutexGuard<'_, GeneratorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Never blocks: when the wall clock stalls, goes backwards or the
    /// counter runs out, the timestamp moves ahead of it instead.
    pub fn generate(&self) -> u64 {
        let now = Self::current_time_ms().saturating_sub(EPOCH);
        let (ts, counter) = self.advance(now);

        (ts << (COUNTER_BITS + SERVER_BITS + WORKER_BITS))
            | (self.worker_id << (COUNTER_BITS + SERVER_BITS))
            | (self.server_id << COUNTER_BITS)
            | counter
    }

    fn advance(&self, now: u64) -> (u64, u64) {
        let seq_mask = (1u64 << COUNTER_BITS) - 1;
        let mut st = self.lock();

        if now > st.last_ts {
            st.last_ts = now;
            st.counter = 0;
        } else if st.counter < seq_mask {
            st.counter += 1;
        } else {
            st.last_ts += 1;
            st.counter = 0;
        }
        (st.last_ts, st.counter)
    }

    pub fn parse(id: u64) -> SnowflakeParts {
        let ts = (id >> (COUNTER_BITS + SERVER_BITS + WORKER_BITS)) + EPOCH;
        let worker_id = ((id >> (COUNTER_BITS + SERVER_BITS)) & u64::from(MAX_WORKER_ID)) as u8;
        let server_id = ((id >> COUNTER_BITS) & u64::from(MAX_SERVER_ID)) as u8;
        let counter = (id & ((1 << COUNTER_BITS) - 1)) as u16;
        SnowflakeParts {
            created_at: ts as f64 / 1000.0,
            server_id,
            worker_id,
            counter,
        }
    }
}
