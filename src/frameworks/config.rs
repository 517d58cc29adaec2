use std::{env, time::Duration};

// Runtime/server constants (not gameplay rules).

pub fn http_port() -> u16 {
    env::var("BROADSIDE_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3004)
}

pub fn turn_duration() -> Duration {
    let millis = env::var("TURN_DURATION_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(12500);
    Duration::from_millis(millis)
}

pub fn snapshot_interval() -> Duration {
    let millis = env::var("SNAPSHOT_INTERVAL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1000);
    Duration::from_millis(millis)
}

pub const SNAPSHOT_BROADCAST_CAPACITY: usize = 128;
