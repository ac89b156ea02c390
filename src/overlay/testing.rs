use std::time::Duration;

use tokio::time::Instant;

const EVENTUALLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Let spawned tasks run until `condition` holds.
///
/// # Panics
///
/// Panics when the condition is still false after two seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + EVENTUALLY_TIMEOUT;
    while !condition() {
        assert!(Instant::now() < deadline, "condition was not reached");
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}
