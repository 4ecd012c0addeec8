/// Single-flight refresh coordination
///
/// When several concurrent requests hit a 401, only one of them may call the
/// refresh endpoint; the rest must wait for its outcome and reuse the tokens
/// it stored. The gate is an async mutex owned by the `ApiClient` instance
/// (not module-level state), paired with the token store's generation
/// counter:
///
/// 1. A request observing a 401 records the store generation it saw.
/// 2. It acquires the gate. If the generation moved while it waited, another
///    request already refreshed — it reuses the stored tokens without a
///    network call.
/// 3. Otherwise it performs the refresh while holding the gate, stores the
///    rotated pair (bumping the generation), and releases.
///
/// A failed refresh clears the store before releasing, so every queued
/// waiter observes the bumped generation with no tokens and fails with
/// `SessionExpired` — never a duplicate refresh attempt.

use tokio::sync::Mutex;

/// Instance-owned refresh gate
#[derive(Debug, Default)]
pub struct RefreshGate {
    lock: Mutex<()>,
}

impl RefreshGate {
    /// Creates a new gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the gate, serializing refresh attempts
    pub async fn acquire(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_gate_serializes_critical_section() {
        let gate = Arc::new(RefreshGate::new());
        let concurrent = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let gate = gate.clone();
            let concurrent = concurrent.clone();
            let peak = peak.clone();

            handles.push(tokio::spawn(async move {
                let _guard = gate.acquire().await;
                let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                concurrent.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
