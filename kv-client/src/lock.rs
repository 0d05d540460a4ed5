use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::clerk::{Clerk, GetStatus, PutStatus};

const ACQUIRE_POLL: Duration = Duration::from_millis(10);
const RELEASE_POLL: Duration = Duration::from_millis(100);

fn random_holder_id() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// A client-side mutual-exclusion lock built on the KV store's
/// compare-and-swap Put. Robust to a Put whose reply is lost in flight:
/// `acquire`/`release` never act on a Put's assumed outcome -- after an
/// `ErrMaybe`, the loop always re-`Get`s and lets the store's current
/// state (not the ambiguous reply) decide the next step.
pub struct Lock {
    clerk: Arc<Clerk>,
    key: String,
    holder_id: String,
}

impl Lock {
    pub fn new(clerk: Arc<Clerk>, key: impl Into<String>) -> Self {
        Lock {
            clerk,
            key: key.into(),
            holder_id: random_holder_id(),
        }
    }

    pub fn holder_id(&self) -> &str {
        &self.holder_id
    }

    pub async fn acquire(&mut self) {
        loop {
            let (holder, version) = match self.clerk.get(&self.key).await {
                Ok(GetStatus::Ok { value, version }) => (value, version),
                Ok(GetStatus::ErrNoKey) => {
                    let _ = self.clerk.put(&self.key, String::new(), 0).await;
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "acquire: get failed, retrying");
                    tokio::time::sleep(ACQUIRE_POLL).await;
                    continue;
                }
            };

            if holder == self.holder_id {
                return;
            }

            if holder.is_empty() {
                // Either nobody has tried yet, or our own prior Put was
                // dropped before it applied -- either way the store says
                // unlocked right now, so it is safe to try to take it.
                match self.clerk.put(&self.key, self.holder_id.clone(), version).await {
                    PutStatus::Ok => return,
                    PutStatus::ErrMaybe => {
                        // Ambiguous: do not retry the Put. Loop back to Get
                        // instead -- if it actually applied, the next Get
                        // reports us as holder and we return above.
                        debug!("acquire put ambiguous, awaiting confirming get");
                    }
                    PutStatus::ErrVersion => {
                        // Someone else won the race; re-read.
                    }
                    PutStatus::ErrNoKey => {
                        // Key vanished somehow; loop will re-materialize it.
                    }
                }
                continue;
            }

            // Held by someone else.
            tokio::time::sleep(ACQUIRE_POLL).await;
        }
    }

    pub async fn release(&mut self) {
        loop {
            let (holder, version) = match self.clerk.get(&self.key).await {
                Ok(GetStatus::Ok { value, version }) => (value, version),
                Ok(GetStatus::ErrNoKey) => return,
                Err(e) => {
                    warn!(error = %e, "release: get failed, retrying");
                    tokio::time::sleep(RELEASE_POLL).await;
                    continue;
                }
            };

            if holder.is_empty() {
                return;
            }

            if holder == self.holder_id {
                match self.clerk.put(&self.key, String::new(), version).await {
                    PutStatus::Ok => return,
                    PutStatus::ErrMaybe => {
                        // Ambiguous: loop back to Get rather than retrying.
                        // If it actually applied, the next Get reports an
                        // empty holder and we return above.
                        debug!("release put ambiguous, awaiting confirming get");
                        continue;
                    }
                    PutStatus::ErrVersion => continue,
                    PutStatus::ErrNoKey => return,
                }
            }

            // Held by some other client: either a stale Release without a
            // matching Acquire, or our own earlier ambiguous Put was
            // actually applied and then taken over is impossible (CAS would
            // have prevented that). This deliberately never resolves on its
            // own -- see the caller-error note on Release.
            tokio::time::sleep(RELEASE_POLL).await;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn holder_ids_are_eight_chars() {
        let id = random_holder_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
