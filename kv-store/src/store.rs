use std::collections::HashMap;
use std::sync::Mutex;

/// Outcome of a `Put`. The store itself never produces `ErrMaybe` -- that
/// status is synthesized above the store, at the RPC transport boundary,
/// when a reply cannot be confirmed delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Ok { version: u64 },
    NoKey,
    VersionMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetOutcome {
    Ok { value: String, version: u64 },
    NoKey,
}

/// An in-memory, versioned key/value map. `Get` and `Put` share one lock so
/// `Put`'s read-compare-swap is atomic against concurrent callers.
#[derive(Default)]
pub struct Store {
    entries: Mutex<HashMap<String, (String, u64)>>,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    pub fn get(&self, key: &str) -> GetOutcome {
        let entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, version)) => GetOutcome::Ok {
                value: value.clone(),
                version: *version,
            },
            None => GetOutcome::NoKey,
        }
    }

    /// Applies iff the current version equals `expected_version`, or the
    /// key is absent and `expected_version == 0`.
    pub fn put(&self, key: &str, value: String, expected_version: u64) -> PutOutcome {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((_, version)) => {
                if *version == expected_version {
                    let new_version = version + 1;
                    entries.insert(key.to_string(), (value, new_version));
                    PutOutcome::Ok { version: new_version }
                } else {
                    PutOutcome::VersionMismatch
                }
            }
            None => {
                if expected_version == 0 {
                    entries.insert(key.to_string(), (value, 1));
                    PutOutcome::Ok { version: 1 }
                } else {
                    PutOutcome::NoKey
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn get_on_absent_key_is_no_key() {
        let s = Store::new();
        assert_eq!(s.get("k"), GetOutcome::NoKey);
    }

    #[test]
    fn put_installs_absent_key_at_version_one() {
        let s = Store::new();
        assert_eq!(s.put("k", "v".into(), 0), PutOutcome::Ok { version: 1 });
        assert_eq!(
            s.get("k"),
            GetOutcome::Ok {
                value: "v".into(),
                version: 1
            }
        );
    }

    #[test]
    fn put_with_nonzero_version_on_absent_key_is_no_key() {
        let s = Store::new();
        assert_eq!(s.put("k", "v".into(), 1), PutOutcome::NoKey);
    }

    #[test]
    fn put_with_zero_version_on_existing_key_is_version_mismatch() {
        let s = Store::new();
        s.put("k", "v".into(), 0);
        assert_eq!(s.put("k", "v2".into(), 0), PutOutcome::VersionMismatch);
    }

    #[test]
    fn put_bumps_version_on_each_success() {
        let s = Store::new();
        s.put("k", "v1".into(), 0);
        assert_eq!(s.put("k", "v2".into(), 1), PutOutcome::Ok { version: 2 });
        assert_eq!(s.put("k", "v3".into(), 2), PutOutcome::Ok { version: 3 });
    }

    #[test]
    fn stale_version_is_rejected_and_does_not_mutate() {
        let s = Store::new();
        s.put("k", "v1".into(), 0);
        assert_eq!(s.put("k", "stale".into(), 0), PutOutcome::VersionMismatch);
        assert_eq!(
            s.get("k"),
            GetOutcome::Ok {
                value: "v1".into(),
                version: 1
            }
        );
    }
}
