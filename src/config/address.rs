//! Shared, mutable set of probe targets.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::validation::ConfigError;

/// Set of addresses to ping.
///
/// Cloning yields another handle to the same set. The configuration layer
/// mutates it; the scheduler only ever reads it through [`AddressSet::snapshot`].
#[derive(Clone, Default)]
pub struct AddressSet {
    inner: Arc<RwLock<BTreeSet<String>>>,
}

impl AddressSet {
    /// Create an empty address set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a single address.
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptyTarget`] if `addr` is empty.
    pub fn insert(&self, addr: impl Into<String>) -> Result<bool, ConfigError> {
        let addr = addr.into();
        if addr.is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        Ok(self.write().insert(addr))
    }

    /// Insert every element of a comma separated list.
    ///
    /// The list is validated as a whole before anything is inserted, so a
    /// failed call leaves the set unchanged.
    pub fn extend_from_list(&self, list: &str) -> Result<(), ConfigError> {
        let addrs = parse_address_list(list)?;
        self.write().extend(addrs);
        Ok(())
    }

    /// Remove an address, returning whether it was present.
    pub fn remove(&self, addr: &str) -> bool {
        self.write().remove(addr)
    }

    /// Replace the whole membership.
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptyTarget`] if any address is empty; the set is
    /// left unchanged in that case.
    pub fn replace<I, S>(&self, addrs: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let next = addrs
            .into_iter()
            .map(Into::into)
            .map(|a: String| if a.is_empty() { Err(ConfigError::EmptyTarget) } else { Ok(a) })
            .collect::<Result<BTreeSet<_>, _>>()?;
        *self.write() = next;
        Ok(())
    }

    /// Copy of the current members.
    pub fn snapshot(&self) -> Vec<String> {
        self.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn contains(&self, addr: &str) -> bool {
        self.read().contains(addr)
    }

    // A panic while holding the lock cannot leave the set half-updated, so
    // poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, BTreeSet<String>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeSet<String>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = self.read();
        let mut first = true;
        for addr in members.iter() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(addr)?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.read().iter()).finish()
    }
}

/// Split a comma separated address list.
///
/// # Errors
/// Returns [`ConfigError::EmptyTarget`] if any element is empty.
pub fn parse_address_list(list: &str) -> Result<Vec<String>, ConfigError> {
    list.split(',')
        .map(|addr| {
            if addr.is_empty() {
                Err(ConfigError::EmptyTarget)
            } else {
                Ok(addr.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_empty_rejected() {
        let set = AddressSet::new();
        let err = set.insert("").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTarget));
        assert!(set.is_empty());
    }

    #[test]
    fn test_insert_deduplicates() {
        let set = AddressSet::new();
        assert!(set.insert("10.0.0.1").unwrap());
        assert!(!set.insert("10.0.0.1").unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_extend_from_list() {
        let set = AddressSet::new();
        set.extend_from_list("10.0.0.2,10.0.0.1").unwrap();
        set.extend_from_list("example.org").unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains("example.org"));
    }

    #[test]
    fn test_extend_from_list_with_empty_element_is_atomic() {
        let set = AddressSet::new();
        set.insert("10.0.0.9").unwrap();

        for bad in ["", "a,,b", "a,", ",a"] {
            let err = set.extend_from_list(bad).unwrap_err();
            assert_eq!(err.to_string(), "empty string target");
        }
        assert_eq!(set.snapshot(), vec!["10.0.0.9".to_string()]);
    }

    #[test]
    fn test_display_sorted() {
        let set = AddressSet::new();
        set.extend_from_list("b.example,a.example,10.0.0.1").unwrap();
        assert_eq!(set.to_string(), "10.0.0.1,a.example,b.example");
        assert_eq!(AddressSet::new().to_string(), "");
    }

    #[test]
    fn test_clones_share_membership() {
        let set = AddressSet::new();
        let handle = set.clone();
        handle.insert("10.0.0.1").unwrap();
        assert!(set.contains("10.0.0.1"));
        assert!(set.remove("10.0.0.1"));
        assert!(handle.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let set = AddressSet::new();
        set.insert("10.0.0.1").unwrap();
        let snap = set.snapshot();
        set.insert("10.0.0.2").unwrap();
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn test_replace() {
        let set = AddressSet::new();
        set.extend_from_list("a,b").unwrap();
        set.replace(["c"]).unwrap();
        assert_eq!(set.to_string(), "c");

        assert!(set.replace(["d", ""]).is_err());
        assert_eq!(set.to_string(), "c");
    }
}
