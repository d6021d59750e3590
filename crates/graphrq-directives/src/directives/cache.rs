use std::{collections::HashMap, fmt, hash::Hash, sync::Arc};

use crate::{scalar::ScalarType, Error};

/// What to do when a wrapped scalar is requested twice for the same base type
/// and parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Hand out the instance built the first time.
    #[default]
    Reuse,
    /// Fail with [`Error::DuplicateWrappedType`].
    Reject,
}

/// Wrapped scalars keyed by base scalar name and directive parameter.
///
/// At most one instance exists per key. Owned by a directive and cleared at
/// the start of each transform, so separate schema builds never share entries.
#[derive(Debug)]
pub struct WrappedScalarCache<P> {
    policy: CachePolicy,
    entries: HashMap<(String, P), Arc<ScalarType>>,
}

impl<P> WrappedScalarCache<P>
where
    P: Clone + Eq + Hash + fmt::Display,
{
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, base: &str, parameter: &P) -> Option<&Arc<ScalarType>> {
        self.entries.get(&(base.to_string(), parameter.clone()))
    }

    /// Returns the cached wrapper for `(base, parameter)`, building it with
    /// `build` on the first request.
    pub fn get_or_insert_with<F>(&mut self, base: &ScalarType, parameter: P, build: F) -> Result<Arc<ScalarType>, Error>
    where
        F: FnOnce() -> ScalarType,
    {
        let key = (base.name().to_string(), parameter);

        if let Some(existing) = self.entries.get(&key) {
            return match self.policy {
                CachePolicy::Reuse => Ok(existing.clone()),
                CachePolicy::Reject => Err(Error::DuplicateWrappedType {
                    name: existing.name().to_string(),
                    base: key.0,
                    parameter: key.1.to_string(),
                }),
            };
        }

        let scalar = Arc::new(build());
        self.entries.insert(key, scalar.clone());

        Ok(scalar)
    }
}
