//! Object identifiers.
//!
//! Ids are interned strings of the form `<kind>_<n>` (`rectangle_3`,
//! `dataField_12`). Authors may also hand-write ids in template JSON
//! (`company_logo`), so the suffix is a convention, not a requirement.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static IDS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Next suffix handed out by [`ObjectId::fresh`].
static NEXT: AtomicU64 = AtomicU64::new(1);

/// Identifier of a canvas object; unique within a scene.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(Spur);

impl ObjectId {
    pub fn intern(s: &str) -> Self {
        ObjectId(IDS.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        IDS.resolve(&self.0)
    }

    /// A new id for an object of kind `prefix`.
    ///
    /// Process-wide unique among generated ids. Ids loaded from JSON bump the
    /// counter past their own suffix, so a fresh id never repeats one that was
    /// read in; `SceneGraph::add` still re-keys if a clash slips through.
    pub fn fresh(prefix: &str) -> Self {
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }

    /// Numeric suffix, for ids following the `<kind>_<n>` convention.
    pub fn sequence(&self) -> Option<u64> {
        let (_, n) = self.as_str().rsplit_once('_')?;
        n.parse().ok()
    }

    /// Kind part of a generated id (`rectangle` for `rectangle_3`), or the
    /// whole id when it has no numeric suffix.
    pub fn prefix(&self) -> &str {
        let s = self.as_str();
        match s.rsplit_once('_') {
            Some((head, n)) if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => head,
            _ => s,
        }
    }

    fn observe(self) -> Self {
        if let Some(n) = self.sequence() {
            NEXT.fetch_max(n.saturating_add(1), Ordering::Relaxed);
        }
        self
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ObjectId::intern(&s).observe())
    }
}
