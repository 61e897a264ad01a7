//! # Topic labels.
//!
//! A [`Topic`] is the key the dispatcher uses to find listener providers.
//! Any string converts into a topic; the label is normalized so that it always
//! matches `^[-_A-Za-z0-9]+$`:
//!
//! ```text
//! "user.created"   ──► "user-created"
//! "orders/ paid!"  ──► "orders-paid-"
//! "already-fine_1" ──► "already-fine_1"   (kept verbatim)
//! ""  / "!!!"      ──► "-empty-"          (sentinel)
//! ```
//!
//! ## Example
//! ```rust
//! use topicvisor::Topic;
//!
//! assert_eq!(Topic::new("user.created").as_str(), "user-created");
//! assert_eq!(Topic::new(""), Topic::EMPTY);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

static VALID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-_A-Za-z0-9]+$").unwrap());
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^_A-Za-z0-9]+").unwrap());

const EMPTY_LABEL: &str = "-empty-";

/// Normalized topic label.
///
/// Cheap to clone (`Arc<str>`), compared by value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(Arc<str>);

impl Topic {
    /// Sentinel used when a label normalizes to nothing.
    pub const EMPTY: &'static str = EMPTY_LABEL;

    /// Normalizes `label` into a topic.
    ///
    /// Labels that already match `^[-_A-Za-z0-9]+$` are used verbatim. Otherwise every
    /// run of characters outside `[_A-Za-z0-9]` collapses into one `-`. If nothing but
    /// dashes is left (or nothing at all), the [`Topic::EMPTY`] sentinel is used.
    pub fn new(label: impl AsRef<str>) -> Self {
        let raw = label.as_ref();
        if VALID.is_match(raw) {
            return Self(Arc::from(raw));
        }

        let rewritten = DISALLOWED.replace_all(raw, "-");
        if rewritten.bytes().all(|b| b == b'-') {
            return Self(Arc::from(EMPTY_LABEL));
        }
        Self(Arc::from(rewritten.as_ref()))
    }

    /// Returns the normalized label.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this is the [`Topic::EMPTY`] sentinel.
    #[inline]
    pub fn is_empty_sentinel(&self) -> bool {
        &*self.0 == EMPTY_LABEL
    }
}

impl PartialEq<str> for Topic {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Topic {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl From<&str> for Topic {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Topic {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

impl From<&String> for Topic {
    fn from(label: &String) -> Self {
        Self::new(label)
    }
}

impl From<&Topic> for Topic {
    fn from(topic: &Topic) -> Self {
        topic.clone()
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Topic {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Topic").field(&&*self.0).finish()
    }
}
