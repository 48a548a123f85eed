//! Per-tag severity filtering.

use alloc::string::String;
use alloc::vec::Vec;

use crate::Severity;

/// A severity override for a single tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOverride {
    /// The tag this override applies to, compared case-sensitively.
    pub tag: String,
    /// The most verbose severity emitted for `tag`.
    pub level: Severity,
}

/// The global default level plus an append-only list of per-tag overrides.
///
/// Overrides are never replaced or removed: when the same tag is registered more than once, the
/// earliest registration is authoritative and later ones are inert. Lookups are a linear scan,
/// the override list is expected to stay short.
///
/// Not synchronized; registration and lookups must be serialized by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    global_level: Severity,
    overrides: Vec<TagOverride>,
}

impl TagFilter {
    /// Creates a filter with the given global default and no overrides.
    pub const fn new(global_level: Severity) -> Self {
        Self {
            global_level,
            overrides: Vec::new(),
        }
    }

    /// Returns the global default level.
    pub fn global_level(&self) -> Severity {
        self.global_level
    }

    /// Replaces the global default level.
    pub fn set_global_level(&mut self, level: Severity) {
        self.global_level = level;
    }

    /// Appends an override for `tag`.
    pub fn set_level(&mut self, tag: impl Into<String>, level: Severity) {
        self.overrides.push(TagOverride {
            tag: tag.into(),
            level,
        });
    }

    /// Returns the registered overrides in registration order.
    pub fn overrides(&self) -> &[TagOverride] {
        &self.overrides
    }

    /// Returns the level of the first override matching `tag`, or the global default.
    pub fn level_for(&self, tag: &str) -> Severity {
        self.overrides
            .iter()
            .find(|it| it.tag == tag)
            .map_or(self.global_level, |it| it.level)
    }

    /// Returns whether a message at `severity` for `tag` passes the filter.
    #[inline]
    pub fn enabled(&self, severity: Severity, tag: &str) -> bool {
        severity <= self.level_for(tag)
    }
}

impl Default for TagFilter {
    fn default() -> Self {
        Self::new(Severity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::TagFilter;
    use crate::Severity;
    use pretty_assertions::assert_eq;

    #[test]
    fn falls_back_to_global_level() {
        let filter = TagFilter::new(Severity::Info);
        assert_eq!(filter.level_for("anything"), Severity::Info);
        assert!(filter.enabled(Severity::Warn, "anything"));
        assert!(filter.enabled(Severity::Info, "anything"));
        assert!(!filter.enabled(Severity::Debug, "anything"));
    }

    #[test]
    fn first_registered_override_wins() {
        let mut filter = TagFilter::new(Severity::Info);
        filter.set_level("net", Severity::Error);
        filter.set_level("net", Severity::VeryVerbose);
        filter.set_level("net", Severity::Debug);

        assert_eq!(filter.level_for("net"), Severity::Error);
        assert_eq!(filter.overrides().len(), 3);
    }

    #[test]
    fn tags_match_exactly() {
        let mut filter = TagFilter::new(Severity::Warn);
        filter.set_level("wifi", Severity::Verbose);

        assert_eq!(filter.level_for("wifi"), Severity::Verbose);
        assert_eq!(filter.level_for("WIFI"), Severity::Warn);
        assert_eq!(filter.level_for("wifi.scan"), Severity::Warn);
    }

    #[test]
    fn none_silences_everything() {
        let mut filter = TagFilter::new(Severity::VeryVerbose);
        filter.set_level("quiet", Severity::None);

        for severity in &Severity::ALL[1..] {
            assert!(!filter.enabled(*severity, "quiet"));
        }
    }

    #[test]
    fn setting_global_level_twice_is_idempotent() {
        let mut once = TagFilter::new(Severity::Debug);
        once.set_global_level(Severity::Warn);

        let mut twice = once.clone();
        twice.set_global_level(Severity::Warn);

        assert_eq!(once, twice);
        for severity in Severity::ALL {
            assert_eq!(once.enabled(severity, "t"), twice.enabled(severity, "t"));
        }
    }
}
