use std::fmt::Display;

pub use crate::constants::format::HEADER_DELIMITER;

/// Canonical identifier for `#%key=value` header fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetadataKey {
    name: &'static str,
}

impl MetadataKey {
    /// Create a metadata key with a canonical static name.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// Return the raw key name.
    pub const fn as_str(&self) -> &'static str {
        self.name
    }

    /// Encode a value using the header delimiter (e.g., "guid=abc-123").
    pub fn encode(&self, value: impl Display) -> String {
        format!("{}{}{}", self.name, HEADER_DELIMITER, value)
    }

    /// Strip the field prefix from a serialized header entry.
    pub fn strip<'a>(&self, entry: &'a str) -> Option<&'a str> {
        entry
            .strip_prefix(self.name)
            .and_then(|rest| rest.strip_prefix(HEADER_DELIMITER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::report::META_GUID;

    #[test]
    fn metadata_key_encodes_and_strips_values() {
        let encoded = META_GUID.encode("00af-1c");
        assert_eq!(encoded, "guid=00af-1c");
        assert_eq!(META_GUID.strip(&encoded), Some("00af-1c"));
        assert_eq!(META_GUID.strip("other=00af-1c"), None);
    }

    #[test]
    fn metadata_key_new_and_as_str_work() {
        const CUSTOM: MetadataKey = MetadataKey::new("custom");
        assert_eq!(CUSTOM.as_str(), "custom");
        assert_eq!(CUSTOM.encode(42), "custom=42");
        assert_eq!(CUSTOM.strip("custom=42"), Some("42"));
        assert_eq!(CUSTOM.strip("custom42"), None);
    }
}
