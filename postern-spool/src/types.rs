/// Identifier for a spooled message
///
/// A ULID, which serves as both the tracking ID reported back to the client
/// and the filename stem in the file-backed store. ULIDs sort by creation
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpooledMessageId {
    id: ulid::Ulid,
}

impl SpooledMessageId {
    /// Parse a message ID from a filename like `01ARYZ6S41.bin` or `01ARYZ6S41.eml`
    ///
    /// Anything containing a path separator or `..`, or whose stem is not a
    /// valid ULID, is rejected.
    #[must_use]
    pub fn from_filename(filename: &str) -> Option<Self> {
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return None;
        }

        let stem = filename
            .strip_suffix(".bin")
            .or_else(|| filename.strip_suffix(".eml"))?;

        stem.parse().ok()
    }

    /// Generate a new unique message ID
    #[must_use]
    pub fn generate() -> Self {
        Self {
            id: ulid::Ulid::new(),
        }
    }

    /// Milliseconds since the Unix epoch at which this ID was generated
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        self.id.timestamp_ms()
    }
}

impl std::str::FromStr for SpooledMessageId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            id: ulid::Ulid::from_string(s)?,
        })
    }
}

impl std::fmt::Display for SpooledMessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl serde::Serialize for SpooledMessageId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.id.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for SpooledMessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
