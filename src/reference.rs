use serde::Deserialize;

/// Supplies the settlement reference for requests that carry no transaction id.
pub trait ReferenceSource: Send + Sync {
    fn next_reference(&self) -> String;
}

/// Wall-clock milliseconds since the Unix epoch. Two calls within the same
/// millisecond return the same reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ReferenceSource for SystemClock {
    fn next_reference(&self) -> String {
        chrono::Utc::now().timestamp_millis().to_string()
    }
}

/// Random v4 UUID without hyphens (32 hex digits).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidReference;

impl ReferenceSource for UuidReference {
    fn next_reference(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string().to_uppercase()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceMode {
    #[default]
    Clock,
    Uuid,
}

impl ReferenceMode {
    pub fn source(self) -> Box<dyn ReferenceSource> {
        match self {
            Self::Clock => Box::new(SystemClock),
            Self::Uuid => Box::new(UuidReference),
        }
    }
}
