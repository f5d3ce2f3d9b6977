//! Request header model — closed vocabulary, preset modes, mutations
//!
//! Headers are kept as an ordered entry list, not a map: negative-path
//! scenarios need two entries with the same name, which a map cannot hold.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// System part (transport-level slots)
pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";
pub const SUBSCRIPTION_KEY: &str = "Subscription-Key";
pub const CACHE_CONTROL: &str = "Cache-Control";
pub const CONTENT_ENCODING: &str = "Content-Encoding";

// Business part (payload-routing slots)
pub const SOURCE_SYSTEM: &str = "Source-System";
pub const DESTINATION_SYSTEM: &str = "Destination-System";
pub const REQUEST_CREATED_AT: &str = "Request-Created-At";
pub const REQUEST_PROCESSED_AT: &str = "Request-Processed-At";
pub const REQUEST_TYPE: &str = "Request-Type";
pub const TRANSACTION_ID: &str = "Transaction-Id";

/// One header entry. `value: None` means the slot is deliberately null;
/// the executor skips such entries, which is distinct from `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub name: String,
    pub value: Option<String>,
}

/// Ordered multi-entry header list.
///
/// Lookup is case-insensitive (HTTP header semantics); duplicates are
/// representable and preserved in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<HeaderEntry>,
}

impl HeaderSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: Option<String>) {
        self.entries.push(HeaderEntry {
            name: name.into(),
            value,
        });
    }

    /// First value for `name`, case-insensitive.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .and_then(|e| e.value.as_deref())
    }

    /// Number of entries carrying `name`, case-insensitive.
    #[must_use]
    pub fn count_of(&self, name: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.name.eq_ignore_ascii_case(name))
            .count()
    }

    /// All values for `name` in order, case-insensitive.
    #[must_use]
    pub fn values_of(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.name.eq_ignore_ascii_case(name))
            .filter_map(|e| e.value.as_deref())
            .collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = &'a HeaderEntry;
    type IntoIter = std::slice::Iter<'a, HeaderEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Semantic slot values a scenario supplies before mode derivation.
///
/// Unset timestamps and transaction id are generated fresh at build time,
/// so repeated builds are not byte-identical unless those slots are pinned.
#[derive(Debug, Clone)]
pub struct HeaderSlots {
    pub content_type: String,
    pub accept: String,
    pub subscription_key: String,
    pub cache_control: String,
    pub content_encoding: String,
    pub source_system: String,
    pub destination_system: String,
    pub request_type: String,
    pub request_created_at: Option<String>,
    pub request_processed_at: Option<String>,
    pub transaction_id: Option<String>,
}

impl HeaderSlots {
    /// Well-formed slots for the given subscription key; everything else
    /// takes the contract's default value.
    #[must_use]
    pub fn standard(subscription_key: impl Into<String>) -> Self {
        Self {
            content_type: "application/json".to_string(),
            accept: "application/json; version=1.2".to_string(),
            subscription_key: subscription_key.into(),
            cache_control: "no-cache".to_string(),
            content_encoding: "gzip".to_string(),
            source_system: "CFT".to_string(),
            destination_system: "SNL".to_string(),
            request_type: "STANDARD".to_string(),
            request_created_at: None,
            request_processed_at: None,
            transaction_id: None,
        }
    }

    #[must_use]
    pub fn with_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_timestamps(
        mut self,
        created_at: impl Into<String>,
        processed_at: impl Into<String>,
    ) -> Self {
        self.request_created_at = Some(created_at.into());
        self.request_processed_at = Some(processed_at.into());
        self
    }
}

/// Named preset describing which header slots are populated and how.
///
/// Suite files name unit modes as bare strings (`mode = "complete"`) and
/// parameterized modes as tables (`mode = { truncated_keys = ["Accept"] }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// All 11 slots, well-formed values.
    Complete,
    /// Omits the optional system slots (Cache-Control, Content-Encoding).
    MandatoryOnly,
    /// Every slot present with a blank value.
    AllBlank,
    /// Every slot present with a null value (skipped at transport).
    AllNull,
    /// Complete set with Source-System replaced.
    SourceSystem(String),
    /// Complete set with Destination-System replaced.
    DestinationSystem(String),
    /// Complete set with Request-Created-At replaced.
    RequestCreatedAt(String),
    /// Complete set with Request-Processed-At replaced.
    RequestProcessedAt(String),
    /// Complete set with the last character of each named key removed.
    /// The value is untouched; this is distinct from removal.
    TruncatedKeys(Vec<String>),
    /// Complete set with the named keys absent entirely.
    RemovedKeys(Vec<String>),
    /// Complete set plus a second entry with the same name and a
    /// different value.
    Duplicated { name: String, value: String },
}

/// Derive a concrete header set from a mode and slot values.
///
/// Pure construction — deliberately malformed output is a valid result,
/// so there is no failure path.
#[must_use]
pub fn build_headers(mode: &HeaderMode, slots: &HeaderSlots) -> HeaderSet {
    let mut set = match mode {
        HeaderMode::MandatoryOnly => merged(slots, false),
        _ => merged(slots, true),
    };

    match mode {
        HeaderMode::Complete | HeaderMode::MandatoryOnly => {}
        HeaderMode::AllBlank => {
            for e in &mut set.entries {
                e.value = Some(String::new());
            }
        }
        HeaderMode::AllNull => {
            for e in &mut set.entries {
                e.value = None;
            }
        }
        HeaderMode::SourceSystem(v) => replace_value(&mut set, SOURCE_SYSTEM, v),
        HeaderMode::DestinationSystem(v) => replace_value(&mut set, DESTINATION_SYSTEM, v),
        HeaderMode::RequestCreatedAt(v) => replace_value(&mut set, REQUEST_CREATED_AT, v),
        HeaderMode::RequestProcessedAt(v) => replace_value(&mut set, REQUEST_PROCESSED_AT, v),
        HeaderMode::TruncatedKeys(keys) => {
            for e in &mut set.entries {
                if keys.iter().any(|k| k.eq_ignore_ascii_case(&e.name)) {
                    e.name.pop();
                }
            }
        }
        HeaderMode::RemovedKeys(keys) => {
            set.entries
                .retain(|e| !keys.iter().any(|k| k.eq_ignore_ascii_case(&e.name)));
        }
        HeaderMode::Duplicated { name, value } => {
            set.push(name.clone(), Some(value.clone()));
        }
    }

    set
}

/// System part followed by business part, in fixed slot order.
fn merged(slots: &HeaderSlots, include_optional: bool) -> HeaderSet {
    let mut set = HeaderSet::new();

    set.push(CONTENT_TYPE, Some(slots.content_type.clone()));
    set.push(ACCEPT, Some(slots.accept.clone()));
    set.push(SUBSCRIPTION_KEY, Some(slots.subscription_key.clone()));
    if include_optional {
        set.push(CACHE_CONTROL, Some(slots.cache_control.clone()));
        set.push(CONTENT_ENCODING, Some(slots.content_encoding.clone()));
    }

    set.push(SOURCE_SYSTEM, Some(slots.source_system.clone()));
    set.push(DESTINATION_SYSTEM, Some(slots.destination_system.clone()));
    set.push(
        REQUEST_CREATED_AT,
        Some(
            slots
                .request_created_at
                .clone()
                .unwrap_or_else(rfc3339_now),
        ),
    );
    set.push(
        REQUEST_PROCESSED_AT,
        Some(
            slots
                .request_processed_at
                .clone()
                .unwrap_or_else(rfc3339_now),
        ),
    );
    set.push(REQUEST_TYPE, Some(slots.request_type.clone()));
    set.push(
        TRANSACTION_ID,
        Some(
            slots
                .transaction_id
                .clone()
                .unwrap_or_else(fresh_transaction_id),
        ),
    );

    set
}

fn replace_value(set: &mut HeaderSet, name: &str, value: &str) {
    for e in &mut set.entries {
        if e.name.eq_ignore_ascii_case(name) {
            e.value = Some(value.to_string());
        }
    }
}

/// UUID-shaped random transaction id, e.g. `3f2a1b4c-9d0e-4f1a-8b2c-5d6e7f8a9b0c`.
#[must_use]
pub fn fresh_transaction_id() -> String {
    let mut rng = SmallRng::from_entropy();
    let hi: u64 = rng.r#gen();
    let lo: u64 = rng.r#gen();
    format!(
        "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
        (hi >> 32) as u32,
        (hi >> 16) as u16,
        hi as u16,
        (lo >> 48) as u16,
        lo & 0xffff_ffff_ffff
    )
}

/// Current UTC instant as `yyyy-MM-ddTHH:mm:ssZ`.
#[must_use]
pub fn rfc3339_now() -> String {
    OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .format(&Rfc3339)
        .unwrap_or_default()
}
