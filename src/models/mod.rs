pub mod category;
pub mod project;
pub mod task;
pub mod workspace;

use serde::{Deserialize, Deserializer};

/// Distinguishes an explicit JSON `null` from an absent field when used with
/// `#[serde(default, deserialize_with = "present")]` on an `Option<Option<T>>`:
/// absent -> `None`, `null` -> `Some(None)`, value -> `Some(Some(v))`.
pub(crate) fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Offset/limit query params shared by every list endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { skip: 0, limit: default_limit() }
    }
}
