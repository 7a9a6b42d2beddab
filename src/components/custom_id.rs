//! Custom id format: `namespace:componentId[:param...]`
//!
//! The first segment groups components, the second picks the component or factory, and the
//! rest belongs to whichever factory matches. The format is shared with messages already
//! posted, so it must not change.

use sha2::{Digest, Sha256};

use super::error::{ComponentError, Result};
use super::manager::ComponentMetadata;
use crate::core::response::CUSTOM_ID_LIMIT;

pub const SEPARATOR: char = ':';

/// Hex characters kept from the metadata digest
const HASH_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCustomId {
    pub namespace: String,
    pub component_id: String,
    pub metadata_hash: Option<String>,
}

/// First segment of a custom id
pub fn namespace_of(custom_id: &str) -> &str {
    custom_id
        .split_once(SEPARATOR)
        .map_or(custom_id, |(namespace, _)| namespace)
}

/// Build `namespace:id`, or `namespace:id:hash` when metadata carries anything
///
/// The hash only disambiguates ids for humans; it is not collision-resistant.
pub fn generate_custom_id(
    namespace: &str,
    id: &str,
    metadata: Option<&ComponentMetadata>,
) -> Result<String> {
    for (what, segment) in [("namespace", namespace), ("component id", id)] {
        if segment.is_empty() || segment.contains(SEPARATOR) {
            return Err(ComponentError::invalid_id(
                &format!("{namespace}{SEPARATOR}{id}"),
                format!("{what} must be non-empty and contain no '{SEPARATOR}'"),
            ));
        }
    }

    let custom_id = match metadata.filter(|m| !m.is_empty()) {
        Some(metadata) => format!(
            "{namespace}{SEPARATOR}{id}{SEPARATOR}{}",
            metadata_hash(metadata)?
        ),
        None => format!("{namespace}{SEPARATOR}{id}"),
    };

    if custom_id.len() > CUSTOM_ID_LIMIT {
        return Err(ComponentError::invalid_id(
            &custom_id,
            format!("exceeds {CUSTOM_ID_LIMIT} characters"),
        ));
    }
    Ok(custom_id)
}

/// Split a custom id into namespace, component id and optional metadata hash
pub fn parse_custom_id(custom_id: &str) -> Result<ParsedCustomId> {
    let mut segments = custom_id.split(SEPARATOR);
    let namespace = segments.next().unwrap_or_default();
    let component_id = segments.next().ok_or_else(|| {
        ComponentError::invalid_id(
            custom_id,
            format!("expected at least 2 '{SEPARATOR}'-separated segments"),
        )
    })?;

    Ok(ParsedCustomId {
        namespace: namespace.to_string(),
        component_id: component_id.to_string(),
        metadata_hash: segments.next().map(str::to_string),
    })
}

/// Short digest of the metadata's JSON form, keys sorted
pub fn metadata_hash(metadata: &ComponentMetadata) -> Result<String> {
    // Going through Value sorts object keys
    let canonical = serde_json::to_value(metadata)?.to_string();
    let digest = Sha256::digest(canonical.as_bytes());
    let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    Ok(hex[..HASH_LEN].to_string())
}
