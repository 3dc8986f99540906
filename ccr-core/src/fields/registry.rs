//! Field definitions and the validator lookup table.

use super::advanced::ADVANCED_SETTINGS;
use super::{FieldError, FieldErrors, FieldId, FieldValues};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Pure check of a candidate value.
pub type Validator = fn(&str) -> Option<FieldError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    RemoteCluster,
    Number,
    ByteSize,
    TimeValue,
}

/// Declarative description of one form field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDefinition {
    pub id: FieldId,
    pub label: &'static str,
    pub description: &'static str,
    /// Value the cluster applies when the field is left empty
    pub default_value: Option<&'static str>,
    pub kind: FieldKind,
    pub validator: Option<Validator>,
}

pub static IDENTITY_FIELDS: [FieldDefinition; 3] = [
    FieldDefinition {
        id: FieldId::RemoteCluster,
        label: "Remote cluster",
        description: "The cluster that contains the index to replicate.",
        default_value: None,
        kind: FieldKind::RemoteCluster,
        validator: None,
    },
    FieldDefinition {
        id: FieldId::LeaderIndex,
        label: "Leader index",
        description: "The index on the remote cluster to replicate to the follower index.",
        default_value: None,
        kind: FieldKind::Text,
        validator: Some(validate_leader_index),
    },
    FieldDefinition {
        id: FieldId::Name,
        label: "Follower index",
        description: "A unique name for your index.",
        default_value: None,
        kind: FieldKind::Text,
        validator: Some(validate_name),
    },
];

static GLOBAL: Lazy<FieldRegistry> = Lazy::new(|| FieldRegistry::new(&ADVANCED_SETTINGS));

/// Lookup table from field to definition, built once from the declarative lists.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    definitions: BTreeMap<FieldId, FieldDefinition>,
    advanced: Vec<FieldId>,
}

impl FieldRegistry {
    /// Combine the advanced setting table with the built-in identity fields.
    pub fn new(advanced: &[FieldDefinition]) -> Self {
        let mut definitions = BTreeMap::new();
        for def in advanced.iter().chain(IDENTITY_FIELDS.iter()) {
            definitions.insert(def.id, *def);
        }
        Self {
            definitions,
            advanced: advanced.iter().map(|def| def.id).collect(),
        }
    }

    pub fn global() -> &'static FieldRegistry {
        &GLOBAL
    }

    pub fn definition(&self, id: FieldId) -> Option<&FieldDefinition> {
        self.definitions.get(&id)
    }

    pub fn advanced_definitions(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.advanced.iter().filter_map(|id| self.definitions.get(id))
    }

    /// Fields without a registered validator are always valid.
    pub fn validate(&self, id: FieldId, value: &str) -> Option<FieldError> {
        self.definitions
            .get(&id)
            .and_then(|def| def.validator)
            .and_then(|validator| validator(value))
    }

    pub fn validate_all(&self, values: &FieldValues) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (id, value) in values.iter() {
            errors.set(id, self.validate(id, value));
        }
        errors
    }
}

const ILLEGAL_INDEX_CHARACTERS: [char; 10] = ['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#'];

fn illegal_characters(value: &str) -> Vec<char> {
    let mut found = Vec::new();
    for c in value.chars() {
        if ILLEGAL_INDEX_CHARACTERS.contains(&c) && !found.contains(&c) {
            found.push(c);
        }
    }
    found
}

fn format_characters(chars: &[char]) -> String {
    chars.iter().map(char::to_string).collect::<Vec<_>>().join(" ")
}

pub fn validate_name(value: &str) -> Option<FieldError> {
    if value.trim().is_empty() {
        return Some(FieldError::new("Name is required."));
    }
    if value.contains(char::is_whitespace) {
        return Some(FieldError::new("Spaces are not allowed in the name."));
    }
    if value.starts_with('.') {
        return Some(FieldError::new("Name can't begin with a period."));
    }
    if value.starts_with(['-', '_', '+']) {
        return Some(FieldError::new("Name can't begin with -, _ or +."));
    }
    let illegal = illegal_characters(value);
    if !illegal.is_empty() {
        return Some(FieldError::new(format!(
            "Remove the characters {} from your name.",
            format_characters(&illegal)
        )));
    }
    if value.chars().any(char::is_uppercase) {
        return Some(FieldError::new("Name must be lowercase."));
    }
    None
}

pub fn validate_leader_index(value: &str) -> Option<FieldError> {
    if value.trim().is_empty() {
        return Some(FieldError::new("Leader index is required."));
    }
    if value.contains(char::is_whitespace) {
        return Some(FieldError::new("Spaces are not allowed in the leader index."));
    }
    let illegal = illegal_characters(value);
    if !illegal.is_empty() {
        return Some(FieldError::new(format!(
            "Remove the characters {} from your leader index.",
            format_characters(&illegal)
        )));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_field() {
        let registry = FieldRegistry::global();
        for id in FieldId::all() {
            assert!(registry.definition(id).is_some(), "missing definition for {}", id);
        }
        assert_eq!(registry.advanced_definitions().count(), 10);
    }

    #[test]
    fn test_unregistered_validator_is_valid() {
        let registry = FieldRegistry::global();
        assert_eq!(registry.validate(FieldId::RemoteCluster, ""), None);
        assert_eq!(registry.validate(FieldId::RemoteCluster, "anything at all"), None);

        let bare = FieldRegistry::new(&[]);
        assert_eq!(bare.validate(FieldId::MaxRetryDelay, "not a duration"), None);
    }

    #[test]
    fn test_name_validator() {
        assert_eq!(validate_name("orders-follower"), None);
        assert_eq!(
            validate_name("   ").map(|e| e.message),
            Some("Name is required.".to_string())
        );
        assert!(validate_name("orders follower").is_some());
        assert!(validate_name(".hidden").is_some());
        assert!(validate_name("_underscore").is_some());
        assert!(validate_name("Orders").is_some());
        assert_eq!(
            validate_name("a*b?c").map(|e| e.message),
            Some("Remove the characters * ? from your name.".to_string())
        );
    }

    #[test]
    fn test_leader_index_validator() {
        assert_eq!(validate_leader_index("orders"), None);
        assert!(validate_leader_index("").is_some());
        assert!(validate_leader_index("or ders").is_some());
        assert!(validate_leader_index("orders|x").is_some());
    }

    #[test]
    fn test_validate_all_tracks_every_field() {
        let errors = FieldRegistry::global().validate_all(&FieldValues::default());
        for id in FieldId::all() {
            assert!(errors.is_tracked(id));
        }
        assert!(errors.get(FieldId::Name).is_some());
        assert!(errors.get(FieldId::LeaderIndex).is_some());
        assert!(errors.get(FieldId::RemoteCluster).is_none());
        assert!(errors.get(FieldId::MaxRetryDelay).is_none());
    }
}
