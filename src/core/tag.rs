//! Tag data model: matches, configuration, validity classification.
//!
//! A [`TagMatch`] is the raw output of the matcher: text spans and position
//! metadata, nothing parsed. [`process`] turns a match into a
//! [`ProcessedTag`] by parsing both arguments with the tolerant
//! object-literal parser and classifying the result. Namespace resolution
//! fills in `resolved` later; placement into an aggregate only happens for
//! tags that end up with a resolved namespace.

use serde_json::{Map, Value};

use crate::core::literal;
use crate::core::merge::TranslationTree;

/// Which argument slot carries the translations object.
///
/// Global per run: the other slot is the configuration object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgPosition {
    First,
    Second,
}

impl ArgPosition {
    /// From the 1-based `translationArgPosition` config value.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(ArgPosition::First),
            2 => Some(ArgPosition::Second),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            ArgPosition::First => 1,
            ArgPosition::Second => 2,
        }
    }
}

/// Raw text of one argument, with its byte span in the source file.
///
/// The span is trimmed of surrounding whitespace so the regenerator can
/// splice a replacement without touching formatting around the argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagArg {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// A single located occurrence of the tag syntax in one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    /// Full matched call text, from the tag identifier to the closing paren.
    pub text: String,
    /// Byte offset of the tag identifier.
    pub start: usize,
    /// Byte offset just past the closing paren.
    pub end: usize,
    /// 1-based line of the tag identifier.
    pub line: usize,
    /// 1-based column of the tag identifier.
    pub column: usize,
    /// Variable the call result is bound to, if declared on the same match.
    pub variable_name: Option<String>,
    pub param1: Option<TagArg>,
    pub param2: Option<TagArg>,
}

/// Validity classification of a processed tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Ok,
    /// The argument at the translations position failed to parse.
    InvalidParam1,
    /// The argument at the configuration position failed to parse.
    InvalidParam2,
    /// The configured translations position has no argument at all.
    TranslationsNotFound,
}

impl std::fmt::Display for Validity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Validity::Ok => write!(f, "ok"),
            Validity::InvalidParam1 => write!(f, "invalid-param-1"),
            Validity::InvalidParam2 => write!(f, "invalid-param-2"),
            Validity::TranslationsNotFound => write!(f, "translations-not-found"),
        }
    }
}

/// A tag's configuration payload.
///
/// `namespace` and `path` are the recognized fields; everything else is
/// passed through untouched so regeneration round-trips custom fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagConfig {
    pub namespace: Option<String>,
    pub path: Option<String>,
    pub extra: Map<String, Value>,
}

impl TagConfig {
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let namespace = take_string(&mut map, "namespace");
        let path = take_string(&mut map, "path");
        Self {
            namespace,
            path,
            extra: map,
        }
    }

    /// Back to map form, recognized fields first, pass-through fields after.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(namespace) = &self.namespace {
            map.insert("namespace".to_string(), Value::String(namespace.clone()));
        }
        if let Some(path) = &self.path {
            map.insert("path".to_string(), Value::String(path.clone()));
        }
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.namespace.is_none() && self.path.is_none() && self.extra.is_empty()
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(_)) => match map.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        // A non-string value stays in the pass-through map untouched.
        _ => None,
    }
}

/// Final placement of a tag inside the namespace aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPlacement {
    pub namespace: String,
    /// Dot-delimited address inside the namespace tree; empty means root.
    pub path: String,
}

/// A tag match with parsed payloads and classification.
#[derive(Debug, Clone)]
pub struct ProcessedTag {
    pub matched: TagMatch,
    pub position: ArgPosition,
    pub validity: Validity,
    /// Present exactly when `validity` is `Ok`.
    pub translations: Option<TranslationTree>,
    /// Configuration as written in the source (empty when absent).
    pub config: TagConfig,
    /// Configuration after namespace resolution ran.
    pub resolved: Option<TagConfig>,
}

impl ProcessedTag {
    /// The argument in the translations slot, per the run's position setting.
    pub fn translations_arg(&self) -> Option<&TagArg> {
        match self.position {
            ArgPosition::First => self.matched.param1.as_ref(),
            ArgPosition::Second => self.matched.param2.as_ref(),
        }
    }

    /// The argument in the configuration slot.
    pub fn config_arg(&self) -> Option<&TagArg> {
        match self.position {
            ArgPosition::First => self.matched.param2.as_ref(),
            ArgPosition::Second => self.matched.param1.as_ref(),
        }
    }

    /// Where this tag's translations land, once a namespace is resolved.
    ///
    /// A missing path means the namespace root.
    pub fn placement(&self) -> Option<TagPlacement> {
        let resolved = self.resolved.as_ref()?;
        let namespace = resolved.namespace.clone()?;
        Some(TagPlacement {
            namespace,
            path: resolved.path.clone().unwrap_or_default(),
        })
    }
}

/// Parse and classify one tag match.
pub fn process(matched: TagMatch, position: ArgPosition) -> ProcessedTag {
    let (translations_arg, config_arg) = match position {
        ArgPosition::First => (matched.param1.clone(), matched.param2.clone()),
        ArgPosition::Second => (matched.param2.clone(), matched.param1.clone()),
    };

    let Some(translations_arg) = translations_arg else {
        return ProcessedTag {
            matched,
            position,
            validity: Validity::TranslationsNotFound,
            translations: None,
            config: TagConfig::default(),
            resolved: None,
        };
    };

    let translations = match literal::parse_object(&translations_arg.text) {
        Ok(map) => map,
        Err(_) => {
            return ProcessedTag {
                matched,
                position,
                validity: Validity::InvalidParam1,
                translations: None,
                config: TagConfig::default(),
                resolved: None,
            };
        }
    };

    let (config, validity) = match &config_arg {
        None => (TagConfig::default(), Validity::Ok),
        Some(arg) => match literal::parse_object(&arg.text) {
            Ok(map) => (TagConfig::from_map(map), Validity::Ok),
            Err(_) => (TagConfig::default(), Validity::InvalidParam2),
        },
    };

    ProcessedTag {
        matched,
        position,
        validity,
        translations: Some(translations),
        config,
        resolved: None,
    }
}

#[cfg(test)]
mod tests {
    use crate::core::tag::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value, json};

    fn arg(text: &str) -> Option<TagArg> {
        Some(TagArg {
            text: text.to_string(),
            start: 0,
            end: text.len(),
        })
    }

    fn matched(param1: Option<TagArg>, param2: Option<TagArg>) -> TagMatch {
        TagMatch {
            text: "tr(...)".to_string(),
            start: 0,
            end: 7,
            line: 1,
            column: 1,
            variable_name: None,
            param1,
            param2,
        }
    }

    #[test]
    fn test_process_ok_with_config() {
        let tag = process(
            matched(arg(r#"{title: "Hi"}"#), arg(r#"{namespace: "common"}"#)),
            ArgPosition::First,
        );

        assert_eq!(tag.validity, Validity::Ok);
        assert_eq!(
            Value::Object(tag.translations.clone().unwrap()),
            json!({"title": "Hi"})
        );
        assert_eq!(tag.config.namespace.as_deref(), Some("common"));
    }

    #[test]
    fn test_process_ok_without_config() {
        let tag = process(matched(arg(r#"{title: "Hi"}"#), None), ArgPosition::First);

        assert_eq!(tag.validity, Validity::Ok);
        assert!(tag.config.is_empty());
    }

    #[test]
    fn test_process_invalid_translations() {
        let tag = process(matched(arg("{broken"), None), ArgPosition::First);

        assert_eq!(tag.validity, Validity::InvalidParam1);
        assert!(tag.translations.is_none());
    }

    #[test]
    fn test_process_invalid_config() {
        let tag = process(
            matched(arg(r#"{title: "Hi"}"#), arg("nonsense(")),
            ArgPosition::First,
        );

        assert_eq!(tag.validity, Validity::InvalidParam2);
        // Translations still parsed; configuration defaults to empty.
        assert!(tag.translations.is_some());
        assert!(tag.config.is_empty());
    }

    #[test]
    fn test_process_translations_not_found() {
        let tag = process(matched(None, None), ArgPosition::First);
        assert_eq!(tag.validity, Validity::TranslationsNotFound);

        // With translations expected in slot 2, a one-argument call also
        // has no translations.
        let tag = process(
            matched(arg(r#"{namespace: "n"}"#), None),
            ArgPosition::Second,
        );
        assert_eq!(tag.validity, Validity::TranslationsNotFound);
    }

    #[test]
    fn test_process_swapped_positions() {
        let tag = process(
            matched(arg(r#"{namespace: "common"}"#), arg(r#"{title: "Hi"}"#)),
            ArgPosition::Second,
        );

        assert_eq!(tag.validity, Validity::Ok);
        assert_eq!(
            Value::Object(tag.translations.clone().unwrap()),
            json!({"title": "Hi"})
        );
        assert_eq!(tag.config.namespace.as_deref(), Some("common"));
        assert_eq!(tag.config_arg().unwrap().text, r#"{namespace: "common"}"#);
    }

    #[test]
    fn test_config_round_trips_unknown_fields() {
        let map = crate::core::literal::parse_object(
            r#"{namespace: "n", path: "p", custom: "kept", order: 3}"#,
        )
        .unwrap();
        let config = TagConfig::from_map(map.clone());

        assert_eq!(config.namespace.as_deref(), Some("n"));
        assert_eq!(config.path.as_deref(), Some("p"));
        assert_eq!(config.extra.len(), 2);
        assert_eq!(config.to_map(), map);
    }

    #[test]
    fn test_config_non_string_namespace_stays_passthrough() {
        let map = crate::core::literal::parse_object(r#"{namespace: 3}"#).unwrap();
        let config = TagConfig::from_map(map);

        assert!(config.namespace.is_none());
        assert_eq!(config.extra["namespace"], json!(3));
    }

    #[test]
    fn test_placement_requires_resolved_namespace() {
        let mut tag = process(matched(arg(r#"{a: "1"}"#), None), ArgPosition::First);
        assert!(tag.placement().is_none());

        tag.resolved = Some(TagConfig {
            namespace: None,
            path: Some("x".into()),
            extra: Map::new(),
        });
        assert!(tag.placement().is_none());

        tag.resolved = Some(TagConfig {
            namespace: Some("common".into()),
            path: None,
            extra: Map::new(),
        });
        let placement = tag.placement().unwrap();
        assert_eq!(placement.namespace, "common");
        assert_eq!(placement.path, "");
    }
}
