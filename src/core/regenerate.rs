//! Tag configuration regeneration.
//!
//! An independent pass over the matcher/parser output: for each valid tag
//! the resolved configuration is serialized in the canonical form and, when
//! it differs from what is written in the file, spliced over the recorded
//! argument span. All splices are computed against the original content and
//! applied in descending offset order so earlier replacements cannot shift
//! later spans; everything outside the replaced spans stays byte-identical.

use crate::core::literal;
use crate::core::tag::{ArgPosition, ProcessedTag, Validity};

/// Recompute the file content with regenerated tag configurations.
///
/// Returns `None` when no tag's configuration changed, so a file is
/// rewritten at most once per run and only when needed.
pub fn regenerate_file(content: &str, tags: &[ProcessedTag]) -> Option<String> {
    let mut edits: Vec<(usize, usize, String)> = Vec::new();

    for tag in tags {
        if tag.validity != Validity::Ok {
            continue;
        }
        let Some(resolved) = &tag.resolved else {
            continue;
        };
        let rendered = literal::write_object(&resolved.to_map());

        match tag.config_arg() {
            Some(arg) => {
                if arg.text != rendered {
                    edits.push((arg.start, arg.end, rendered));
                }
            }
            None => {
                if resolved.is_empty() {
                    continue;
                }
                // A missing configuration argument can only be appended
                // when it is the second slot.
                if tag.position == ArgPosition::First
                    && let Some(translations) = tag.translations_arg()
                {
                    edits.push((translations.end, translations.end, format!(", {rendered}")));
                }
            }
        }
    }

    if edits.is_empty() {
        return None;
    }

    edits.sort_by(|a, b| b.0.cmp(&a.0));
    let mut updated = content.to_string();
    for (start, end, replacement) in edits {
        updated.replace_range(start..end, &replacement);
    }
    Some(updated)
}
