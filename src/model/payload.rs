// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Amredit-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Amredit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Response bodies of the remote annotation session.
//!
//! Only the fields the editing core consumes are typed; extended annotation tables are kept as
//! opaque JSON for the renderer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One sentence rendering as returned by `read`, `next`, `edit`, `save`, `history` and `search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderPayload {
    pub num: u32,
    #[serde(default)]
    pub numsent: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub penman: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub svg: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variables: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warning: Vec<String>,
    #[serde(default)]
    pub undos: u32,
    #[serde(default)]
    pub redos: u32,
    #[serde(default)]
    pub prevmod: u64,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub lastchanged: Option<String>,
    #[serde(default)]
    pub framedoc: Option<String>,
    #[serde(default)]
    pub reldoc: Option<serde_json::Value>,
    #[serde(default)]
    pub umr: bool,
    #[serde(default)]
    pub index: Option<Vec<i64>>,
    #[serde(default)]
    pub words: Option<Vec<String>>,
    #[serde(default)]
    pub alignments: Option<serde_json::Value>,
    #[serde(default)]
    pub docgraph: Option<serde_json::Value>,
}

impl RenderPayload {
    pub fn has_warnings(&self) -> bool {
        !self.warning.is_empty()
    }

    pub fn is_extended(&self) -> bool {
        self.alignments.is_some() || self.docgraph.is_some()
    }
}

/// Session bootstrap data returned by `info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub numsent: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default)]
    pub apiversion: Option<serde_json::Value>,
    #[serde(default)]
    pub umr: bool,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub relations: Option<Vec<String>>,
    #[serde(default)]
    pub concepts: Option<Vec<String>>,
    #[serde(default)]
    pub sentences: Option<Vec<(String, String)>>,
    #[serde(default)]
    pub reifications: Option<Vec<String>>,
    #[serde(default)]
    pub otherfilenames: Option<Vec<String>>,
    #[serde(default)]
    pub comparisons: Option<Vec<[u32; 2]>>,
}

/// Error body sent alongside client-fault responses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// Version information returned by `version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default)]
    pub apiversion: Option<serde_json::Value>,
}

/// The server sends `null` for text fields it has nothing for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Alignment table of extended (UMR) payloads: variable to `(start, end)` word spans.
pub fn alignment_spans(payload: &RenderPayload) -> BTreeMap<String, Vec<(i64, i64)>> {
    let Some(serde_json::Value::Object(map)) = payload.alignments.as_ref() else {
        return BTreeMap::new();
    };

    map.iter()
        .map(|(variable, spans)| {
            let spans = spans
                .as_array()
                .map(|spans| {
                    spans
                        .iter()
                        .filter_map(|span| {
                            let span = span.as_array()?;
                            Some((span.first()?.as_i64()?, span.get(1)?.as_i64()?))
                        })
                        .collect()
                })
                .unwrap_or_default();
            (variable.clone(), spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{alignment_spans, RenderPayload, ServerInfo};

    #[test]
    fn decodes_minimal_payload_with_null_warnings() {
        let payload: RenderPayload = serde_json::from_str(
            r#"{"num": 5, "numsent": 12, "penman": "(d / dog)", "svg": "<svg/>",
                "warning": null, "undos": 2, "redos": 0, "prevmod": 7,
                "variables": ["d"], "readonly": false}"#,
        )
        .expect("payload");

        assert_eq!(payload.num, 5);
        assert_eq!(payload.prevmod, 7);
        assert!(payload.warning.is_empty());
        assert!(!payload.has_warnings());
        assert!(!payload.is_extended());
    }

    #[test]
    fn decodes_null_text_fields_as_empty() {
        let payload: RenderPayload = serde_json::from_str(
            r#"{"num": 3, "sentid": null, "text": null, "comments": null,
                "penman": null, "svg": null, "variables": null, "prevmod": 4}"#,
        )
        .expect("payload");

        assert_eq!(payload.num, 3);
        assert_eq!(payload.prevmod, 4);
        assert!(payload.sentid.is_empty());
        assert!(payload.text.is_empty());
        assert!(payload.penman.is_empty());
        assert!(payload.svg.is_empty());
        assert!(payload.variables.is_empty());

        let info: ServerInfo =
            serde_json::from_str(r#"{"numsent": 2, "filename": null, "version": null}"#)
                .expect("info");
        assert_eq!(info.numsent, 2);
        assert!(info.filename.is_empty());
    }

    #[test]
    fn decodes_extended_payload_tables() {
        let payload: RenderPayload = serde_json::from_str(
            r#"{"num": 1, "warning": ["unknown relation :foo"],
                "index": [1, 2, 3], "words": ["the", "dog", "barks"],
                "alignments": {"d": [[2, 2]], "b": [[3, 3], [1, 1]]},
                "docgraph": {"temporal": [], "modal": []}, "umr": true}"#,
        )
        .expect("payload");

        assert!(payload.is_extended());
        assert_eq!(payload.warning, vec!["unknown relation :foo".to_owned()]);
        let spans = alignment_spans(&payload);
        assert_eq!(spans["b"], vec![(3, 3), (1, 1)]);
        assert_eq!(spans["d"], vec![(2, 2)]);
    }

    #[test]
    fn decodes_server_info_with_sentence_list() {
        let info: ServerInfo = serde_json::from_str(
            r#"{"readonly": true, "numsent": 2, "filename": "a.txt", "version": "4.0",
                "apiversion": 1.2, "sentences": [["s1", "The dog."], ["s2", "A cat."]]}"#,
        )
        .expect("info");

        assert!(info.readonly);
        let sentences = info.sentences.expect("sentences");
        assert_eq!(sentences[1], ("s2".to_owned(), "A cat.".to_owned()));
    }
}
