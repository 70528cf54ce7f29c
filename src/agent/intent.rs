//! Object extraction and knowledge-base enrichment for the retrieval variant.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::json;

use super::ChatBackend;
use super::prompts::{INTENT_FORMAT_INSTRUCTIONS, INTENT_PROMPT};
use crate::error::AgentError;

pub const MAX_OBJECT_COUNT: u32 = 20;
const NO_OVERLAP_PREFIX: &str = "Make sure not to overlap any drawing object over each other. ";

fn default_count() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DrawObject {
    pub name: String,
    #[serde(default = "default_count")]
    pub count: i64,
}

/// Objects the user asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DrawIntent {
    #[serde(default)]
    pub objects: Vec<DrawObject>,
}

impl DrawIntent {
    /// Trim names, drop empty ones, merge duplicates case-insensitively and
    /// clamp every count to `1..=20`.
    pub fn normalized(self) -> Self {
        let mut merged: Vec<DrawObject> = Vec::new();
        for object in self.objects {
            let name = object.name.trim();
            if name.is_empty() {
                continue;
            }
            let count = object.count.max(1);
            match merged.iter_mut().find(|o| o.name.eq_ignore_ascii_case(name)) {
                Some(existing) => existing.count = existing.count.saturating_add(count),
                None => merged.push(DrawObject {
                    name: name.to_string(),
                    count,
                }),
            }
        }
        for object in &mut merged {
            object.count = object.count.clamp(1, i64::from(MAX_OBJECT_COUNT));
        }
        Self { objects: merged }
    }
}

/// Parse the model's reply, tolerating prose or code fences around the JSON.
pub fn parse_intent(reply: &str) -> Result<DrawIntent, AgentError> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => {
            return Err(AgentError::MalformedResponse(
                "no JSON object in intent reply".to_string(),
            ));
        }
    };
    let intent: DrawIntent =
        serde_json::from_str(json).map_err(|e| AgentError::MalformedResponse(e.to_string()))?;
    Ok(intent.normalized())
}

/// Ask the model which objects the request mentions. Failures degrade to an
/// empty intent.
pub fn extract_intent(chat: &dyn ChatBackend, question: &str) -> DrawIntent {
    let messages = [
        json!({ "role": "system", "content": INTENT_PROMPT }),
        json!({
            "role": "user",
            "content": format!("{question}\n\n{INTENT_FORMAT_INSTRUCTIONS}"),
        }),
    ];

    let result = chat.complete(&messages, &[]).and_then(|reply| {
        let content = reply["content"].as_str().unwrap_or_default();
        parse_intent(content)
    });
    match result {
        Ok(intent) => {
            log::info!(target: "agent", "extracted {} objects", intent.objects.len());
            intent
        }
        Err(err) => {
            log::warn!(target: "agent", "intent extraction failed: {err}");
            DrawIntent::default()
        }
    }
}

/// Directory of `<object>.txt` drawing notes.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    dir: PathBuf,
}

impl KnowledgeBase {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Notes for `name`, if a file exists for it.
    pub fn lookup(&self, name: &str) -> Option<String> {
        let name = name.trim().to_lowercase();
        let safe = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'));
        if !safe {
            return None;
        }

        let path = self.dir.join(format!("{name}.txt"));
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(_) => {
                log::debug!(target: "agent", "no knowledge file at {}", path.display());
                None
            }
        }
    }

    /// The request text handed to the drawing agent: the no-overlap
    /// instruction, the question, then whatever notes exist per object.
    pub fn build_input(&self, question: &str, intent: &DrawIntent) -> String {
        let notes: Vec<String> = intent
            .objects
            .iter()
            .filter_map(|object| {
                self.lookup(&object.name)
                    .map(|text| format!("Knowledge about {}:\n{}", object.name, text))
            })
            .collect();
        format!("{NO_OVERLAP_PREFIX}{question}\n\n{}", notes.join("\n\n"))
    }
}
