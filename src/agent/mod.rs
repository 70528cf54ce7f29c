//! Tool-calling agent loop driving a [`DrawingSession`].

pub mod client;
pub mod intent;
pub mod prompts;

use serde_json::{Value, json};

pub use client::ChatClient;
pub use intent::{DrawIntent, KnowledgeBase, extract_intent};

use crate::error::AgentError;
use crate::session::{DrawingSession, ToolCall};
use crate::tools::Variant;

pub const DEFAULT_MAX_ITERATIONS: usize = 30;
const COMPLETED: &str = "Drawing completed";
const ITERATION_LIMIT: &str = "Agent stopped due to iteration limit.";

/// Anything that can answer a chat completion request with an assistant
/// message in OpenAI format.
pub trait ChatBackend {
    fn complete(&self, messages: &[Value], tools: &[Value]) -> Result<Value, AgentError>;
}

/// A tool call requested by the model, with the id its result must echo.
#[derive(Debug, Clone)]
pub struct RequestedCall {
    pub id: String,
    pub call: ToolCall,
}

/// Tool calls in an assistant message. Argument strings that are not valid
/// JSON are passed through so the session reports them as invalid.
pub fn requested_calls(message: &Value) -> Vec<RequestedCall> {
    let Some(calls) = message.get("tool_calls").and_then(Value::as_array) else {
        return Vec::new();
    };
    calls
        .iter()
        .map(|call| {
            let function = &call["function"];
            let arguments = match &function["arguments"] {
                Value::String(raw) if raw.trim().is_empty() => Value::Null,
                Value::String(raw) => {
                    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
                }
                other => other.clone(),
            };
            RequestedCall {
                id: call["id"].as_str().unwrap_or_default().to_string(),
                call: ToolCall {
                    name: function["name"].as_str().unwrap_or("unknown").to_string(),
                    arguments,
                },
            }
        })
        .collect()
}

/// Run the tool loop until the model answers without tool calls or the
/// iteration ceiling is reached. Returns the model's final text.
pub fn run_agent(
    chat: &dyn ChatBackend,
    session: &mut DrawingSession,
    input: &str,
    max_iterations: usize,
) -> Result<String, AgentError> {
    let variant = session.variant();
    let tools = variant.openai_tools();
    let mut messages = vec![
        json!({ "role": "system", "content": prompts::system_prompt(variant) }),
        json!({ "role": "user", "content": input }),
    ];

    for iteration in 0..max_iterations {
        let reply = chat.complete(&messages, &tools)?;
        let calls = requested_calls(&reply);
        let content = reply["content"].as_str().unwrap_or_default().trim().to_string();

        if calls.is_empty() {
            log::info!(
                target: "agent",
                "finished after {} iterations, {} tool calls",
                iteration + 1,
                session.transcript().len()
            );
            return Ok(if content.is_empty() {
                COMPLETED.to_string()
            } else {
                content
            });
        }

        messages.push(reply);
        for requested in calls {
            let outcome = session.invoke(&requested.call);
            messages.push(json!({
                "role": "tool",
                "tool_call_id": requested.id,
                "name": requested.call.name,
                "content": outcome,
            }));
        }
    }

    log::warn!(target: "agent", "stopped at the {max_iterations} iteration limit");
    Ok(ITERATION_LIMIT.to_string())
}

/// Answer a drawing request end to end. The retrieval variant first extracts
/// the requested objects and folds knowledge-base notes into the input.
pub fn respond(
    chat: &dyn ChatBackend,
    session: &mut DrawingSession,
    question: &str,
    knowledge: &KnowledgeBase,
    max_iterations: usize,
) -> Result<String, AgentError> {
    let input = match session.variant() {
        Variant::Retrieval => {
            let intent = extract_intent(chat, question);
            knowledge.build_input(question, &intent)
        }
        Variant::Creative | Variant::Diagram => question.to_string(),
    };
    run_agent(chat, session, &input, max_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use cosmic_text::fontdb::Database;

    use crate::planner::PlannerLayout;

    /// Replays canned assistant messages and records what it was sent.
    struct Scripted {
        replies: RefCell<Vec<Value>>,
        seen: RefCell<Vec<Vec<Value>>>,
    }

    impl Scripted {
        fn new(replies: Vec<Value>) -> Self {
            Self {
                replies: RefCell::new(replies),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatBackend for Scripted {
        fn complete(&self, messages: &[Value], _tools: &[Value]) -> Result<Value, AgentError> {
            self.seen.borrow_mut().push(messages.to_vec());
            let mut replies = self.replies.borrow_mut();
            if replies.is_empty() {
                return Err(AgentError::MalformedResponse("script exhausted".to_string()));
            }
            Ok(replies.remove(0))
        }
    }

    fn tool_reply(id: &str, name: &str, arguments: &str) -> Value {
        json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": id,
                "type": "function",
                "function": { "name": name, "arguments": arguments }
            }]
        })
    }

    fn session(variant: Variant) -> DrawingSession {
        DrawingSession::new(variant, Database::new(), PlannerLayout::default()).unwrap()
    }

    #[test]
    fn parses_string_and_object_arguments() {
        let message = json!({
            "tool_calls": [
                {"id": "a", "function": {"name": "add_circle", "arguments": "{\"x\": 1}"}},
                {"id": "b", "function": {"name": "create_canvas", "arguments": {"width": 5}}},
                {"id": "c", "function": {"name": "add_text", "arguments": "{oops"}},
                {"id": "d", "function": {"name": "create_canvas", "arguments": ""}}
            ]
        });
        let calls = requested_calls(&message);
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].call.arguments["x"], 1);
        assert_eq!(calls[1].call.arguments["width"], 5);
        assert!(calls[2].call.arguments.is_string());
        assert!(calls[3].call.arguments.is_null());
        assert!(requested_calls(&json!({"content": "hi"})).is_empty());
    }

    #[test]
    fn executes_tools_then_returns_text() {
        let chat = Scripted::new(vec![
            tool_reply("1", "create_canvas", r#"{"width": 50, "height": 40}"#),
            tool_reply("2", "add_circle", r#"{"x": 25, "y": 20, "radius": 10}"#),
            json!({"role": "assistant", "content": "Here is your circle."}),
        ]);
        let mut s = session(Variant::Creative);
        let text = run_agent(&chat, &mut s, "draw a circle", 30).unwrap();

        assert_eq!(text, "Here is your circle.");
        assert!(s.canvas().is_some());
        assert_eq!(s.transcript().len(), 2);

        let seen = chat.seen.borrow();
        let last = seen.last().unwrap();
        let tool_message = &last[last.len() - 1];
        assert_eq!(tool_message["role"], "tool");
        assert_eq!(tool_message["tool_call_id"], "2");
        assert!(tool_message["content"].as_str().unwrap().starts_with("Circle drawn at (25,20)"));
    }

    #[test]
    fn tool_errors_are_fed_back() {
        let chat = Scripted::new(vec![
            tool_reply("1", "add_circle", r#"{"x": 1, "y": 1, "radius": 1}"#),
            json!({"role": "assistant", "content": ""}),
        ]);
        let mut s = session(Variant::Creative);
        let text = run_agent(&chat, &mut s, "draw", 30).unwrap();
        assert_eq!(text, "Drawing completed");

        let seen = chat.seen.borrow();
        let tool_message = seen[1].last().unwrap();
        assert_eq!(
            tool_message["content"],
            "ERROR: Canvas not created. Call create_canvas first"
        );
    }

    #[test]
    fn stops_at_iteration_limit() {
        let replies = (0..5)
            .map(|i| tool_reply(&i.to_string(), "plan_flowchart", r#"{"num_main_elements": 2}"#))
            .collect();
        let chat = Scripted::new(replies);
        let mut s = session(Variant::Diagram);
        let text = run_agent(&chat, &mut s, "plan", 3).unwrap();
        assert_eq!(text, ITERATION_LIMIT);
        assert_eq!(chat.seen.borrow().len(), 3);
    }

    #[test]
    fn transport_errors_propagate() {
        let chat = Scripted::new(Vec::new());
        let mut s = session(Variant::Creative);
        assert!(run_agent(&chat, &mut s, "draw", 30).is_err());
    }

    #[test]
    fn retrieval_enriches_input_before_drawing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sun.txt"), "A yellow circle with rays.").unwrap();
        let chat = Scripted::new(vec![
            json!({"role": "assistant", "content": "{\"objects\": [{\"name\": \"sun\", \"count\": 1}]}"}),
            json!({"role": "assistant", "content": "Done."}),
        ]);
        let mut s = session(Variant::Retrieval);
        let text = respond(&chat, &mut s, "draw the sun", &KnowledgeBase::new(dir.path()), 30).unwrap();
        assert_eq!(text, "Done.");

        let seen = chat.seen.borrow();
        let user = seen[1][1]["content"].as_str().unwrap();
        assert!(user.starts_with("Make sure not to overlap"));
        assert!(user.ends_with("Knowledge about sun:\nA yellow circle with rays."));
    }
}
