//! Incremental terminal rendering of transcript snapshots.

use std::collections::HashMap;
use std::io::{self, Write};

use transcript::Snapshot;
use transcript_types::{MessageId, Role, ToolCallId, ToolCallState};

/// Writes only what changed since the previous snapshot.
#[derive(Debug, Default)]
pub struct Renderer {
    /// Bytes of content already written, per assistant message.
    printed: HashMap<MessageId, usize>,
    /// Last rendered state per tool call.
    tools: HashMap<ToolCallId, ToolCallState>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, snapshot: &Snapshot, out: &mut impl Write) -> io::Result<()> {
        for message in snapshot
            .messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
        {
            let printed = self.printed.entry(message.id.clone()).or_insert(0);
            if let Some(fresh) = message.content.get(*printed..) {
                if !fresh.is_empty() {
                    write!(out, "{fresh}")?;
                    *printed = message.content.len();
                }
            }

            for call in message.tool_calls() {
                let previous = self.tools.insert(call.id.clone(), call.state);
                if previous == Some(call.state) {
                    continue;
                }
                match call.state {
                    ToolCallState::InputAvailable => {
                        writeln!(out, "\n[{}] {}", call.name, call.input)?;
                    }
                    ToolCallState::OutputAvailable => {
                        let output = call.output.clone().unwrap_or_default();
                        writeln!(out, "[{}] -> {}", call.name, output)?;
                    }
                    ToolCallState::OutputError => {
                        writeln!(out, "[{}] failed", call.name)?;
                    }
                }
            }
        }
        out.flush()
    }
}
