//! Agent table: which model actually serves a requested agent.
//!
//! The profile form offers agents that are not all reachable through the
//! planner backend. Each entry maps an agent id to a backing model; agents
//! marked `emulate` are served by their backing model with an instruction
//! to imitate the requested agent's style. The built-in table is defined in
//! `agents.toml` and embedded at compile time.
//!
//! ```text
//! "gemini-3-pro-preview" -> model gemini-3-pro-preview, no note
//! "gemini-exp-1206"      -> model gemini-exp-1206 (gemini-* passes through)
//! "deepseek-r1"          -> model gemini-2.5-flash, note "acting as deepseek-r1"
//! "mystery-llm"          -> model gemini-2.5-flash, note "acting as mystery-llm"
//! ""                     -> model gemini-2.5-flash, no note
//! ```

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::profile::DEFAULT_AGENT;

/// Model used when the requested agent cannot be served directly.
pub const DEFAULT_BACKING_MODEL: &str = DEFAULT_AGENT;

/// Prefix of model ids the backend serves natively.
const NATIVE_PREFIX: &str = "gemini";

/// The embedded agent table.
static AGENTS_TOML: &str = include_str!("agents.toml");

/// One selectable agent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    /// Display name, e.g. "DeepSeek R1".
    pub name: String,
    pub description: String,
    /// Vendor grouping on the form: `google`, `china`, `other`.
    pub group: String,
    pub backing_model: String,
    #[serde(default)]
    pub emulate: bool,
}

#[derive(Debug, Deserialize)]
struct AgentFile {
    agents: Vec<AgentProfile>,
}

#[derive(Debug, Error)]
pub enum AgentTableError {
    #[error("agent table TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("duplicate agent id: {0:?}")]
    DuplicateId(String),
}

/// The model a request should go to, and the style note to prepend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAgent {
    /// The id the profile asked for (may be empty).
    pub requested: String,
    pub model: String,
    /// Present when the backing model is standing in for another agent.
    pub emulation_note: Option<String>,
}

impl ResolvedAgent {
    pub fn is_emulated(&self) -> bool {
        self.emulation_note.is_some()
    }
}

/// Build the instruction asking the backing model to act as `agent_id`.
pub fn emulation_note(agent_id: &str) -> String {
    format!(
        "[System Note: You are acting as the AI model \"{agent_id}\". Adopt its typical \
         reasoning style and characteristics while generating the following Chinese diet plan.]"
    )
}

/// Ordered collection of [`AgentProfile`]s.
#[derive(Clone, Default)]
pub struct AgentTable {
    agents: Vec<AgentProfile>,
}

impl AgentTable {
    /// Load the built-in table.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed. The file ships with the
    /// binary, so a build that passes its tests has a valid table.
    pub fn builtin() -> Self {
        Self::from_toml_str(AGENTS_TOML).expect("embedded agents.toml is invalid")
    }

    /// Parse a table from TOML with `[[agents]]` entries.
    pub fn from_toml_str(content: &str) -> Result<Self, AgentTableError> {
        let file: AgentFile = toml::from_str(content)?;
        let mut table = Self::default();
        for agent in file.agents {
            if table.get(&agent.id).is_some() {
                return Err(AgentTableError::DuplicateId(agent.id));
            }
            table.agents.push(agent);
        }
        Ok(table)
    }

    pub fn get(&self, id: &str) -> Option<&AgentProfile> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Agents in table order.
    pub fn list(&self) -> &[AgentProfile] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Decide which model serves `requested`.
    pub fn resolve(&self, requested: &str) -> ResolvedAgent {
        let requested_owned = requested.to_string();

        if requested.is_empty() {
            return ResolvedAgent {
                requested: requested_owned,
                model: DEFAULT_BACKING_MODEL.to_string(),
                emulation_note: None,
            };
        }

        match self.get(requested) {
            Some(agent) if agent.emulate => ResolvedAgent {
                requested: requested_owned,
                model: agent.backing_model.clone(),
                emulation_note: Some(emulation_note(requested)),
            },
            Some(agent) => ResolvedAgent {
                requested: requested_owned,
                model: agent.backing_model.clone(),
                emulation_note: None,
            },
            None if requested.starts_with(NATIVE_PREFIX) => ResolvedAgent {
                requested: requested_owned.clone(),
                model: requested_owned,
                emulation_note: None,
            },
            None => {
                tracing::debug!(agent = requested, "unknown agent, emulating on default model");
                ResolvedAgent {
                    requested: requested_owned,
                    model: DEFAULT_BACKING_MODEL.to_string(),
                    emulation_note: Some(emulation_note(requested)),
                }
            }
        }
    }
}

impl fmt::Debug for AgentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentTable")
            .field("agents", &self.agents.iter().map(|a| &a.id).collect::<Vec<_>>())
            .finish()
    }
}
