//! Process and per-turn configuration
//!
//! Agent fields resolve from the upper-cased environment variable first,
//! then the per-invocation `configurable` mapping, then the field default.
//! Empty values count as absent at every level.

use crate::state_machine::Workflow;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_USER_ID: &str = "default-user";

pub const DEFAULT_ASSISTANT_ROLE: &str = "You are a helpful movie theater assistant. \
You can search for movies, list them, and also search online for movie information.";

const DEFAULT_PORT: u16 = 8000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid MOVIE_AGENT_PORT: {0}")]
    InvalidPort(String),
    #[error("Unknown workflow: {0} (expected tool_calling or lookup)")]
    UnknownWorkflow(String),
}

/// Identity and instructions for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub user_id: String,
    pub assistant_role: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            assistant_role: DEFAULT_ASSISTANT_ROLE.to_string(),
        }
    }
}

impl AgentConfig {
    pub fn resolve(configurable: Option<&HashMap<String, String>>) -> Self {
        Self::resolve_with(|key| std::env::var(key).ok(), configurable)
    }

    pub fn resolve_with(
        env: impl Fn(&str) -> Option<String>,
        configurable: Option<&HashMap<String, String>>,
    ) -> Self {
        let field = |name: &str, default: &str| {
            env(&name.to_uppercase())
                .filter(|v| !v.is_empty())
                .or_else(|| {
                    configurable
                        .and_then(|c| c.get(name))
                        .filter(|v| !v.is_empty())
                        .cloned()
                })
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            user_id: field("user_id", DEFAULT_USER_ID),
            assistant_role: field("assistant_role", DEFAULT_ASSISTANT_ROLE),
        }
    }
}

/// Server process settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub workflow: Workflow,
    pub omdb_api_key: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let db_path = non_empty("MOVIE_AGENT_DB_PATH").map_or_else(
            || {
                let home = non_empty("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".movie-agent").join("movies.db")
            },
            PathBuf::from,
        );

        let port = match non_empty("MOVIE_AGENT_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let workflow = match non_empty("MOVIE_AGENT_WORKFLOW") {
            Some(raw) => raw.parse()?,
            None => Workflow::default(),
        };

        Ok(Self {
            db_path,
            port,
            workflow,
            omdb_api_key: non_empty("OMDB_API_KEY"),
        })
    }
}
