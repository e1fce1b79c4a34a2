use chrono::Local;
use log::warn;
use std::fs;
use std::io;
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use thiserror::Error;

use crate::llm::chat::{ ChatClient, CompletionError };
use crate::models::chat::ChatMessage;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("session serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What `load` did to the in-memory log. A missing or unparseable file is not
/// an error; the log simply starts fresh and the loop reports it.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(usize),
    FileMissing,
    InvalidJson(serde_json::Error),
}

/// Holds the ordered conversation log and drives it through the completion
/// client. The log is append-only during a live chat; `load` is the only
/// operation that replaces it wholesale.
pub struct ChatSession {
    client: Arc<dyn ChatClient>,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            client,
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append `text` as a user turn, run a completion over the whole log, and
    /// append the reply as an assistant turn. On any failure the user entry is
    /// kept so the turn is not lost; the caller reports the error and the
    /// session stays usable. `text` is expected to be non-empty after
    /// trimming; command lines and blank input are filtered by the caller.
    pub async fn submit(&mut self, text: &str) -> Result<String, CompletionError> {
        self.messages.push(ChatMessage::user(text));
        let reply = self.client.complete(&self.messages).await?;
        if reply.trim().is_empty() {
            return Err(
                CompletionError::MalformedResponse("reply carried no content".to_string())
            );
        }
        self.messages.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    /// Write the log as pretty-printed JSON to `path`, or to a timestamped
    /// file in the working directory when no path is given. Overwrites an
    /// existing file.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, SessionError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(default_session_filename()),
        };
        let json = serde_json::to_string_pretty(&self.messages)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Replace the log with the contents of `path`. A missing file or invalid
    /// JSON leaves the session with an empty log rather than failing; only
    /// other read errors (e.g. permissions) surface as `SessionError`.
    pub fn load(&mut self, path: &Path) -> Result<LoadOutcome, SessionError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.messages.clear();
                return Ok(LoadOutcome::FileMissing);
            }
            Err(e) => {
                return Err(SessionError::Io(e));
            }
        };

        match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
            Ok(messages) => {
                let count = messages.len();
                self.messages = messages;
                Ok(LoadOutcome::Loaded(count))
            }
            Err(e) => {
                warn!("discarding unparseable session file {}: {}", path.display(), e);
                self.messages.clear();
                Ok(LoadOutcome::InvalidJson(e))
            }
        }
    }
}

fn default_session_filename() -> String {
    format!("chat_history_{}.json", Local::now().format("%Y%m%d_%H%M%S"))
}
