//! In-process runners for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Script, ScriptRunner};
use crate::error::ScriptError;

/// Records every script and answers with a canned reply.
pub struct RecordingRunner {
    reply: Result<String, String>,
    scripts: Mutex<Vec<Script>>,
}

impl RecordingRunner {
    /// Succeeds with `output` for every script.
    pub fn replying(output: &str) -> Self {
        Self {
            reply: Ok(output.to_string()),
            scripts: Mutex::new(Vec::new()),
        }
    }

    /// Fails every script with a non-zero exit carrying `stderr`.
    pub fn failing(stderr: &str) -> Self {
        Self {
            reply: Err(stderr.to_string()),
            scripts: Mutex::new(Vec::new()),
        }
    }

    /// Returns the source of every script run so far.
    pub fn sources(&self) -> Vec<String> {
        self.scripts
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.source().to_string())
            .collect()
    }
}

#[async_trait]
impl ScriptRunner for RecordingRunner {
    async fn run(&self, script: &Script) -> Result<String, ScriptError> {
        self.scripts.lock().unwrap().push(script.clone());
        match &self.reply {
            Ok(output) => Ok(output.clone()),
            Err(stderr) => Err(ScriptError::NonZeroExit {
                code: Some(1),
                stderr: stderr.clone(),
            }),
        }
    }
}
