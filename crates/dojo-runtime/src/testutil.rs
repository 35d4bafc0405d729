//! Shared test doubles for the runtime crate.

use std::collections::VecDeque;

use async_trait::async_trait;
use dojo_llm::{GenerateRequest, Generator, GeneratorError};
use parking_lot::Mutex;

/// Generator fake that replays a scripted sequence of outcomes and records
/// every prompt it was asked, in order.
pub(crate) struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, GeneratorError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub(crate) fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful generation.
    pub(crate) fn push_ok(&self, text: &str) {
        self.script.lock().push_back(Ok(text.to_owned()));
    }

    /// Queue a failed generation.
    pub(crate) fn push_err(&self, err: GeneratorError) {
        self.script.lock().push_back(Err(err));
    }

    /// Prompts seen so far.
    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: GenerateRequest) -> Result<String, GeneratorError> {
        self.prompts.lock().push(request.prompt);
        self.script
            .lock()
            .pop_front()
            .expect("script exhausted: unexpected generate call")
    }
}
