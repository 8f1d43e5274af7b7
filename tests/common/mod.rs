//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature};
use serde_json::json;
use wiremock::ResponseTemplate;

use ez_commit::config::{Config, ConfigStore};
use ez_commit::error::{EditorError, UiError};
use ez_commit::ui::Prompter;

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a committer identity.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config
                .set_str("user.name", "Test User")
                .expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file in the working tree.
    pub fn write(&self, name: &str, content: &str) {
        std::fs::write(self.dir.path().join(name), content).expect("Failed to write test file");
    }

    /// Add a file to the index.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write, stage and commit a file. Returns the commit OID.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> Oid {
        self.write(name, content);
        self.stage(name);

        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    pub fn head_id(&self) -> Option<Oid> {
        self.repo.head().ok().and_then(|h| h.target())
    }

    pub fn head_message(&self) -> Option<String> {
        self.repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .and_then(|c| c.message().map(str::to_string))
    }
}

/// A config store in a temp dir holding `api_key`.
pub fn config_store(dir: &tempfile::TempDir, api_key: &str) -> ConfigStore {
    let store = ConfigStore::new(dir.path().join("ez-commit").join("config.toml"));
    let mut config = Config::default();
    config.generator.api_key = api_key.to_string();
    store.save(&config).expect("Failed to save config");
    store
}

/// A successful chat-completions response carrying `content`.
pub fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    }))
}

/// An OpenAI-style error response.
pub fn chat_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": { "message": message, "type": "invalid_request_error" }
    }))
}

/// A [`Prompter`] that replays scripted input and records output.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub keys: VecDeque<char>,
    pub feedback: VecDeque<String>,
    pub confirms: VecDeque<bool>,
    pub edits: VecDeque<String>,
    pub opened_files: Vec<PathBuf>,
    pub file_edit: Option<String>,
    pub shown: Vec<(String, String)>,
    pub infos: Vec<String>,
    pub successes: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ScriptedPrompter {
    pub fn with_keys(keys: &str) -> Self {
        Self {
            keys: keys.chars().collect(),
            ..Default::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn show_message(&mut self, title: &str, message: &str) -> Result<(), UiError> {
        self.shown.push((title.to_string(), message.to_string()));
        Ok(())
    }

    fn show_actions(&mut self) -> Result<(), UiError> {
        Ok(())
    }

    fn read_key(&mut self) -> Result<char, UiError> {
        self.keys.pop_front().ok_or(UiError::Aborted)
    }

    fn read_feedback(&mut self, _current: &str) -> Result<String, UiError> {
        self.feedback.pop_front().ok_or(UiError::Aborted)
    }

    fn confirm(&mut self, _prompt: &str) -> Result<bool, UiError> {
        self.confirms.pop_front().ok_or(UiError::Aborted)
    }

    fn edit_text(&mut self, _initial: &str) -> Result<String, EditorError> {
        self.edits
            .pop_front()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| EditorError::NotFound("scripted".to_string()))
    }

    /// Replaces the file with `file_edit` when set, like a user saving.
    fn edit_file(&mut self, path: &Path) -> Result<(), EditorError> {
        self.opened_files.push(path.to_path_buf());
        if let Some(content) = &self.file_edit {
            std::fs::write(path, content).map_err(EditorError::ScratchFile)?;
        }
        Ok(())
    }

    fn info(&mut self, message: &str) {
        self.infos.push(message.to_string());
    }

    fn success(&mut self, message: &str) {
        self.successes.push(message.to_string());
    }

    fn warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}
