//! End-to-end tests for the approval loop: a real git repository, a mock
//! chat-completions server and scripted terminal input.

mod common;

use common::{ScriptedPrompter, TestRepo, chat_error, chat_reply, config_store};
use ez_commit::commit::{ApprovalLoop, Outcome};
use ez_commit::config::{API_KEY_ENV_VAR, ConfigStore};
use ez_commit::error::{AppError, ExitStatus, FormatError, GenerationError, GitError};
use ez_commit::git::GitRepository;
use ez_commit::llm::{MessageGenerator, OpenAiClient};
use serde_json::Value;
use serial_test::serial;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

/// Run `test` on a fresh runtime with `OPENAI_API_KEY` unset.
fn run<F, Fut>(test: F)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    temp_env::with_var_unset(API_KEY_ENV_VAR, || {
        tokio::runtime::Runtime::new()
            .expect("Failed to start runtime")
            .block_on(test())
    });
}

fn generator(server: &MockServer, store: ConfigStore) -> MessageGenerator<OpenAiClient> {
    let client = OpenAiClient::with_base_url(format!("{}/v1", server.uri()))
        .expect("Failed to build client");
    MessageGenerator::new(client, store)
}

async fn session(
    repo: &TestRepo,
    generator: &MessageGenerator<OpenAiClient>,
    prompter: &mut ScriptedPrompter,
    preview: bool,
) -> Result<Outcome, AppError> {
    let gateway = GitRepository::discover(repo.path()).expect("Failed to open repo");
    ApprovalLoop::new(&gateway, generator, prompter, preview)
        .run()
        .await
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.body_json::<Value>().expect("request body is JSON"))
        .collect()
}

#[test]
#[serial]
fn test_no_changes_fails_as_version_control_error() {
    run(|| async {
        let repo = TestRepo::new();
        repo.commit_file("README.md", "hello\n", "Initial commit");
        let config_dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("unused"))
            .expect(0)
            .mount(&server)
            .await;

        let generator = generator(&server, config_store(&config_dir, "sk-test"));
        let mut prompter = ScriptedPrompter::default();
        let err = session(&repo, &generator, &mut prompter, false)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Git(GitError::NoChanges)));
        assert_eq!(err.exit_status(), ExitStatus::VersionControl);
        assert_eq!(err.exit_status().code(), 2);
    });
}

#[test]
#[serial]
fn test_save_commits_generated_message() {
    run(|| async {
        let repo = TestRepo::new();
        repo.commit_file("README.md", "hello\n", "Initial commit");
        repo.write("README.md", "hello\nworld\n");
        let config_dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(chat_reply("Add world to README\n"))
            .expect(1)
            .mount(&server)
            .await;

        let generator = generator(&server, config_store(&config_dir, "sk-test"));
        let mut prompter = ScriptedPrompter::with_keys("s");
        let outcome = session(&repo, &generator, &mut prompter, false)
            .await
            .unwrap();

        let Outcome::Committed { id, message } = outcome else {
            panic!("Expected a commit, got: {:?}", outcome);
        };
        assert_eq!(message, "Add world to README");
        assert_eq!(repo.head_id().unwrap().to_string(), id);
        assert_eq!(repo.head_message().unwrap(), "Add world to README");

        let bodies = request_bodies(&server).await;
        let user_prompt = bodies[0]["messages"][1]["content"].as_str().unwrap();
        assert!(user_prompt.starts_with("Generate a commit message for the following git diff:"));
        assert!(user_prompt.contains("+world"));
    });
}

#[test]
#[serial]
fn test_cancel_leaves_repository_untouched() {
    run(|| async {
        let repo = TestRepo::new();
        let initial = repo.commit_file("README.md", "hello\n", "Initial commit");
        repo.write("README.md", "changed\n");
        let config_dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("Change README"))
            .mount(&server)
            .await;

        let generator = generator(&server, config_store(&config_dir, "sk-test"));
        let mut prompter = ScriptedPrompter::with_keys("c");
        let err = session(&repo, &generator, &mut prompter, false)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Cancelled));
        assert_eq!(err.exit_status().code(), 1);
        assert_eq!(repo.head_id(), Some(initial));
    });
}

#[test]
#[serial]
fn test_edit_to_long_summary_aborts_with_format_error() {
    run(|| async {
        let repo = TestRepo::new();
        let initial = repo.commit_file("README.md", "hello\n", "Initial commit");
        repo.write("README.md", "changed\n");
        let config_dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("Change README"))
            .mount(&server)
            .await;

        let generator = generator(&server, config_store(&config_dir, "sk-test"));
        let mut prompter = ScriptedPrompter::with_keys("es");
        prompter.edits.push_back("x".repeat(51));
        let err = session(&repo, &generator, &mut prompter, false)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Format(FormatError::SummaryTooLong { len: 51, limit: 50 })
        ));
        assert_eq!(err.exit_status(), ExitStatus::Format);
        assert_eq!(repo.head_id(), Some(initial));
    });
}

#[test]
#[serial]
fn test_feedback_round_sends_history_and_commits_result() {
    run(|| async {
        let repo = TestRepo::new();
        repo.commit_file("lib.rs", "fn a() {}\n", "Initial commit");
        repo.write("lib.rs", "fn a() {}\nfn b() {}\n");
        let config_dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("Add function"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("Add b() helper"))
            .mount(&server)
            .await;

        let generator = generator(&server, config_store(&config_dir, "sk-test"));
        let mut prompter = ScriptedPrompter::with_keys("is");
        prompter.feedback.push_back("name the function".to_string());
        let outcome = session(&repo, &generator, &mut prompter, false)
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Committed { .. }));
        assert_eq!(repo.head_message().unwrap(), "Add b() helper");

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies.len(), 2);
        assert_eq!(
            bodies[0]["messages"][1], bodies[1]["messages"][1],
            "regeneration must reuse the original diff"
        );
        let messages = bodies[1]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[2]["content"], "Add function");
        assert_eq!(messages[3]["role"], "user");
        assert_eq!(messages[3]["content"], "Suggested changes: name the function");
    });
}

#[test]
#[serial]
fn test_failed_feedback_keeps_message_when_confirmed() {
    run(|| async {
        let repo = TestRepo::new();
        repo.commit_file("lib.rs", "fn a() {}\n", "Initial commit");
        repo.write("lib.rs", "fn a() {}\nfn b() {}\n");
        let config_dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("Add function"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(chat_error(429, "Rate limit reached"))
            .mount(&server)
            .await;

        let generator = generator(&server, config_store(&config_dir, "sk-test"));
        let mut prompter = ScriptedPrompter::with_keys("is");
        prompter.feedback.push_back("shorter".to_string());
        prompter.confirms.push_back(true);

        session(&repo, &generator, &mut prompter, false)
            .await
            .unwrap();

        assert_eq!(repo.head_message().unwrap(), "Add function");
        assert_eq!(prompter.errors.len(), 1);
        assert!(prompter.errors[0].contains("Rate limit reached"));
    });
}

#[test]
#[serial]
fn test_preview_does_not_commit() {
    run(|| async {
        let repo = TestRepo::new();
        let initial = repo.commit_file("README.md", "hello\n", "Initial commit");
        repo.write("README.md", "changed\n");
        let config_dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("Change README"))
            .mount(&server)
            .await;

        let generator = generator(&server, config_store(&config_dir, "sk-test"));
        let mut prompter = ScriptedPrompter::default();
        let outcome = session(&repo, &generator, &mut prompter, true)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Previewed {
                message: "Change README".to_string()
            }
        );
        assert_eq!(prompter.shown.len(), 1);
        assert_eq!(repo.head_id(), Some(initial));
    });
}

#[test]
#[serial]
fn test_missing_api_key_is_generation_error() {
    run(|| async {
        let repo = TestRepo::new();
        repo.commit_file("README.md", "hello\n", "Initial commit");
        repo.write("README.md", "changed\n");
        let config_dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("unused"))
            .expect(0)
            .mount(&server)
            .await;

        let generator = generator(&server, config_store(&config_dir, ""));
        let mut prompter = ScriptedPrompter::default();
        let err = session(&repo, &generator, &mut prompter, false)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Generation(GenerationError::MissingCredentials)
        ));
        assert_eq!(err.exit_status().code(), 3);
    });
}

#[test]
#[serial]
fn test_first_commit_in_empty_repository() {
    run(|| async {
        let repo = TestRepo::new();
        repo.write("main.rs", "fn main() {}\n");
        repo.stage("main.rs");
        let config_dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("Add main entry point"))
            .mount(&server)
            .await;

        let generator = generator(&server, config_store(&config_dir, "sk-test"));
        let mut prompter = ScriptedPrompter::with_keys("S");
        session(&repo, &generator, &mut prompter, false)
            .await
            .unwrap();

        assert_eq!(repo.head_message().unwrap(), "Add main entry point");
    });
}

#[test]
fn test_outside_repository_is_version_control_error() {
    let dir = tempfile::tempdir().unwrap();
    if git2::Repository::discover(dir.path()).is_ok() {
        return;
    }

    let err = AppError::from(GitRepository::discover(dir.path()).err().unwrap());
    assert_eq!(err.exit_status(), ExitStatus::VersionControl);
}
