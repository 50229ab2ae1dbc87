use async_trait::async_trait;
use farman::agent::{Agent, StaticContextItem};
use farman::commands::{
    ArgumentIssue, Availability, CommandCall, CommandDescriptor, CommandError, CommandExecutor,
    CommandHandler, CommandOutcome, CommandRegistry, CommandResult, HandlerContext, ParameterSpec,
    ValidatedArguments, default_registry,
};
use farman::input::ScriptedInput;
use farman::session::{Session, SessionOutcome};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountingHandler {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CommandHandler for CountingHandler {
    async fn execute(
        &self,
        _ctx: HandlerContext<'_>,
        _args: &ValidatedArguments,
    ) -> CommandResult<CommandOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CommandOutcome::Success("counted".to_string()))
    }
}

fn executor_with_answers(answers: &[&str]) -> (CommandExecutor, Arc<ScriptedInput>) {
    let input = Arc::new(ScriptedInput::new(answers.iter().copied()));
    let registry = default_registry(input.clone()).unwrap();
    (CommandExecutor::new(Arc::new(registry)), input)
}

#[tokio::test]
async fn test_close_context_item_unavailable_without_context() {
    let (executor, _) = executor_with_answers(&[]);
    let mut agent = Agent::new("Scout");

    let result = executor
        .execute("close_context_item", &json!({"index": 1}), &mut agent)
        .await;

    assert!(matches!(
        result,
        Err(CommandError::CommandUnavailable { ref command, .. }) if command == "close_context_item"
    ));
}

#[tokio::test]
async fn test_close_second_of_three_then_close_second_again() {
    let (executor, _) = executor_with_answers(&[]);
    let mut agent = Agent::new("Scout");
    for name in ["first", "second", "third"] {
        agent
            .ensure_context()
            .add(Box::new(StaticContextItem::new(name, "")));
    }

    let outcome = executor
        .execute("close_context_item", &json!({"index": 2}), &mut agent)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::Success("Context item 2 closed ✅".to_string())
    );

    let remaining: Vec<String> = agent
        .context()
        .unwrap()
        .iter()
        .map(|(_, item)| item.description())
        .collect();
    assert_eq!(remaining, vec!["first", "third"]);

    executor
        .execute("close_context_item", &json!({"index": 2}), &mut agent)
        .await
        .unwrap();
    let context = agent.context().unwrap();
    assert_eq!(context.len(), 1);
    assert_eq!(context.get(1).unwrap().description(), "first");
}

#[tokio::test]
async fn test_close_out_of_range_indices() {
    let (executor, _) = executor_with_answers(&[]);
    let mut agent = Agent::new("Scout");
    agent
        .ensure_context()
        .add(Box::new(StaticContextItem::new("only", "")));

    for index in [0, 2] {
        let err = executor
            .execute("close_context_item", &json!({"index": index}), &mut agent)
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                CommandError::InvalidArgument {
                    issue: ArgumentIssue::IndexOutOfRange { len: 1, .. },
                    ..
                }
            ),
            "index {} gave {}",
            index,
            err
        );
        assert!(err.to_string().contains("valid: 1..=1"));
    }
    assert_eq!(agent.context().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ask_user_returns_quoted_answer() {
    let (executor, input) = executor_with_answers(&["yes"]);
    let mut agent = Agent::new("Scout");

    let outcome = executor
        .execute("ask_user", &json!({"question": "Continue?"}), &mut agent)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CommandOutcome::Success("The user's answer: 'yes'".to_string())
    );
    assert_eq!(input.prompts(), vec!["Scout asks: 'Continue?': ".to_string()]);
}

#[tokio::test]
async fn test_ask_user_missing_question_never_prompts() {
    let (executor, input) = executor_with_answers(&["yes"]);
    let mut agent = Agent::new("Scout");

    let err = executor
        .execute("ask_user", &json!({}), &mut agent)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CommandError::InvalidArgument {
            issue: ArgumentIssue::Missing,
            ..
        }
    ));
    assert!(input.prompts().is_empty());
}

#[tokio::test]
async fn test_goals_accomplished_observed_once() {
    let (executor, _) = executor_with_answers(&[]);
    let mut session = Session::new(executor, Agent::new("Scout"));

    let calls = vec![
        CommandCall::new("1", "goals_accomplished", json!({"reason": "done"})),
        CommandCall::new("2", "goals_accomplished", json!({"reason": "again"})),
    ];
    let outcome = session.run(calls).await;

    assert_eq!(
        outcome,
        SessionOutcome::Completed {
            reason: "done".to_string(),
            executed: 1
        }
    );
}

#[tokio::test]
async fn test_unavailable_and_invalid_calls_never_reach_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = CommandRegistry::new();
    registry
        .register(
            CommandDescriptor::new(
                "count",
                "Counts invocations",
                Arc::new(CountingHandler {
                    calls: calls.clone(),
                }),
            )
            .with_parameter("label", ParameterSpec::string("Label").required())
            .with_availability(Availability::context_present()),
        )
        .unwrap();
    let executor = CommandExecutor::new(Arc::new(registry));
    let mut agent = Agent::new("Scout");

    let unavailable = executor
        .execute("count", &json!({"label": "x"}), &mut agent)
        .await;
    assert!(matches!(
        unavailable,
        Err(CommandError::CommandUnavailable { .. })
    ));

    agent.ensure_context();
    let missing = executor.execute("count", &json!({}), &mut agent).await;
    assert!(missing.is_err_and(|e| e.is_invalid_argument()));

    assert_eq!(calls.load(Ordering::SeqCst), 0);

    executor
        .execute("count", &json!({"label": "x"}), &mut agent)
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_duplicate_registration_rejected() {
    let mut registry = default_registry(Arc::new(ScriptedInput::default())).unwrap();
    let before = registry.len();

    let err = registry
        .register(farman::commands::system::goals_accomplished())
        .unwrap_err();

    assert!(matches!(err, CommandError::DuplicateCommand { ref command } if command == "goals_accomplished"));
    assert_eq!(registry.len(), before);
}
