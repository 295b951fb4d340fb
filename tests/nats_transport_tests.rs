// Integration tests for the NATS transport without a running server
//
// Nothing listens on the configured port, so every connect attempt is refused.

mod common;

use anyhow::Result;
use common::{agent_config, sample_evaluation, StubEvaluator};
use conversation_coach::scenario::ScenarioConfig;
use conversation_coach::session::{
    ConversationSession, Phase, SessionController, CONNECT_ERROR_TEXT,
};
use conversation_coach::transcript::Speaker;
use conversation_coach::transport::{event_channel, ConversationTransport, NatsTransport};
use std::sync::Arc;
use std::time::Duration;

const UNREACHABLE_URL: &str = "nats://127.0.0.1:1";

#[tokio::test]
async fn test_unreachable_server_surfaces_as_connect_error() -> Result<()> {
    let (tx, mut rx) = event_channel();
    let transport = Arc::new(NatsTransport::new(UNREACHABLE_URL, tx));
    let controller = SessionController::new(
        transport,
        Arc::new(StubEvaluator::returning(sample_evaluation())),
        agent_config(),
    );

    let mut session = ConversationSession::with_scenario(ScenarioConfig::default());

    // A second attempt connects again rather than reusing the failure
    for _ in 0..2 {
        tokio::time::timeout(Duration::from_secs(10), controller.start_session(&mut session))
            .await??;

        assert_eq!(session.phase(), Phase::Setup);
        let utterances = session.transcript().utterances();
        assert_eq!(utterances.len(), 1);
        assert_eq!(utterances[0].speaker(), Speaker::Agent);
        assert_eq!(utterances[0].text(), CONNECT_ERROR_TEXT);
    }

    assert!(rx.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn test_calls_without_session_do_not_connect() -> Result<()> {
    let (tx, _rx) = event_channel();
    let transport = NatsTransport::new(UNREACHABLE_URL, tx);

    transport.end_session().await?;
    let err = transport.send_user_message("hello").await.unwrap_err();
    assert!(err.to_string().contains("No active conversation session"));

    Ok(())
}
