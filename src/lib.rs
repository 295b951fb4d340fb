pub mod config;
pub mod error;
pub mod evaluation;
pub mod http;
pub mod scenario;
pub mod session;
pub mod transcript;
pub mod transport;

pub use config::Config;
pub use error::{EvaluationError, SessionError};
pub use evaluation::{EvaluationResult, Evaluator, OpenAiEvaluator};
pub use http::{create_router, AppState};
pub use scenario::ScenarioConfig;
pub use session::{ConversationSession, Phase, SessionController, SessionHandle, SessionSummary};
pub use transcript::{Speaker, Transcript, Utterance};
pub use transport::{ConversationTransport, InboundEvent, NatsTransport, TransportEvent};
