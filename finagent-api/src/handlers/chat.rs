use crate::models::{ChatRequest, ChatResponse, ErrorResponse};
use actix_web::{post, web, HttpResponse, Responder};
use finagent_agent::stock_analysis::StockAnalysisAgent;
use finagent_agent::storage::{AgentStorage, InMemoryStorage, StorageError};
use finagent_agent::types::{Session, SessionStatus};
use finagent_agent::Agent;
use finagent_llm::client::LlmClient;
use finagent_tools::ToolExecutor;
use std::sync::Arc;
use tracing::{error, info, warn};

#[post("/chat")]
pub async fn chat(
    req: web::Json<ChatRequest>,
    llm_client: web::Data<Arc<dyn LlmClient>>,
    storage: web::Data<Arc<InMemoryStorage>>,
    tool_executor: web::Data<Arc<ToolExecutor>>,
) -> impl Responder {
    let message = req.message.trim();
    if message.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Message must not be empty".to_string(),
        });
    }

    let session_id = match resolve_session(&req, message, &llm_client, storage.get_ref()).await {
        Ok(id) => id,
        Err(response) => return response,
    };

    info!(session_id = %session_id, "Executing chat turn");

    let agent = StockAnalysisAgent::new(
        llm_client.get_ref().clone(),
        storage.get_ref().clone(),
        tool_executor.get_ref().clone(),
    );

    match agent.execute(message, &session_id).await {
        Ok(reply) => {
            info!(session_id = %session_id, "Chat turn completed");
            HttpResponse::Ok().json(ChatResponse {
                session_id,
                reply,
                status: "completed".to_string(),
            })
        }
        Err(e) => {
            error!(error = %e, session_id = %session_id, "Chat turn failed");
            HttpResponse::BadGateway().json(ErrorResponse {
                error: format!("Assistant failed to answer: {}", e),
            })
        }
    }
}

/// Create a new session or resume an existing one.
///
/// Resuming goes through `begin_turn`, which checks and claims the session
/// as one storage operation. A session already running another turn is
/// rejected with 409; two concurrent turns would interleave their messages.
async fn resolve_session(
    req: &ChatRequest,
    message: &str,
    llm_client: &Arc<dyn LlmClient>,
    storage: &Arc<InMemoryStorage>,
) -> Result<String, HttpResponse> {
    if let Some(session_id) = &req.session_id {
        return match storage.begin_turn(session_id).await {
            Ok(true) => Ok(session_id.clone()),
            Ok(false) => {
                warn!(session_id = %session_id, "Session is already processing a turn");
                Err(HttpResponse::Conflict().json(ErrorResponse {
                    error: format!("Session {} is already processing a message", session_id),
                }))
            }
            Err(StorageError::NotFound(_)) => {
                warn!(session_id = %session_id, "Session not found");
                Err(HttpResponse::NotFound().json(ErrorResponse {
                    error: format!("Session {} not found", session_id),
                }))
            }
            Err(e) => {
                error!(error = %e, session_id = %session_id, "Failed to resume session");
                Err(HttpResponse::InternalServerError().json(ErrorResponse {
                    error: format!("Failed to resume session: {}", e),
                }))
            }
        };
    }

    let session = Session {
        id: None,
        agent_name: "stock_analysis".to_string(),
        provider: llm_client.provider_name().to_string(),
        model: llm_client.model_name().to_string(),
        system_prompt: None,
        user_prompt: message.to_string(),
        status: SessionStatus::Running,
        started_at: chrono::Utc::now().timestamp(),
        ended_at: None,
        result: None,
        error: None,
    };

    storage.create_session(session).await.map_err(|e| {
        error!(error = %e, "Failed to create session");
        HttpResponse::InternalServerError().json(ErrorResponse {
            error: format!("Failed to create session: {}", e),
        })
    })
}
