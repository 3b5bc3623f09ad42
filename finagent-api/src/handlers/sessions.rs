use crate::models::{
    ErrorResponse, SessionListItem, SessionListResponse, SessionMessage, SessionResponse,
    SessionToolCall,
};
use actix_web::{get, web, HttpResponse, Responder};
use finagent_agent::storage::{AgentStorage, InMemoryStorage};
use std::sync::Arc;
use tracing::{error, info, warn};

#[get("/sessions/{session_id}")]
pub async fn get_session(
    session_id: web::Path<String>,
    storage: web::Data<Arc<InMemoryStorage>>,
) -> impl Responder {
    let id = session_id.into_inner();
    info!(session_id = %id, "Retrieving session");

    let session = match storage.get_session(&id).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            warn!(session_id = %id, "Session not found");
            return HttpResponse::NotFound().json(ErrorResponse {
                error: format!("Session {} not found", id),
            });
        }
        Err(e) => {
            error!(error = %e, session_id = %id, "Failed to retrieve session");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Failed to retrieve session: {}", e),
            });
        }
    };

    let messages = match storage.get_messages(&id).await {
        Ok(messages) => messages,
        Err(e) => {
            error!(error = %e, session_id = %id, "Failed to retrieve messages");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Failed to retrieve messages: {}", e),
            });
        }
    };

    let tool_calls = match storage.get_tool_calls(&id).await {
        Ok(tool_calls) => tool_calls,
        Err(e) => {
            error!(error = %e, session_id = %id, "Failed to retrieve tool calls");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Failed to retrieve tool calls: {}", e),
            });
        }
    };

    let response = SessionResponse {
        id,
        agent_name: session.agent_name,
        provider: session.provider,
        model: session.model,
        user_prompt: session.user_prompt,
        status: session.status.as_str().to_string(),
        result: session.result,
        messages: messages
            .into_iter()
            .map(|m| SessionMessage {
                role: m.role.as_str().to_string(),
                content: m.content,
                created_at: m.created_at,
            })
            .collect(),
        tool_calls: tool_calls
            .into_iter()
            .map(|t| SessionToolCall {
                tool_name: t.tool_name,
                request: t.request,
                response: t.response,
                status: t.status.as_str().to_string(),
                execution_time_ms: t.execution_time_ms,
            })
            .collect(),
    };

    HttpResponse::Ok().json(response)
}

#[get("/sessions")]
pub async fn list_sessions(storage: web::Data<Arc<InMemoryStorage>>) -> impl Responder {
    info!("Retrieving recent sessions");

    let sessions = match storage.list_sessions().await {
        Ok(sessions) => sessions,
        Err(e) => {
            error!(error = %e, "Failed to retrieve sessions");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Failed to retrieve sessions: {}", e),
            });
        }
    };

    let sessions = sessions
        .into_iter()
        .filter_map(|s| {
            s.id.map(|id| SessionListItem {
                id,
                user_prompt: s.user_prompt,
                status: s.status.as_str().to_string(),
                started_at: s.started_at,
            })
        })
        .collect();

    HttpResponse::Ok().json(SessionListResponse { sessions })
}
