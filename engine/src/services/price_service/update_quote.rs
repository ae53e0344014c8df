// Handler for the UpdateQuote RPC
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Response, Status};

use super::helpers::{key_from, quote_response};
use crate::error::EngineError;
use crate::services::{QuoteResponse, QuoteUpdateRequest};
use crate::session::{QuoteSession, SessionStore};

fn apply_action(session: &mut QuoteSession, req_payload: &QuoteUpdateRequest) -> Result<String, EngineError> {
    let action = req_payload.action.trim().to_uppercase();
    let needs_item = matches!(action.as_str(), "ADD" | "SET" | "REMOVE" | "HIDE");
    if needs_item && req_payload.item.trim().is_empty() {
        return Err(EngineError::InvalidRequest(format!("Item is required for {}", action)));
    }
    let key = key_from(&req_payload.item, &req_payload.spec);

    match action.as_str() {
        "ADD" => {
            // proto3 sends 0 for an unset quantity; treat it as a single unit.
            let quantity = req_payload.quantity.max(1);
            let line = session.add(key, quantity)?;
            Ok(format!("Added {} x{} (now {})", line.key, quantity, line.quantity))
        }
        "SET" => {
            session.set_quantity(&key, req_payload.quantity)?;
            Ok(format!("Set {} to {}", key, req_payload.quantity))
        }
        "REMOVE" => {
            if session.remove(&key) {
                Ok(format!("Removed {}", key))
            } else {
                Err(EngineError::NotFound(format!("{} is not in the quote list", key)))
            }
        }
        "CLEAR" => {
            session.clear();
            Ok("Cleared the quote list".to_string())
        }
        "HIDE" => {
            if session.hide(key.clone()) {
                Ok(format!("Hid {}", key))
            } else {
                Ok(format!("{} was already hidden", key))
            }
        }
        "UNHIDE" if req_payload.item.trim().is_empty() => {
            let count = session.hidden_count();
            session.clear_hidden();
            Ok(format!("Restored {} hidden rows", count))
        }
        "UNHIDE" => {
            if session.unhide(&key) {
                Ok(format!("Restored {}", key))
            } else {
                Err(EngineError::NotFound(format!("{} is not hidden", key)))
            }
        }
        _ => Err(EngineError::InvalidRequest(format!(
            "Unsupported action '{}'. Use ADD, SET, REMOVE, CLEAR, HIDE or UNHIDE.",
            req_payload.action
        ))),
    }
}

pub async fn handle_update_quote(
    req_payload: QuoteUpdateRequest,
    sessions: Arc<RwLock<SessionStore>>,
) -> Result<Response<QuoteResponse>, Status> {
    let mut store = sessions.write().await;
    // An unknown session is a hard error; everything else is reported in the response.
    let session = store.get_mut(&req_payload.session_id)?;

    match apply_action(session, &req_payload) {
        Ok(message) => {
            tracing::info!(session_id = %req_payload.session_id, action = %req_payload.action, message = %message, "Quote updated (handler)");
            Ok(Response::new(quote_response(session, true, message)))
        }
        Err(e) => {
            tracing::warn!(session_id = %req_payload.session_id, action = %req_payload.action, failure_reason = %e, "Quote update rejected (handler)");
            Ok(Response::new(quote_response(session, false, e.to_string())))
        }
    }
}
