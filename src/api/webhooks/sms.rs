//! Inbound SMS webhook handler
//!
//! Receives form-encoded messages from Twilio and answers synchronously with
//! a messaging-response document. Failures are logged and answered with an
//! empty response so Twilio never retries or texts an error back.

use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::api::ApiState;
use crate::channels::{InboundSms, MessagingResponse};

const UNKNOWN_SENDER: &str = "unknown";

/// Handle an inbound SMS
pub async fn handle_sms(
    State(state): State<Arc<ApiState>>,
    Form(sms): Form<InboundSms>,
) -> impl IntoResponse {
    tracing::debug!(
        from = %sms.from,
        to = ?sms.to,
        message_sid = ?sms.message_sid,
        "received SMS"
    );

    if sms.from.trim().is_empty() {
        tracing::warn!("SMS webhook without sender");
        state.replies.notify_only(UNKNOWN_SENDER, &sms.body).await;
        return xml(&MessagingResponse::empty());
    }

    let response = match state.replies.handle(&sms.from, &sms.body).await {
        Ok(Some(reply)) => MessagingResponse::message(reply.body),
        Ok(None) => MessagingResponse::empty(),
        Err(e) => {
            tracing::error!(from = %sms.from, error = %e, "failed to answer SMS");
            MessagingResponse::empty()
        }
    };

    xml(&response)
}

fn xml(response: &MessagingResponse) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        response.to_xml(),
    )
}
