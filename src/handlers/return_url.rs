//! Shopper return endpoint.
//!
//! After checkout the gateway redirects the shopper back here with a status
//! code and the token. A validated status in the open range (1, 400) sends
//! the shopper to the order-received page; anything else goes back to the
//! cart with an error notice appended as a query parameter.

use axum::{extract::State, response::Redirect};
use serde::Deserialize;

use crate::db::AppState;

#[derive(Debug, Deserialize)]
pub struct ReturnParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub mobbex_order_id: Option<String>,
    #[serde(default)]
    pub mobbex_token: Option<String>,
}

fn cart_redirect(state: &AppState, error: &str) -> Redirect {
    let separator = if state.config.cart_url.contains('?') { '&' } else { '?' };
    let url = format!(
        "{}{}mobbex_error={}",
        state.config.cart_url,
        separator,
        encode_notice(error)
    );
    Redirect::temporary(&url)
}

fn encode_notice(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

pub async fn mobbex_return(
    State(state): State<AppState>,
    axum::extract::Query(params): axum::extract::Query<ReturnParams>,
) -> Redirect {
    let (status, order_id, token) = match (
        params.status.as_deref(),
        params.mobbex_order_id.as_deref(),
        params.mobbex_token.as_deref(),
    ) {
        (Some(s), Some(id), Some(t)) if !s.is_empty() && !id.is_empty() && !t.is_empty() => {
            (s, id, t)
        }
        _ => {
            return cart_redirect(
                &state,
                "No se pudo validar la transacción. Contacte con el administrador de su sitio",
            )
        }
    };

    if !state.engine.authenticator().validate(token) {
        return cart_redirect(&state, "Token de seguridad inválido.");
    }

    let status: i64 = status.parse().unwrap_or(0);

    // Open range: 1 and 400 are both failures.
    if status > 1 && status < 400 {
        let url = state.config.order_received_url.replace("{order_id}", order_id);
        Redirect::temporary(&url)
    } else {
        cart_redirect(
            &state,
            "Transacción fallida. Reintente con otro método de pago.",
        )
    }
}
