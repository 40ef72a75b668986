use crate::core::{app_log::AppLog, relay::Relay};
use crate::models::{RelayRequest, RelayResponse};
use serde_json::json;
use tauri::State;

#[tauri::command]
pub async fn relay_request(
    relay: State<'_, Relay>,
    log: State<'_, AppLog>,
    request: RelayRequest,
) -> Result<RelayResponse, String> {
    let url = request.url.clone();
    let method = request.method.clone();
    let response = relay.handle(request).await;

    if response.status >= 400 {
        let data = Some(json!({
            "method": method,
            "url": url,
            "status": response.status,
            "error": response.body.get("error"),
        }));
        let _ = if response.status >= 500 {
            log.error("relay", "request_failed", data)
        } else {
            log.warn("relay", "request_rejected", data)
        };
    }
    Ok(response)
}
