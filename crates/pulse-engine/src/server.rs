use std::convert::Infallible;
use std::sync::Arc;

use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::engine::controller::RunController;
use crate::error::EngineError;

/// Body of `POST /start`. `mode` is accepted for compatibility with existing
/// fleet controllers and ignored.
#[derive(Debug, Deserialize, Default)]
pub struct StartRequest {
    #[serde(rename = "targetViews")]
    pub target_views: Option<u64>,
    #[serde(rename = "videoLink")]
    pub video_link: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Route one control request. Infallible: every outcome, including rejected
/// commands, is a structured JSON response.
pub async fn handle_request(
    req: Request<Body>,
    controller: Arc<RunController>,
) -> Result<Response<Body>, Infallible> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::GET, "/") => json_response(
            StatusCode::OK,
            &json!({
                "status": "Pulse engine instance running",
                "message": "Ready to receive commands from main controller",
                "endpoints": ["GET /status", "POST /start", "POST /stop"],
            }),
        ),
        (&Method::GET, "/status") => json_response(StatusCode::OK, &controller.status()),
        (&Method::POST, "/start") => handle_start(req, &controller).await,
        (&Method::POST, "/stop") => {
            controller.stop();
            info!("Stop command accepted");
            json_response(
                StatusCode::OK,
                &json!({ "success": true, "message": "Bot stopped" }),
            )
        }
        _ => json_response(StatusCode::NOT_FOUND, &json!({ "error": "Not Found" })),
    };

    Ok(response)
}

async fn handle_start(req: Request<Body>, controller: &RunController) -> Response<Body> {
    let body = match hyper::body::to_bytes(req.into_body()).await {
        Ok(bytes) => bytes,
        Err(_) => return command_failure("Invalid request body"),
    };

    let request: StartRequest = if body.is_empty() {
        StartRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => value,
            Err(_) => return command_failure("Invalid JSON body"),
        }
    };

    let Some(link) = request.video_link.as_deref() else {
        return command_failure("Video link required");
    };

    match controller.start(request.target_views, link) {
        Ok(ack) => json_response(
            StatusCode::OK,
            &json!({
                "success": true,
                "message": "Bot started successfully!",
                "target": ack.target,
                "videoId": ack.subject_id,
            }),
        ),
        Err(EngineError::InvalidSubject) => command_failure("Invalid video link"),
        Err(e) => command_failure(&e.to_string()),
    }
}

/// Rejected commands answer 200 with `success:false`, matching the contract
/// the fleet controller speaks.
fn command_failure(message: &str) -> Response<Body> {
    json_response(
        StatusCode::OK,
        &json!({ "success": false, "message": message }),
    )
}

fn json_response<T: serde::Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut response = Response::new(Body::from(body));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(e) => {
            let mut response = Response::new(Body::from(format!("encoding error: {}", e)));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}
