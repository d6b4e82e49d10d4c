//! The uniform problem envelope returned for any non-success outcome.
//!
//! Every failed request gets the same body shape regardless of which
//! component raised the failure. Errors are converted into responses in one
//! place ([crate::Error]'s `IntoResponse`); the middleware here completes the
//! envelope with the request path, which is not available at conversion time.

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::Request,
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// The media type for problem responses.
pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// The envelope returned to clients for any failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// The HTTP status code, duplicated in the body for client convenience.
    pub status: u16,
    /// A short human-readable summary of the failure kind.
    pub title: String,
    /// A human-readable explanation specific to this failure.
    pub detail: String,
    /// The path of the request that failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

/// Build a problem response for `status`.
///
/// The `instance` field is left unset here; [attach_problem_instance] fills
/// it in from the request URI.
pub fn problem_response(status: StatusCode, title: &str, detail: &str) -> Response {
    let problem = ProblemDetails {
        status: status.as_u16(),
        title: title.to_owned(),
        detail: detail.to_owned(),
        instance: None,
    };

    (
        status,
        [(CONTENT_TYPE, HeaderValue::from_static(PROBLEM_CONTENT_TYPE))],
        Json(problem),
    )
        .into_response()
}

/// Middleware that stamps the request path into the `instance` field of
/// problem responses.
///
/// Responses without the problem media type pass through untouched.
pub async fn attach_problem_instance(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;

    let is_problem = response
        .headers()
        .get(CONTENT_TYPE)
        .is_some_and(|content_type| content_type == PROBLEM_CONTENT_TYPE);
    if !is_problem {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not buffer a problem response body: {error}");
            return problem_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "An unexpected error occurred while processing your request.",
            );
        }
    };

    match serde_json::from_slice::<ProblemDetails>(&bytes) {
        Ok(mut problem) if problem.instance.is_none() => {
            problem.instance = Some(path);
            let body = serde_json::to_vec(&problem).unwrap_or_else(|_| bytes.to_vec());
            // The rebuilt body has a different length than the original.
            parts.headers.remove(CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(body))
        }
        _ => Response::from_parts(parts, Body::from(bytes)),
    }
}
