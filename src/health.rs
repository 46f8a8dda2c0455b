//! Health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the article store answer? Failure → pulled from load-balancer. |

use http::StatusCode;
use tracing::warn;

use crate::app::AppState;
use crate::{Request, Response};

/// Always `200 OK` with body `"ok"`. If the process can respond to HTTP at
/// all, it is alive.
pub async fn liveness(_req: Request, _state: AppState) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"` once the article store answers a ping,
/// `503` otherwise.
pub async fn readiness(_req: Request, state: AppState) -> Response {
    match state.store.ping().await {
        Ok(()) => Response::text("ready"),
        Err(e) => {
            warn!(error = %e, "readiness check failed");
            Response::builder()
                .status(StatusCode::SERVICE_UNAVAILABLE)
                .text("not ready")
        }
    }
}
