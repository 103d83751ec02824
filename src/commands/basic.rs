//! # Handlers Básicos
//! src/commands/basic.rs
//!
//! Cada handler recibe el request parseado y muta la respuesta in place.

use crate::http::{Request, Response, StatusCode};
use crate::metrics::MetricsCollector;
use serde::Deserialize;
use serde_json::json;

/// Payload esperado por `greet_handler`
#[derive(Debug, Deserialize)]
struct GreetRequest {
    name: String,
}

/// `GET /` y `GET /hello`: saludo con el path recibido
pub fn hello_handler(req: &Request, res: &mut Response) {
    res.add_header("X-Custom-Header", "http-engine");
    res.set_body(&format!("Hello, API World! : {}", req.path()));
}

/// `GET /status`: estado del servidor más el snapshot de métricas
///
/// Factory que captura el collector; el closure resultante se registra
/// como handler (la tabla de rutas acepta handlers con estado).
pub fn status_handler(
    metrics: MetricsCollector,
) -> impl Fn(&Request, &mut Response) + Send + Sync {
    move |_req, res| {
        let body = json!({
            "status": "running",
            "metrics": metrics.snapshot(),
        });

        res.add_header("Content-Type", "application/json");
        res.set_body(&body.to_string());
    }
}

/// `POST /echo`: devuelve el body tal cual llegó
pub fn echo_handler(req: &Request, res: &mut Response) {
    if let Some(content_type) = req.header("content-type") {
        res.add_header("Content-Type", content_type);
    }

    res.set_body_bytes(req.body().to_vec());
}

/// `POST /something`: saluda al `name` de un body JSON
pub fn greet_handler(req: &Request, res: &mut Response) {
    match serde_json::from_slice::<GreetRequest>(req.body()) {
        Ok(payload) => {
            res.set_body(&format!("JSON parsed successfully: hello {}", payload.name));
        }
        Err(_) => {
            res.set_status(StatusCode::BadRequest);
            res.set_body("Invalid Json format");
        }
    }
}
