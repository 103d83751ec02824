//! # Construcción de Respuestas HTTP
//!
//! Este módulo proporciona una API para construir respuestas HTTP/1.1
//! de forma programática y convertirlas a bytes para enviar al cliente.
//!
//! ## Formato de una respuesta
//!
//! El serializador escribe siempre en este orden fijo:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Length: 12\r\n
//! Content-Type: text/plain\r\n
//! Connection: close\r\n
//! \r\n
//! {"ok": true}
//! ```
//!
//! `Content-Length` se calcula siempre desde el body al serializar; los
//! headers por defecto (`Content-Type`, `Connection`) se registran al
//! construir y el handler puede sobrescribirlos.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use http_engine::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "application/json")
//!     .with_body(r#"{"message": "Hello"}"#);
//!
//! let bytes = response.to_bytes();
//! // Ahora puedes enviar `bytes` por el socket
//! ```

use super::StatusCode;
use std::collections::HashMap;

/// Representa una respuesta HTTP/1.1 completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers HTTP; HashMap para evitar duplicados
    headers: HashMap<String, String>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta con el código de estado especificado
    ///
    /// Arranca con los headers por defecto `Content-Type: text/plain` y
    /// `Connection: close`; el handler puede sobrescribirlos.
    pub fn new(status: StatusCode) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        headers.insert("Connection".to_string(), "close".to_string());

        Self {
            status,
            headers,
            body: Vec::new(),
        }
    }

    /// Agrega un header a la respuesta (builder)
    ///
    /// Si el header ya existe, se sobrescribe.
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_header("Content-Type", "application/json");
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo de la respuesta desde un string (builder)
    pub fn with_body(mut self, body: &str) -> Self {
        self.set_body(body);
        self
    }

    /// Establece el cuerpo de la respuesta desde bytes (builder)
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Cambia el código de estado de una respuesta existente
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Establece el cuerpo desde un string (versión mutable)
    pub fn set_body(&mut self, body: &str) {
        self.body = body.as_bytes().to_vec();
    }

    /// Establece el cuerpo desde bytes (versión mutable)
    pub fn set_body_bytes(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Crea una respuesta JSON exitosa (200 OK)
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::Response;
    ///
    /// let response = Response::json(r#"{"status": "ok"}"#);
    /// ```
    pub fn json(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// Crea una respuesta de error con explicación en texto plano
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::BadRequest, "Invalid Content-Length header");
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(message)
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// Orden fijo: status line, `Content-Length` (calculado del body, nunca
    /// tomado del mapa), headers registrados, línea vacía, body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        let status_line = format!("HTTP/1.1 {}\r\n", self.status);
        result.extend_from_slice(status_line.as_bytes());

        let content_length = format!("Content-Length: {}\r\n", self.body.len());
        result.extend_from_slice(content_length.as_bytes());

        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            let header_line = format!("{}: {}\r\n", name, value);
            result.extend_from_slice(header_line.as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::Ok)
    }
}
