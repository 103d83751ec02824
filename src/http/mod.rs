//! # Módulo HTTP
//!
//! Este módulo implementa el protocolo HTTP/1.1 desde cero, sin usar
//! librerías de alto nivel. Incluye:
//!
//! - Modelo y parsing del bloque de headers de un request
//! - Construcción de responses HTTP
//! - Manejo de status codes
//!
//! ## Alcance del protocolo
//!
//! El motor soporta el subconjunto de HTTP/1.1 que sirve una conexión por
//! request:
//!
//! - La longitud del body se determina únicamente con `Content-Length`
//! - `Transfer-Encoding` (chunked) se rechaza con 501
//! - Sin keep-alive: toda respuesta cierra la conexión
//!
//! ### Formato de Request
//!
//! ```text
//! POST /echo HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hello
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Length: 13\r\n
//! Content-Type: application/json\r\n
//! Connection: close\r\n
//! \r\n
//! {"ok": true}
//! ```

pub mod request;  // Modelo y parsing de HTTP requests
pub mod response; // Construcción de HTTP responses
pub mod status;   // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
