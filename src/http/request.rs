//! # Modelo y Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! El connection handler acumula bytes hasta encontrar el terminador
//! `\r\n\r\n`; este módulo parsea el bloque de headers ya enmarcado.
//!
//! ## Formato de un Request HTTP/1.1
//!
//! ```text
//! POST /echo?debug=true HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Length: 11\r\n
//! \r\n
//! hello world
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD SP PATH SP VERSION`
//! 2. **Headers**: Pares `Name: Value` (uno por línea, keys almacenadas en minúsculas)
//! 3. **Body**: bytes crudos, adjuntados por el connection handler según `Content-Length`

use std::collections::HashMap;
use thiserror::Error;

/// Errores que pueden ocurrir durante el parsing del bloque de headers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Request line sin los 3 tokens METHOD PATH VERSION
    #[error("Malformed request line: {0:?}")]
    InvalidRequestLine(String),

    /// Valor de Content-Length vacío o no numérico
    #[error("Invalid Content-Length header: {0:?}")]
    InvalidContentLength(String),
}

/// Representa un request HTTP/1.1 parseado
///
/// Construido una vez por conexión; el worker que atiende la conexión es
/// su único dueño y lo descarta tras enviar la respuesta.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Método HTTP (ej: "GET", "POST"); el router compara case-sensitive
    method: String,

    /// Path de la petición tal cual llegó, query string incluida
    path: String,

    /// Versión HTTP (ej: "HTTP/1.1")
    version: String,

    /// Headers con keys normalizadas a minúsculas; la primera aparición gana
    headers: HashMap<String, String>,

    /// Body del request (exactamente `Content-Length` bytes)
    body: Vec<u8>,
}

impl Request {
    /// Parsea el bloque de headers ya enmarcado (sin el terminador `\r\n\r\n`)
    ///
    /// La request line debe traer al menos 3 tokens separados por espacios;
    /// un request line corto se rechaza en lugar de dejar campos vacíos.
    /// Las líneas de header sin `:` se ignoran.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use http_engine::http::Request;
    ///
    /// let head = "GET /hello HTTP/1.1\r\nHost: localhost";
    /// let request = Request::parse_head(head).unwrap();
    ///
    /// assert_eq!(request.method(), "GET");
    /// assert_eq!(request.path(), "/hello");
    /// assert_eq!(request.header("host"), Some("localhost"));
    /// ```
    pub fn parse_head(head: &str) -> Result<Self, ParseError> {
        let mut lines = head.split("\r\n");

        let request_line = lines.next().unwrap_or("");
        let mut request = Self::parse_request_line(request_line)?;
        request.parse_header_lines(lines);

        Ok(request)
    }

    /// Parsea la request line: `METHOD SP PATH SP VERSION`
    ///
    /// Tokens extra tras la versión se ignoran; menos de 3 tokens es rechazo.
    fn parse_request_line(line: &str) -> Result<Self, ParseError> {
        let mut tokens = line.split_whitespace();

        let (method, path, version) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(method), Some(path), Some(version)) => (method, path, version),
            _ => return Err(ParseError::InvalidRequestLine(line.to_string())),
        };

        Ok(Request {
            method: method.to_string(),
            path: path.to_string(),
            version: version.to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        })
    }

    /// Parsea las líneas de headers restantes
    ///
    /// Cada línea tiene formato `Name: Value`; key y value se recortan y la
    /// key se almacena en minúsculas. Líneas vacías o sin `:` se saltan.
    fn parse_header_lines<'a>(&mut self, lines: impl Iterator<Item = &'a str>) {
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }

            let Some(colon_pos) = line.find(':') else {
                continue;
            };

            let key = line[..colon_pos].trim().to_ascii_lowercase();
            let value = line[colon_pos + 1..].trim().to_string();

            if !key.is_empty() {
                self.add_header(key, value);
            }
        }
    }

    /// Agrega un header si no existe ya (la primera aparición gana)
    pub fn add_header(&mut self, key: String, value: String) -> bool {
        use std::collections::hash_map::Entry;

        match self.headers.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Resuelve la longitud esperada del body según `Content-Length`
    ///
    /// Header ausente significa body de longitud 0. Un valor vacío o no
    /// numérico es un error (el handler de conexión lo mapea a 400).
    pub fn content_length(&self) -> Result<usize, ParseError> {
        let Some(raw) = self.header("content-length") else {
            return Ok(0);
        };

        raw.trim()
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidContentLength(raw.to_string()))
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Obtiene el path del request (query string incluida)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene todos los headers (keys en minúsculas)
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico (lookup case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    /// Verifica si un header existe
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Obtiene el body del request como String
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Adjunta el body una vez completado el framing
    pub(crate) fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Obtiene todos los query parameters parseados desde el path
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::Request;
    ///
    /// let head = "GET /greet?text=hello%20world&fast=true HTTP/1.1";
    /// let request = Request::parse_head(head).unwrap();
    ///
    /// assert_eq!(request.query_param("text"), Some("hello world".to_string()));
    /// assert_eq!(request.query_param("fast"), Some("true".to_string()));
    /// assert_eq!(request.query_param("missing"), None);
    /// ```
    pub fn query_params(&self) -> HashMap<String, String> {
        let Some(query_start) = self.path.find('?') else {
            return HashMap::new();
        };

        let mut params = HashMap::new();

        for param in self.path[query_start + 1..].split('&') {
            if param.is_empty() {
                continue;
            }

            if let Some(eq_pos) = param.find('=') {
                let key = &param[..eq_pos];
                let value = Self::url_decode(&param[eq_pos + 1..]);
                params.insert(key.to_string(), value);
            } else {
                // Parámetro sin valor (ej: "?debug")
                params.insert(param.to_string(), String::new());
            }
        }

        params
    }

    /// Obtiene un query parameter específico
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_params().remove(name)
    }

    /// Decodificación de URL mínima (%20 y + como espacio)
    fn url_decode(s: &str) -> String {
        s.replace("%20", " ").replace('+', " ")
    }

    /// Traza el request parseado a nivel debug
    pub fn dump(&self) {
        log::debug!(
            "{} {} {} | {} headers | body de {} bytes",
            self.method,
            self.path,
            self.version,
            self.headers.len(),
            self.body.len()
        );
    }
}
