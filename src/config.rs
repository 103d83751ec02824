//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del motor HTTP con soporte para
//! argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./http_engine --port 8080 \
//!   --workers 16 \
//!   --queue-capacity 512 \
//!   --max-body-bytes 1048576
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 ./http_engine
//! ```

use clap::Parser;
use std::time::Duration;

/// Configuración del servidor HTTP/1.1
#[derive(Debug, Clone, Parser)]
#[command(name = "http_engine")]
#[command(about = "Motor HTTP/1.1 concurrente con pool de workers y cola acotada")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = efímero)
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    // === Concurrencia ===
    /// Número de threads workers del pool
    #[arg(long, default_value = "16", env = "HTTP_WORKERS")]
    pub workers: usize,

    /// Capacidad de la cola de conexiones aceptadas
    #[arg(long = "queue-capacity", default_value = "512", env = "QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Backlog del socket de escucha
    #[arg(long, default_value = "1024", env = "LISTEN_BACKLOG")]
    pub backlog: i32,

    // === Presupuestos de framing ===
    /// Máximo de bytes del bloque de headers
    #[arg(long = "max-header-bytes", default_value = "16384", env = "MAX_HEADER_BYTES")]
    pub max_header_bytes: usize,

    /// Máximo de bytes del body declarado por Content-Length
    #[arg(long = "max-body-bytes", default_value = "1048576", env = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    // === Timeouts por conexión ===
    /// Timeout de lectura del socket en milisegundos (0 = deshabilitado)
    #[arg(long = "read-timeout-ms", default_value = "5000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Timeout de escritura del socket en milisegundos (0 = deshabilitado)
    #[arg(long = "write-timeout-ms", default_value = "5000", env = "WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: u64,
}

/// Presupuestos y deadlines que recibe cada connection handler
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Máximo de bytes acumulables antes de enmarcar los headers
    pub max_header_bytes: usize,

    /// Máximo de bytes de body declarables por Content-Length
    pub max_body_bytes: usize,

    /// Deadline de cada lectura del socket
    pub read_timeout: Option<Duration>,

    /// Deadline de cada escritura al socket
    pub write_timeout: Option<Duration>,
}

impl Limits {
    /// Presupuesto total del request: headers + body
    pub fn max_request_bytes(&self) -> usize {
        self.max_header_bytes + self.max_body_bytes
    }
}

impl Default for Limits {
    fn default() -> Self {
        Config::default().limits()
    }
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Arma los límites por conexión a partir de la configuración
    pub fn limits(&self) -> Limits {
        Limits {
            max_header_bytes: self.max_header_bytes,
            max_body_bytes: self.max_body_bytes,
            read_timeout: timeout_from_ms(self.read_timeout_ms),
            write_timeout: timeout_from_ms(self.write_timeout_ms),
        }
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("workers must be >= 1".to_string());
        }

        if self.queue_capacity == 0 {
            return Err("queue capacity must be >= 1".to_string());
        }

        if self.backlog <= 0 {
            return Err("listen backlog must be >= 1".to_string());
        }

        if self.max_header_bytes == 0 {
            return Err("max header bytes must be >= 1".to_string());
        }

        Ok(())
    }
}

/// 0 milisegundos significa sin deadline
fn timeout_from_ms(ms: u64) -> Option<Duration> {
    if ms == 0 {
        None
    } else {
        Some(Duration::from_millis(ms))
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            workers: 16,
            queue_capacity: 512,
            backlog: 1024,
            max_header_bytes: 16 * 1024,
            max_body_bytes: 1024 * 1024,
            read_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
        }
    }
}
