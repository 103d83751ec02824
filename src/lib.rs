//! # HTTP Engine
//! src/lib.rs
//!
//! Motor HTTP/1.1 concurrente implementado desde cero sobre sockets
//! crudos: un pool fijo de workers desencola conexiones aceptadas de una
//! cola acotada, enmarca cada request de forma incremental (lecturas TCP
//! parciales, presupuestos de tamaño) y lo despacha por un router de
//! matching exacto.
//!
//! ## Arquitectura
//!
//! ```text
//! Acceptor -> TaskQueue -> Worker -> ConnectionHandler -> Router -> handler
//! ```
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: parsing de requests y construcción de responses HTTP/1.1
//! - `server`: cola acotada, pool de workers, connection handler y acceptor
//! - `router`: enrutamiento de peticiones a handlers
//! - `config`: configuración por CLI y variables de entorno
//! - `commands`: handlers de demostración registrados por `main`
//! - `metrics`: contadores de observabilidad del motor
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use http_engine::config::Config;
//! use http_engine::metrics::MetricsCollector;
//! use http_engine::router::Router;
//! use http_engine::server::Server;
//!
//! let mut router = Router::new();
//! router.add("GET", "/hello", |_req, res| {
//!     res.set_body("Hello");
//! });
//!
//! let server = Server::new(Config::default(), router, MetricsCollector::new());
//! server.run().expect("error al iniciar el servidor");
//! ```

pub mod commands;
pub mod config;
pub mod http;
pub mod metrics;
pub mod router;
pub mod server;
