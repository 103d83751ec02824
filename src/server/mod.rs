//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el núcleo concurrente del motor:
//!
//! 1. `queue`: la cola acotada que conecta acceptor y workers
//! 2. `pool`: los N threads workers de larga vida
//! 3. `connection`: la máquina de estados que atiende cada conexión
//! 4. `tcp`: el socket de escucha, el loop de aceptación y el ciclo de vida
//!
//! Flujo: Acceptor -> TaskQueue -> Worker -> ConnectionHandler -> Router ->
//! handler -> respuesta -> socket -> close.

pub mod connection;
pub mod error;
pub mod pool;
pub mod queue;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::ConnectionHandler;
pub use error::Error;
pub use pool::WorkerPool;
pub use queue::TaskQueue;
pub use tcp::{Server, ServerHandle};
