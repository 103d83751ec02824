//! Errores de arranque del servidor.
//!
//! Solo el setup (configuración, bind, spawn) produce errores que suben al
//! llamador; todo lo que pasa dentro de una conexión se resuelve en el
//! connection handler y nunca cruza ese límite.

use thiserror::Error;

/// Errores al arrancar el motor
#[derive(Debug, Error)]
pub enum Error {
    /// Configuración rechazada por `Config::validate`
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// La dirección de escucha no resuelve a ningún socket address
    #[error("invalid listen address: {0}")]
    InvalidAddress(String),

    /// Fallo de I/O durante bind/listen/spawn
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
