//! # Handlers de Demostración
//!
//! Lógica de rutas que acompaña al motor: un saludo, el estado del
//! servidor con sus métricas, un eco del body y un ejemplo de payload
//! JSON. El core del engine no depende de nada de esto; son los handlers
//! que registra `main`.

pub mod basic;

pub use basic::{echo_handler, greet_handler, hello_handler, status_handler};
