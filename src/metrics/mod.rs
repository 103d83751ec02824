//! # Métricas del Motor
//!
//! Contadores thread-safe del servidor: requests totales, por código de
//! estado y por ruta, conexiones activas y uptime. El snapshot JSON lo
//! consume el handler de `/status`.

pub mod collector;

pub use collector::MetricsCollector;
