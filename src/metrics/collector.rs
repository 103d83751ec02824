//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta y agrega métricas del servidor en tiempo real.

use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
struct MetricsData {
    /// Contador total de requests
    total_requests: u64,

    /// Requests por código de estado
    status_codes: HashMap<u16, u64>,

    /// Requests por ruta
    requests_per_path: HashMap<String, u64>,

    /// Suma de latencias en microsegundos (para el promedio)
    total_latency_us: u64,

    /// Conexiones siendo atendidas en este momento
    active_connections: u64,
}

impl MetricsCollector {
    /// Crea un nuevo collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData {
                total_requests: 0,
                status_codes: HashMap::new(),
                requests_per_path: HashMap::new(),
                total_latency_us: 0,
                active_connections: 0,
            })),
            start_time: Instant::now(),
        }
    }

    /// Registra un request atendido
    pub fn record_request(&self, path: &str, status_code: u16, latency: Duration) {
        let mut data = self.inner.lock().unwrap();

        data.total_requests += 1;
        *data.status_codes.entry(status_code).or_insert(0) += 1;
        *data.requests_per_path.entry(path.to_string()).or_insert(0) += 1;
        data.total_latency_us += latency.as_micros() as u64;
    }

    /// Marca una conexión tomada por un worker
    pub fn connection_opened(&self) {
        let mut data = self.inner.lock().unwrap();
        data.active_connections += 1;
    }

    /// Marca una conexión cerrada
    pub fn connection_closed(&self) {
        let mut data = self.inner.lock().unwrap();
        if data.active_connections > 0 {
            data.active_connections -= 1;
        }
    }

    /// Conexiones activas en este momento
    pub fn active_connections(&self) -> u64 {
        self.inner.lock().unwrap().active_connections
    }

    /// Total de requests atendidos
    pub fn total_requests(&self) -> u64 {
        self.inner.lock().unwrap().total_requests
    }

    /// Snapshot de las métricas como JSON
    pub fn snapshot(&self) -> serde_json::Value {
        let data = self.inner.lock().unwrap();

        let status_codes: serde_json::Map<String, serde_json::Value> = data
            .status_codes
            .iter()
            .map(|(code, count)| (code.to_string(), (*count).into()))
            .collect();

        let requests_per_path: serde_json::Map<String, serde_json::Value> = data
            .requests_per_path
            .iter()
            .map(|(path, count)| (path.clone(), (*count).into()))
            .collect();

        let avg_latency_us = if data.total_requests > 0 {
            data.total_latency_us / data.total_requests
        } else {
            0
        };

        json!({
            "uptime_secs": self.start_time.elapsed().as_secs(),
            "total_requests": data.total_requests,
            "active_connections": data.active_connections,
            "avg_latency_us": avg_latency_us,
            "status_codes": status_codes,
            "requests_per_path": requests_per_path,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
