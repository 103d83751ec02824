//! # HTTP Engine - Entry Point
//! src/main.rs
//!
//! Punto de entrada del motor: inicializa el logging, parsea la
//! configuración, registra las rutas y arranca el servidor.

use http_engine::commands;
use http_engine::config::Config;
use http_engine::metrics::MetricsCollector;
use http_engine::router::Router;
use http_engine::server::Server;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::new();
    let metrics = MetricsCollector::new();

    // La tabla de rutas se puebla completa antes de arrancar los workers
    let mut router = Router::new();
    router.add("GET", "/", commands::hello_handler);
    router.add("GET", "/hello", commands::hello_handler);
    router.add("GET", "/status", commands::status_handler(metrics.clone()));
    router.add("POST", "/echo", commands::echo_handler);
    router.add("POST", "/something", commands::greet_handler);

    let server = Server::new(config, router, metrics);

    if let Err(e) = server.run() {
        log::error!("error fatal: {}", e);
        std::process::exit(1);
    }
}
