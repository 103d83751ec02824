//! Tests de integración del motor HTTP
//! tests/integration_test.rs
//!
//! Cada test levanta su propio servidor en un puerto efímero y le habla
//! por `TcpStream` crudo, sin ningún cliente HTTP de por medio: acá se
//! verifica el framing, los presupuestos y el routing de punta a punta.

use http_engine::commands;
use http_engine::config::Config;
use http_engine::metrics::MetricsCollector;
use http_engine::router::Router;
use http_engine::server::{Server, ServerHandle};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

/// Levanta un servidor completo con las rutas de demostración
fn start_server() -> ServerHandle {
    let mut config = Config::default();
    config.port = 0; // puerto efímero
    config.workers = 4;
    config.queue_capacity = 32;
    config.read_timeout_ms = 2_000;
    config.write_timeout_ms = 2_000;

    let metrics = MetricsCollector::new();

    let mut router = Router::new();
    router.add("GET", "/", commands::hello_handler);
    router.add("GET", "/hello", commands::hello_handler);
    router.add("GET", "/status", commands::status_handler(metrics.clone()));
    router.add("POST", "/echo", commands::echo_handler);
    router.add("POST", "/something", commands::greet_handler);

    Server::new(config, router, metrics)
        .start()
        .expect("no se pudo arrancar el servidor de test")
}

/// Abre una conexión con timeouts de test
fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream
        .set_write_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream
}

/// Envía bytes crudos y retorna la respuesta completa como texto
fn send_raw(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = connect(addr);

    stream.write_all(raw).unwrap();
    stream.flush().unwrap();
    stream.shutdown(std::net::Shutdown::Write).unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

/// Lee hasta EOF tolerando un reset del peer
///
/// Cuando el servidor rechaza a mitad del stream (431) puede cerrar con
/// bytes sin leer en su buffer; el cliente puede ver ECONNRESET después
/// de recibir la respuesta. Acá interesa lo que alcanzó a llegar.
fn read_lossy(stream: &mut TcpStream) -> String {
    let mut collected = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => collected.extend_from_slice(&chunk[..n]),
            Err(_) => break,
        }
    }

    String::from_utf8_lossy(&collected).into_owned()
}

/// Extrae el body de una respuesta HTTP
fn extract_body(response: &str) -> &str {
    match response.find("\r\n\r\n") {
        Some(pos) => &response[pos + 4..],
        None => "",
    }
}

#[test]
fn test_registered_route_dispatches_verbatim() {
    let server = start_server();

    let response = send_raw(server.addr(), b"GET /hello HTTP/1.1\r\nHost: test\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("X-Custom-Header: http-engine\r\n"));
    assert!(response.contains("Connection: close\r\n"));
    assert_eq!(extract_body(&response), "Hello, API World! : /hello");

    server.stop();
}

#[test]
fn test_trailing_slash_dispatches_identically() {
    let server = start_server();

    let with_slash = send_raw(server.addr(), b"GET /hello/ HTTP/1.1\r\n\r\n");
    let without_slash = send_raw(server.addr(), b"GET /hello HTTP/1.1\r\n\r\n");

    assert!(with_slash.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(without_slash.starts_with("HTTP/1.1 200 OK\r\n"));

    server.stop();
}

#[test]
fn test_root_path_not_rewritten() {
    let server = start_server();

    let response = send_raw(server.addr(), b"GET / HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(extract_body(&response), "Hello, API World! : /");

    server.stop();
}

#[test]
fn test_query_string_stripped_for_routing() {
    let server = start_server();

    let response = send_raw(server.addr(), b"GET /hello?nombre=mundo&x=1 HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

    server.stop();
}

#[test]
fn test_unregistered_route_is_404() {
    let server = start_server();

    let response = send_raw(server.addr(), b"GET /nope HTTP/1.1\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert_eq!(extract_body(&response), "Resource not found");

    server.stop();
}

#[test]
fn test_body_split_across_three_reads() {
    let server = start_server();

    // Referencia: el mismo body en una sola escritura
    let single = send_raw(
        server.addr(),
        b"POST /echo HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world",
    );

    // El body llega en 3 escrituras parciales: 4 + 4 + 3 bytes
    let mut stream = connect(server.addr());
    stream
        .write_all(b"POST /echo HTTP/1.1\r\nContent-Length: 11\r\n\r\n")
        .unwrap();
    stream.flush().unwrap();

    for fragment in [&b"hell"[..], &b"o wo"[..], &b"rld"[..]] {
        thread::sleep(Duration::from_millis(30));
        stream.write_all(fragment).unwrap();
        stream.flush().unwrap();
    }
    stream.shutdown(std::net::Shutdown::Write).unwrap();

    let mut split = String::new();
    stream.read_to_string(&mut split).unwrap();

    assert!(split.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(extract_body(&split), "hello world");
    assert_eq!(extract_body(&split), extract_body(&single));

    server.stop();
}

#[test]
fn test_missing_content_length_means_empty_body() {
    let server = start_server();

    // Sin Content-Length el body esperado es 0 y el handler corre igual
    let response = send_raw(server.addr(), b"POST /echo HTTP/1.1\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Length: 0\r\n"));
    assert_eq!(extract_body(&response), "");

    server.stop();
}

#[test]
fn test_non_numeric_content_length_is_400() {
    let server = start_server();

    let response = send_raw(
        server.addr(),
        b"POST /echo HTTP/1.1\r\nContent-Length: abc\r\n\r\n",
    );

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    // El handler de /echo nunca corrió: el body es la explicación del error
    assert_eq!(extract_body(&response), "Invalid Content-Length header");

    server.stop();
}

#[test]
fn test_oversized_declared_body_rejected_immediately() {
    let server = start_server();
    let started = Instant::now();

    // Se declara un body gigante pero no se envía ni un byte de él
    let mut stream = connect(server.addr());
    stream
        .write_all(b"POST /echo HTTP/1.1\r\nContent-Length: 99999999\r\n\r\n")
        .unwrap();
    stream.flush().unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();

    assert!(response.starts_with("HTTP/1.1 413 Payload Too Large\r\n"));
    assert_eq!(extract_body(&response), "Request body exceeds allowed size");

    // El rechazo salió por la longitud declarada, sin esperar los bytes
    assert!(started.elapsed() < Duration::from_secs(2));

    server.stop();
}

#[test]
fn test_oversized_header_block_is_431() {
    let server = start_server();

    let mut raw = Vec::from(&b"GET /hello HTTP/1.1\r\n"[..]);
    let filler_line = format!("X-Filler: {}\r\n", "a".repeat(1000));
    while raw.len() <= 17 * 1024 {
        raw.extend_from_slice(filler_line.as_bytes());
    }
    // Nunca se envía el terminador \r\n\r\n

    let mut stream = connect(server.addr());
    stream.write_all(&raw).unwrap();
    stream.flush().unwrap();

    let response = read_lossy(&mut stream);

    assert!(response.starts_with("HTTP/1.1 431 Request Header Fields Too Large\r\n"));

    server.stop();
}

#[test]
fn test_transfer_encoding_is_501() {
    let server = start_server();

    let response = send_raw(
        server.addr(),
        b"POST /echo HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n",
    );

    assert!(response.starts_with("HTTP/1.1 501 Not Implemented\r\n"));
    assert_eq!(extract_body(&response), "Transfer-Encoding is not supported");

    server.stop();
}

#[test]
fn test_short_request_line_is_400() {
    let server = start_server();

    let response = send_raw(server.addr(), b"GET\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert_eq!(extract_body(&response), "Malformed request line");

    server.stop();
}

#[test]
fn test_json_payload_handlers() {
    let server = start_server();

    let valid = send_raw(
        server.addr(),
        b"POST /something HTTP/1.1\r\nContent-Length: 15\r\n\r\n{\"name\": \"Ada\"}",
    );
    assert!(valid.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(extract_body(&valid), "JSON parsed successfully: hello Ada");

    let invalid = send_raw(
        server.addr(),
        b"POST /something HTTP/1.1\r\nContent-Length: 7\r\n\r\nno-json",
    );
    assert!(invalid.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert_eq!(extract_body(&invalid), "Invalid Json format");

    server.stop();
}

#[test]
fn test_status_endpoint_reports_metrics() {
    let server = start_server();

    send_raw(server.addr(), b"GET /hello HTTP/1.1\r\n\r\n");

    // El worker registra la métrica justo después de escribir la respuesta
    thread::sleep(Duration::from_millis(50));

    let response = send_raw(server.addr(), b"GET /status HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Content-Type: application/json\r\n"));

    let body: serde_json::Value = serde_json::from_str(extract_body(&response)).unwrap();
    assert_eq!(body["status"], "running");
    assert!(body["metrics"]["total_requests"].as_u64().unwrap() >= 1);

    server.stop();
}

#[test]
fn test_concurrent_connections() {
    let server = start_server();
    let addr = server.addr();

    let mut clients = Vec::new();
    for _ in 0..8 {
        clients.push(thread::spawn(move || {
            send_raw(addr, b"GET /hello HTTP/1.1\r\n\r\n")
        }));
    }

    for client in clients {
        let response = client.join().unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert_eq!(extract_body(&response), "Hello, API World! : /hello");
    }

    server.stop();
}

#[test]
fn test_graceful_stop_closes_listener() {
    let server = start_server();
    let addr = server.addr();

    // Con el servidor vivo la ruta responde
    let response = send_raw(addr, b"GET /hello HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

    // stop() espera acceptor y workers; después el puerto queda cerrado
    server.stop();

    assert!(TcpStream::connect(addr).is_err());
}
