//! # Handler de Conexión
//! src/server/connection.rs
//!
//! Máquina de estados por conexión: acumula bytes del socket hasta enmarcar
//! el request (`READING_HEADERS -> READING_BODY -> DONE`), lo despacha por
//! el router y escribe la respuesta serializada.
//!
//! Toda detección de errores de framing ocurre acá adentro; nada se propaga
//! más allá de la conexión. Un request malformado siempre termina la
//! conexión con una respuesta de error, y una falla de transporte pura con
//! un cierre silencioso. El socket se cierra exactamente una vez en todos
//! los caminos (al dropear el `TcpStream`).

use crate::config::Limits;
use crate::http::{Request, Response, StatusCode};
use crate::metrics::MetricsCollector;
use crate::router::Router;
use log::debug;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Instant;

/// Tamaño de cada lectura acotada sobre el socket
const READ_CHUNK_BYTES: usize = 2048;

/// Separador entre el bloque de headers y el body
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Estados del framing de un request
enum ConnectionState {
    ReadingHeaders,
    ReadingBody,
    Done,
}

/// Resultado del loop de lectura
enum Framing {
    /// El loop terminó; `finalize` valida lo acumulado
    Finished,

    /// Rechazo inmediato con estado y explicación ya determinados
    Rejected(StatusCode, &'static str),
}

/// Máquina de estados que atiende una conexión aceptada
pub struct ConnectionHandler {
    stream: TcpStream,
    router: Arc<Router>,
    limits: Limits,
    metrics: MetricsCollector,

    /// Buffer de acumulación: bytes crudos del socket hasta completar el framing
    buffer: Vec<u8>,
    state: ConnectionState,

    /// Offset del primer byte del body (fin del terminador de headers)
    header_end: usize,

    /// Longitud de body esperada según `Content-Length`
    expected_body_bytes: usize,

    request: Request,
}

impl ConnectionHandler {
    /// Prepara el handler para un handle de conexión recién desencolado
    ///
    /// Configura los timeouts de lectura/escritura del socket; un peer lento
    /// o mudo no puede retener al worker indefinidamente.
    pub fn new(
        stream: TcpStream,
        router: Arc<Router>,
        limits: Limits,
        metrics: MetricsCollector,
    ) -> Self {
        if let Err(e) = stream.set_read_timeout(limits.read_timeout) {
            debug!("no se pudo configurar el read timeout: {}", e);
        }
        if let Err(e) = stream.set_write_timeout(limits.write_timeout) {
            debug!("no se pudo configurar el write timeout: {}", e);
        }

        Self {
            stream,
            router,
            limits,
            metrics,
            buffer: Vec::with_capacity(READ_CHUNK_BYTES),
            state: ConnectionState::ReadingHeaders,
            header_end: 0,
            expected_body_bytes: 0,
            request: Request::default(),
        }
    }

    /// Atiende la conexión de punta a punta y cierra el socket
    pub fn run(mut self) {
        let started = Instant::now();
        self.metrics.connection_opened();

        match self.read_and_frame() {
            Framing::Rejected(status, message) => {
                debug!("conexión rechazada: {} ({})", status, message);
                self.send_error(status, message);
                self.record(status, started);
            }
            Framing::Finished => self.finalize(started),
        }

        self.metrics.connection_closed();
        // el drop del stream cierra el handle: un único close por conexión
    }

    /// Loop de lectura: acumula bytes y avanza la máquina de estados
    fn read_and_frame(&mut self) -> Framing {
        let mut chunk = [0u8; READ_CHUNK_BYTES];

        loop {
            let bytes_received = match self.stream.read(&mut chunk) {
                Ok(0) => break, // el peer cerró la conexión
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => {
                    debug!("timeout de lectura, el request queda incompleto");
                    break;
                }
                Err(e) => {
                    debug!("error de lectura: {}", e);
                    break;
                }
            };

            self.buffer.extend_from_slice(&chunk[..bytes_received]);

            if self.buffer.len() > self.limits.max_request_bytes() {
                return Framing::Rejected(
                    StatusCode::PayloadTooLarge,
                    "Request exceeds allowed size",
                );
            }

            if matches!(self.state, ConnectionState::ReadingHeaders) {
                if let Some(terminator_pos) = find_header_terminator(&self.buffer) {
                    self.header_end = terminator_pos + HEADER_TERMINATOR.len();

                    if let Some(rejection) = self.parse_head(terminator_pos) {
                        return rejection;
                    }

                    self.state = ConnectionState::ReadingBody;
                } else if self.buffer.len() > self.limits.max_header_bytes {
                    return Framing::Rejected(
                        StatusCode::RequestHeaderFieldsTooLarge,
                        "Request headers exceed allowed size",
                    );
                }
            }

            if matches!(self.state, ConnectionState::ReadingBody) {
                let body_available = self.buffer.len().saturating_sub(self.header_end);

                if body_available >= self.expected_body_bytes {
                    self.state = ConnectionState::Done;
                    break;
                }
            }
        }

        Framing::Finished
    }

    /// Parsea el bloque de headers recién enmarcado y resuelve la longitud
    /// del body; retorna el rechazo correspondiente si algo no cierra
    fn parse_head(&mut self, terminator_pos: usize) -> Option<Framing> {
        let head = match std::str::from_utf8(&self.buffer[..terminator_pos]) {
            Ok(head) => head,
            Err(_) => {
                return Some(Framing::Rejected(
                    StatusCode::BadRequest,
                    "Malformed HTTP request",
                ))
            }
        };

        self.request = match Request::parse_head(head) {
            Ok(request) => request,
            Err(e) => {
                debug!("parse error: {}", e);
                return Some(Framing::Rejected(
                    StatusCode::BadRequest,
                    "Malformed request line",
                ));
            }
        };

        // chunked no está soportado, por diseño
        if self.request.has_header("transfer-encoding") {
            return Some(Framing::Rejected(
                StatusCode::NotImplemented,
                "Transfer-Encoding is not supported",
            ));
        }

        self.expected_body_bytes = match self.request.content_length() {
            Ok(length) => length,
            Err(e) => {
                debug!("parse error: {}", e);
                return Some(Framing::Rejected(
                    StatusCode::BadRequest,
                    "Invalid Content-Length header",
                ));
            }
        };

        // se rechaza por la longitud declarada, sin esperar a recibirla
        if self.expected_body_bytes > self.limits.max_body_bytes {
            return Some(Framing::Rejected(
                StatusCode::PayloadTooLarge,
                "Request body exceeds allowed size",
            ));
        }

        None
    }

    /// Valida lo acumulado, despacha por el router y escribe la respuesta
    fn finalize(&mut self, started: Instant) {
        if matches!(self.state, ConnectionState::ReadingHeaders) {
            if self.buffer.is_empty() {
                // el peer conectó y cerró sin enviar nada: cierre silencioso
                return;
            }

            self.send_error(StatusCode::BadRequest, "Malformed HTTP request");
            self.record(StatusCode::BadRequest, started);
            return;
        }

        let required_bytes = self.header_end + self.expected_body_bytes;
        if self.buffer.len() < required_bytes {
            self.send_error(StatusCode::BadRequest, "Incomplete HTTP body");
            self.record(StatusCode::BadRequest, started);
            return;
        }

        // exactamente los bytes declarados; lo que sobre se ignora
        let body = self.buffer[self.header_end..required_bytes].to_vec();
        self.request.set_body(body);
        self.request.dump();

        let mut response = Response::new(StatusCode::Ok);
        self.router.handle(&self.request, &mut response);

        let payload = response.to_bytes();
        if let Err(e) = self.stream.write_all(&payload).and_then(|_| self.stream.flush()) {
            debug!("error escribiendo la respuesta: {}", e);
        }

        debug!(
            "{} {} -> {}",
            self.request.method(),
            self.request.path(),
            response.status()
        );
        self.record(response.status(), started);
    }

    /// Envía una respuesta de error y deja la conexión lista para cerrarse
    ///
    /// Un peer ya desconectado hace fallar la escritura; eso solo se traza.
    fn send_error(&mut self, status: StatusCode, message: &str) {
        let response = Response::error(status, message);

        if let Err(e) = self.stream.write_all(&response.to_bytes()) {
            debug!("no se pudo enviar el error {}: {}", status, e);
        }
        let _ = self.stream.flush();
    }

    /// Registra el request en las métricas
    fn record(&self, status: StatusCode, started: Instant) {
        let path = if self.request.path().is_empty() {
            "-"
        } else {
            self.request.path()
        };

        self.metrics
            .record_request(path, status.as_u16(), started.elapsed());
    }
}

/// Busca el terminador `\r\n\r\n` dentro del buffer acumulado
fn find_header_terminator(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
}

/// Un read que venció el deadline del socket
fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
