//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Ciclo de vida del motor: bind del socket de escucha, arranque del pool
//! de workers y loop de aceptación con control de admisión.
//!
//! El acceptor es el único dueño del socket de escucha. En cada iteración,
//! si la cola de tareas no está llena, acepta una conexión y la encola; si
//! está llena no acepta y las conexiones nuevas esperan en el backlog del
//! sistema operativo (backpressure).

use crate::config::Config;
use crate::metrics::MetricsCollector;
use crate::router::Router;
use crate::server::error::Error;
use crate::server::pool::WorkerPool;
use crate::server::queue::TaskQueue;
use log::{debug, error, info, warn};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::os::unix::io::AsRawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Pausa del acceptor mientras la cola reporta llena
const BACKPRESSURE_POLL: Duration = Duration::from_millis(5);

/// Servidor HTTP/1.1 concurrente
pub struct Server {
    config: Config,
    router: Arc<Router>,
    metrics: MetricsCollector,
}

impl Server {
    /// Crea el servidor con una tabla de rutas ya poblada
    ///
    /// El router se registra completo antes de arrancar y es de solo
    /// lectura durante el despacho; no necesita sincronización.
    pub fn new(config: Config, router: Router, metrics: MetricsCollector) -> Self {
        Self {
            config,
            router: Arc::new(router),
            metrics,
        }
    }

    /// Arranca el motor: bind, pool de workers y acceptor en su thread
    ///
    /// Retorna un [`ServerHandle`] con la dirección real de escucha (útil
    /// con puerto 0) y el control de parada.
    pub fn start(self) -> Result<ServerHandle, Error> {
        self.config.validate().map_err(Error::InvalidConfig)?;

        let listener = bind_listener(&self.config.address(), self.config.backlog)?;
        let addr = listener.local_addr()?;

        let queue: TaskQueue<TcpStream> = TaskQueue::new(self.config.queue_capacity);
        let pool = WorkerPool::spawn(
            self.config.workers,
            queue.clone(),
            Arc::clone(&self.router),
            self.config.limits(),
            self.metrics.clone(),
        )?;

        info!(
            "servidor escuchando en {} ({} workers, cola de {})",
            addr, self.config.workers, self.config.queue_capacity
        );

        let stopping = Arc::new(AtomicBool::new(false));

        // Dup del listener: permite interrumpir el accept bloqueado desde stop()
        let wakeup = listener.try_clone()?;

        let acceptor = thread::Builder::new().name("acceptor".to_string()).spawn({
            let stopping = Arc::clone(&stopping);
            move || accept_loop(listener, queue, pool, stopping)
        })?;

        Ok(ServerHandle {
            addr,
            wakeup,
            stopping,
            acceptor,
        })
    }

    /// Versión bloqueante: arranca y espera al acceptor
    pub fn run(self) -> Result<(), Error> {
        let handle = self.start()?;
        handle.join();
        Ok(())
    }
}

/// Control del servidor en ejecución
pub struct ServerHandle {
    addr: SocketAddr,
    wakeup: TcpListener,
    stopping: Arc<AtomicBool>,
    acceptor: JoinHandle<()>,
}

impl ServerHandle {
    /// Dirección real en la que escucha el servidor
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Parada ordenada: interrumpe el accept, drena la cola y espera a
    /// acceptor y workers
    pub fn stop(self) {
        self.stopping.store(true, Ordering::SeqCst);

        // shutdown sobre el socket de escucha despierta al accept bloqueado;
        // el acceptor clasifica ese error como fatal y pasa a la limpieza
        unsafe {
            libc::shutdown(self.wakeup.as_raw_fd(), libc::SHUT_RDWR);
        }

        self.join();
    }

    /// Espera a que el acceptor termine (bloquea hasta la parada)
    pub fn join(self) {
        if self.acceptor.join().is_err() {
            error!("el acceptor terminó con panic");
        }
    }
}

/// Crea el socket de escucha con reuso de dirección y backlog configurado
fn bind_listener(address: &str, backlog: i32) -> Result<TcpListener, Error> {
    let addr: SocketAddr = address
        .to_socket_addrs()
        .map_err(|_| Error::InvalidAddress(address.to_string()))?
        .next()
        .ok_or_else(|| Error::InvalidAddress(address.to_string()))?;

    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    Ok(socket.into())
}

/// Loop de aceptación con control de admisión
///
/// Clasificación de errores de `accept`:
/// - interrupción por señal (`EINTR`): reintentar de inmediato
/// - socket de escucha cerrado por fuera (`EBADF`/`EINVAL`): fatal, salir
/// - cualquier otro error del SO: loguear y continuar
fn accept_loop(
    listener: TcpListener,
    queue: TaskQueue<TcpStream>,
    pool: WorkerPool,
    stopping: Arc<AtomicBool>,
) {
    loop {
        if stopping.load(Ordering::SeqCst) {
            break;
        }

        if queue.is_full() {
            // Backpressure: no se acepta hasta que la cola libere espacio
            thread::sleep(BACKPRESSURE_POLL);
            continue;
        }

        match listener.accept() {
            Ok((stream, peer)) => {
                debug!("conexión aceptada desde {}", peer);

                if !queue.enqueue(stream) {
                    // Carrera con el snapshot de is_full: el handle huérfano
                    // se cierra acá mismo, nunca se filtra
                    warn!("cola llena, cerrando la conexión de {}", peer);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_fatal_accept_error(&e) => {
                if !stopping.load(Ordering::SeqCst) {
                    error!("accept fatal, iniciando shutdown: {}", e);
                }
                break;
            }
            Err(e) => {
                error!("error en accept: {}", e);
            }
        }
    }

    // Limpieza: cerrar el socket de escucha, liberar la cola y esperar a
    // que los workers drenen lo pendiente
    drop(listener);
    queue.close();
    pool.join();

    info!("acceptor detenido");
}

/// El socket de escucha dejó de existir para el accept
fn is_fatal_accept_error(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(libc::EBADF) | Some(libc::EINVAL))
}
