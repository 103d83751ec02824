//! # Pool de Workers
//! src/server/pool.rs
//!
//! Conjunto fijo de N threads de larga vida creados al arrancar el
//! servidor. Cada worker repite el ciclo desencolar -> atender -> loop y
//! termina cuando la cola se cierra y queda drenada, lo que permite hacer
//! join del pool en el shutdown.

use crate::config::Limits;
use crate::metrics::MetricsCollector;
use crate::router::Router;
use crate::server::connection::ConnectionHandler;
use crate::server::queue::TaskQueue;
use log::{debug, info};
use std::io;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Pool de threads workers sobre la cola de conexiones
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Crea los N workers; cada uno queda bloqueado en `dequeue`
    pub fn spawn(
        worker_count: usize,
        queue: TaskQueue<TcpStream>,
        router: Arc<Router>,
        limits: Limits,
        metrics: MetricsCollector,
    ) -> io::Result<Self> {
        let mut handles = Vec::with_capacity(worker_count);

        for i in 0..worker_count {
            let name = format!("worker-{}", i);
            let worker_queue = queue.clone();
            let worker_router = Arc::clone(&router);
            let worker_metrics = metrics.clone();

            let handle = thread::Builder::new().name(name.clone()).spawn(move || {
                Self::worker_loop(name, worker_queue, worker_router, limits, worker_metrics)
            })?;

            handles.push(handle);
        }

        info!("pool de {} workers iniciado", worker_count);

        Ok(Self { handles })
    }

    /// Ciclo de vida de un worker: desencolar -> atender -> loop
    ///
    /// `dequeue` retorna `None` recién cuando la cola fue cerrada y no
    /// quedan conexiones pendientes; las que ya estaban encoladas se
    /// atienden antes de salir.
    fn worker_loop(
        name: String,
        queue: TaskQueue<TcpStream>,
        router: Arc<Router>,
        limits: Limits,
        metrics: MetricsCollector,
    ) {
        debug!("{} esperando conexiones", name);

        while let Some(stream) = queue.dequeue() {
            ConnectionHandler::new(stream, Arc::clone(&router), limits, metrics.clone()).run();
        }

        debug!("{} terminado", name);
    }

    /// Cantidad de workers vivos
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Espera a que todos los workers terminen
    ///
    /// Solo retorna después de que la cola fue cerrada; llamarlo antes
    /// bloquea indefinidamente.
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                log::error!("un worker terminó con panic");
            }
        }

        info!("pool de workers detenido");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Response;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn echo_router() -> Arc<Router> {
        let mut router = Router::new();
        router.add("GET", "/ping", |_req, res: &mut Response| {
            res.set_body("pong");
        });
        Arc::new(router)
    }

    #[test]
    fn test_pool_drains_queue_and_joins() {
        let queue: TaskQueue<TcpStream> = TaskQueue::new(8);
        let pool = WorkerPool::spawn(
            2,
            queue.clone(),
            echo_router(),
            Limits::default(),
            MetricsCollector::new(),
        )
        .expect("spawn pool");

        assert_eq!(pool.size(), 2);

        // Dos conexiones reales servidas por el pool
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let mut clients = Vec::new();
        for _ in 0..2 {
            let mut client = TcpStream::connect(addr).unwrap();
            let (served, _) = listener.accept().unwrap();
            assert!(queue.enqueue(served));

            client
                .write_all(b"GET /ping HTTP/1.1\r\n\r\n")
                .unwrap();
            client.shutdown(std::net::Shutdown::Write).unwrap();
            clients.push(client);
        }

        for mut client in clients {
            let mut response = String::new();
            client.read_to_string(&mut response).unwrap();
            assert!(response.contains("200 OK"));
            assert!(response.ends_with("pong"));
        }

        // Con la cola cerrada el join retorna
        queue.close();
        pool.join();
    }

    #[test]
    fn test_pool_joins_on_empty_closed_queue() {
        let queue: TaskQueue<TcpStream> = TaskQueue::new(4);
        let pool = WorkerPool::spawn(
            3,
            queue.clone(),
            echo_router(),
            Limits::default(),
            MetricsCollector::new(),
        )
        .expect("spawn pool");

        queue.close();
        pool.join();
    }
}
