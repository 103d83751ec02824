//! # Cola Acotada de Tareas
//! src/server/queue.rs
//!
//! Implementa la cola FIFO thread-safe que conecta el acceptor con el pool
//! de workers. Genérica sobre el payload; el servidor la usa con handles de
//! conexión (`TcpStream`).
//!
//! La capacidad se fija al construir y se verifica con un chequeo explícito
//! en cada `enqueue`. `close()` es la señal de parada: despierta a todos los
//! workers bloqueados y, una vez drenados los elementos restantes,
//! `dequeue` retorna `None`.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

/// Estado interno protegido por el mutex
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Cola FIFO acotada y thread-safe
pub struct TaskQueue<T> {
    /// Buffer interno
    state: Arc<Mutex<QueueState<T>>>,

    /// Condvar para notificar a los workers esperando
    condvar: Arc<Condvar>,

    /// Capacidad máxima de la cola
    capacity: usize,
}

impl<T> TaskQueue<T> {
    /// Crea una nueva cola con capacidad máxima fija
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            })),
            condvar: Arc::new(Condvar::new()),
            capacity,
        }
    }

    /// Encola un elemento al final
    ///
    /// Retorna `true` si se encoló; `false` si la cola está llena o
    /// cerrada. Un elemento rechazado se dropea al salir de acá; para un
    /// handle de conexión eso cierra el socket en vez de filtrarlo.
    pub fn enqueue(&self, item: T) -> bool {
        let mut state = self.state.lock().unwrap();

        if state.closed || state.items.len() >= self.capacity {
            return false;
        }

        state.items.push_back(item);
        self.condvar.notify_one();

        true
    }

    /// Desencola el elemento más antiguo (FIFO)
    ///
    /// Bloquea hasta que haya un elemento disponible. Retorna `None` cuando
    /// la cola fue cerrada y no quedan elementos por drenar.
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();

        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }

            if state.closed {
                return None;
            }

            state = self.condvar.wait(state).unwrap();
        }
    }

    /// Cierra la cola: ningún `enqueue` posterior tiene éxito y los workers
    /// bloqueados despiertan para drenar lo pendiente y terminar
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        self.condvar.notify_all();
    }

    /// Retorna el tamaño actual de la cola (snapshot no bloqueante)
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    /// Verifica si la cola está vacía (snapshot)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verifica si la cola está llena (snapshot)
    ///
    /// El acceptor la usa como control de admisión; un snapshot levemente
    /// desactualizado es aceptable porque la siguiente iteración re-chequea.
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Retorna la capacidad máxima
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Clone for TaskQueue<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            condvar: Arc::clone(&self.condvar),
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = TaskQueue::new(10);

        assert!(queue.enqueue(1));
        assert!(queue.enqueue(2));
        assert!(queue.enqueue(3));

        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), Some(3));
    }

    #[test]
    fn test_capacity_bound() {
        let queue = TaskQueue::new(2);

        assert!(queue.enqueue("a"));
        assert!(queue.enqueue("b"));
        assert!(!queue.enqueue("c")); // Cola llena

        assert_eq!(queue.len(), 2);
        assert!(queue.is_full());
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        let queue = TaskQueue::new(4);

        for i in 0..100 {
            queue.enqueue(i);
            assert!(queue.len() <= queue.capacity());
        }
    }

    #[test]
    fn test_is_empty_snapshots() {
        let queue = TaskQueue::new(4);

        assert!(queue.is_empty());
        assert!(!queue.is_full());

        queue.enqueue(7);
        assert!(!queue.is_empty());
    }

    #[test]
    fn test_enqueue_after_close_fails() {
        let queue = TaskQueue::new(4);
        queue.close();

        assert!(!queue.enqueue(1));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_close_drains_pending_items() {
        let queue = TaskQueue::new(4);

        queue.enqueue(1);
        queue.enqueue(2);
        queue.close();

        // Lo pendiente se drena antes de reportar el cierre
        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_blocking_dequeue_wakes_on_enqueue() {
        let queue = TaskQueue::new(4);
        let consumer_queue = queue.clone();

        let consumer = thread::spawn(move || consumer_queue.dequeue());

        thread::sleep(Duration::from_millis(50));
        assert!(queue.enqueue(42));

        assert_eq!(consumer.join().unwrap(), Some(42));
    }

    #[test]
    fn test_blocking_dequeue_wakes_on_close() {
        let queue: TaskQueue<u32> = TaskQueue::new(4);
        let consumer_queue = queue.clone();

        let consumer = thread::spawn(move || consumer_queue.dequeue());

        thread::sleep(Duration::from_millis(50));
        queue.close();

        assert_eq!(consumer.join().unwrap(), None);
    }

    #[test]
    fn test_concurrent_producers_respect_capacity() {
        let queue = TaskQueue::new(8);
        let mut producers = Vec::new();

        for base in 0..4 {
            let producer_queue = queue.clone();
            producers.push(thread::spawn(move || {
                let mut accepted = 0;
                for i in 0..10 {
                    if producer_queue.enqueue(base * 10 + i) {
                        accepted += 1;
                    }
                }
                accepted
            }));
        }

        let accepted: usize = producers.into_iter().map(|p| p.join().unwrap()).sum();

        assert!(accepted >= 8);
        assert!(queue.len() <= queue.capacity());
    }
}
