//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo implementa el router de matching exacto sobre la tabla de
//! rutas.
//!
//! ## Arquitectura
//!
//! ```text
//! Request -> Router -> Handler -> Response
//! ```
//!
//! La tabla se puebla completa antes de `Server::start` y después solo se
//! lee: escritor único antes de los lectores, sin sincronización. El
//! matching es case-sensitive sobre método y path normalizado, en orden de
//! registro; la primera ruta que coincide gana.

use crate::http::{Request, Response, StatusCode};
use log::warn;

/// Capacidad máxima de la tabla de rutas
pub const MAX_ROUTES: usize = 20;

/// Tipo de los handlers registrados
///
/// Closures boxeadas en lugar de punteros a función: un handler puede
/// capturar estado (por ejemplo el collector de métricas) o envolver a otro
/// handler como middleware.
pub type Handler = Box<dyn Fn(&Request, &mut Response) + Send + Sync>;

/// Una entrada de la tabla: método + path + handler
struct Route {
    method: String,
    path: String,
    handler: Handler,
}

/// Router de matching exacto
pub struct Router {
    /// Tabla ordenada por registro
    routes: Vec<Route>,
}

impl Router {
    /// Crea un router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta al final de la tabla
    ///
    /// Retorna `false` (y loguea) si la tabla está en capacidad; el chequeo
    /// es explícito, nunca una aserción que desaparece en release.
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::router::Router;
    ///
    /// let mut router = Router::new();
    /// let added = router.add("GET", "/hello", |_req, res| {
    ///     res.set_body("Hello");
    /// });
    /// assert!(added);
    /// ```
    pub fn add<H>(&mut self, method: &str, path: &str, handler: H) -> bool
    where
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        if self.routes.len() >= MAX_ROUTES {
            warn!("tabla de rutas llena, se ignora {} {}", method, path);
            return false;
        }

        self.routes.push(Route {
            method: method.to_string(),
            path: path.to_string(),
            handler: Box::new(handler),
        });

        true
    }

    /// Despacha un request al primer handler cuyo método y path coinciden
    ///
    /// El path del request se normaliza antes de comparar: se recorta la
    /// query string y una única `/` final (salvo que el path sea `/`). Si
    /// ninguna ruta coincide, deja un 404 con cuerpo fijo en la respuesta.
    ///
    /// Retorna si algún handler corrió.
    pub fn handle(&self, request: &Request, response: &mut Response) -> bool {
        let path = Self::normalize_path(request.path());

        for route in &self.routes {
            if route.method == request.method() && route.path == path {
                (route.handler)(request, response);
                return true;
            }
        }

        response.set_status(StatusCode::NotFound);
        response.set_body("Resource not found");

        false
    }

    /// Cantidad de rutas registradas
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Verifica si la tabla está vacía
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Recorta query string y una `/` final (nunca reescribe `/`)
    fn normalize_path(path: &str) -> &str {
        let without_query = match path.find('?') {
            Some(query_start) => &path[..query_start],
            None => path,
        };

        if without_query.len() > 1 && without_query.ends_with('/') {
            &without_query[..without_query.len() - 1]
        } else {
            without_query
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
