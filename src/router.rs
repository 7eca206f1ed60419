//! Route by exact path, with a fallback for everything else.

use std::{sync::{Arc, Mutex}, collections::HashMap};

use kstring::KString;
use rouille::{Request, Response};

use crate::apachelog::Logs;
use crate::handler::Handler;
use crate::http_request_method::HttpRequestMethod;
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::path::requested_route;
use crate::webutils::errorpage_from_status;


pub struct Router {
    /// Keyed by the full URL path, e.g. `/_login`.
    pub exact: HashMap<KString, Arc<dyn Handler>>,
    /// Used when no exact entry exists or it refused the request.
    pub fallback: Option<Arc<dyn Handler>>,
    pub logs: Arc<Mutex<Logs>>,
}

impl Router {
    pub fn new(logs: Arc<Mutex<Logs>>) -> Router {
        Router {
            exact: Default::default(),
            fallback: None,
            logs,
        }
    }

    /// Using path *strings*, and chaining.
    pub fn add(&mut self, path: &str, handler: Arc<dyn Handler>) -> &mut Self {
        if let Some(_old) = self.exact.insert(KString::from_ref(path), handler) {
            log::warn!("duplicate entry for path {path:?}, old one dropped");
        }
        self
    }

    pub fn set_fallback(&mut self, handler: Arc<dyn Handler>) -> &mut Self {
        self.fallback = Some(handler);
        self
    }

    pub fn handle_request(
        &self,
        request: &Request,
        method: HttpRequestMethod,
    ) -> (Arc<Mutex<Logs>>, anyhow::Result<Response>)
    {
        let path = request.url();
        let route = requested_route(&path);
        if let Some(handler) = self.exact.get(path.as_str()) {
            match handler.call(request, method, route) {
                Ok(Some(response)) => return (self.logs.clone(), Ok(response)),
                Ok(None) => (),
                Err(e) => return (self.logs.clone(), Err(e)),
            }
        }
        if let Some(fallback) = self.fallback.as_ref() {
            match fallback.call(request, method, route) {
                Ok(Some(response)) =>
                    return (self.logs.clone(), Ok(response)),
                Ok(None) => (),
                Err(e) =>
                    return (self.logs.clone(), Err(e)),
            }
        }
        (self.logs.clone(),
         Ok(errorpage_from_status(HttpResponseStatusCode::NotFound404)))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use crate::handler::ExactFnHandler;

    #[derive(Debug)]
    struct Echo;
    impl Handler for Echo {
        fn call(&self, _: &Request, _: HttpRequestMethod, route: &str)
                -> anyhow::Result<Option<Response>> {
            if route == "decline" {
                return Ok(None)
            }
            Ok(Some(Response::text(format!("route={route}"))))
        }
    }

    fn body(r: Response) -> String {
        let (mut reader, _) = r.data.into_reader_and_size();
        let mut s = String::new();
        std::io::Read::read_to_string(&mut reader, &mut s).unwrap();
        s
    }

    fn get(router: &Router, url: &str) -> anyhow::Result<Response> {
        let req = Request::fake_http("GET", url, vec![], vec![]);
        router.handle_request(&req, HttpRequestMethod::GET).1
    }

    #[test]
    fn t_routing() {
        let mut r = Router::new(Logs::discard());
        r.add("/fixed", Arc::new(ExactFnHandler::new(
            |_: &Request| Ok(Response::text("fixed")))))
            .add("/broken", Arc::new(ExactFnHandler::new(
                |_: &Request| -> anyhow::Result<Response> { bail!("broken") })));
        assert_eq!(body(get(&r, "/fixed").unwrap()), "fixed");
        assert!(get(&r, "/broken").is_err());
        // no fallback yet
        assert_eq!(get(&r, "/other").unwrap().status_code, 404);
        r.set_fallback(Arc::new(Echo));
        assert_eq!(body(get(&r, "/docs/api/").unwrap()), "route=docs/api");
        assert_eq!(body(get(&r, "/").unwrap()), "route=");
        assert_eq!(body(get(&r, "/fixed").unwrap()), "fixed");
        assert_eq!(get(&r, "/decline").unwrap().status_code, 404);
    }
}
