use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use rouille::{Server, Request, Response};

use crate::apachelog::{log_combined, Logs};
use crate::handler::{ThemeHandler, favicon_handler, login_handler, logout_handler};
use crate::http_request_method::HttpRequestMethod;
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::portal::Portal;
use crate::router::Router;
use crate::webutils::errorpage_from_status;
use crate::time_guard;


/// The portal's routes: the fixed auxiliary paths, and the theme for
/// everything else.
pub fn portal_router(portal: Arc<Portal>, logs: Arc<Mutex<Logs>>) -> Router {
    let mut router = Router::new(logs);
    router
        .add("/favicon.ico", favicon_handler())
        .add("/_login", login_handler())
        .add("/_logout", logout_handler())
        .set_fallback(Arc::new(ThemeHandler::new(portal)));
    router
}

/// Make a handler for Rouille's `Server`.
pub fn server_handler(
    router: Arc<Router>,
) -> impl Fn(&Request) -> Response + Send + Sync + 'static
{
    move |request: &Request| -> Response {
        time_guard!("server_handler"); // timings including infrastructure cost
        log_combined(request, || {
            let unimplemented = |methodname: &str|
                                 -> (Arc<Mutex<Logs>>, anyhow::Result<Response>) {
                log::warn!("method {methodname:?} not implemented");
                (router.logs.clone(),
                 Ok(errorpage_from_status(HttpResponseStatusCode::NotImplemented501)))
            };
            match HttpRequestMethod::from_str(request.method()) {
                Ok(method) if method.is_retrieval() =>
                    router.handle_request(request, method),
                Ok(method) => unimplemented(method.as_str()),
                Err(_) => unimplemented(request.method()),
            }
        })
    }
}

/// Run the server in the current thread; only returns on errors
/// starting it.
pub fn run_server(addr: &str, router: Arc<Router>) -> Result<()> {
    let server = Server::new(addr, server_handler(router)).map_err(
        |e| anyhow!("can't start server on {addr:?}: {e}"))?;
    log::info!("listening on http://{}/", server.server_addr());
    server.run();
    Ok(())
}
