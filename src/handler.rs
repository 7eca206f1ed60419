use std::fmt::Debug;
use std::sync::Arc;
use std::any::type_name;

use anyhow::Result;
use rouille::Request;
use rouille::Response;

use crate::auth::is_authenticated;
use crate::http_request_method::HttpRequestMethod;
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::portal::Portal;
use crate::webutils::htmlresponse;


pub trait Handler: Debug + Send + Sync {
    /// Returning Ok(None) means, the handler is refusing to handle
    /// the request; the router then tries the next one, or sends a
    /// 404 page. Err means, the handler has accepted to handle the
    /// request but failed to; this is answered with a 500 page.
    /// `route` is the URL path without the leading slash.
    fn call(
        &self,
        request: &Request,
        method: HttpRequestMethod,
        route: &str)
        -> Result<Option<Response>>;
}


// ------------------------------------------------------------------
/// A Handler for a fixed path, without access to the route.
#[derive(Clone, Copy)]
pub struct ExactFnHandler<F>
where F: Fn(&Request) -> Result<Response> + Send + Sync
{
    handler: F
}

impl<F> ExactFnHandler<F>
where F: Fn(&Request) -> Result<Response> + Send + Sync
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> Handler for ExactFnHandler<F>
where F: Fn(&Request) -> Result<Response> + Send + Sync
{
    fn call(
        &self,
        request: &Request,
        _method: HttpRequestMethod,
        _route: &str) -> Result<Option<Response>>
    {
        Ok(Some((self.handler)(request)?))
    }
}

impl<F> Debug for ExactFnHandler<F>
where F: Fn(&Request) -> Result<Response> + Send + Sync
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("ExactFnHandler({})",
                                 type_name::<F>()))
    }
}


// ------------------------------------------------------------------
/// Serves every route through the theme pipeline.
#[derive(Debug)]
pub struct ThemeHandler {
    portal: Arc<Portal>,
}

impl ThemeHandler {
    pub fn new(portal: Arc<Portal>) -> Self {
        ThemeHandler { portal }
    }
}

impl Handler for ThemeHandler {
    fn call(
        &self,
        request: &Request,
        _method: HttpRequestMethod,
        route: &str) -> Result<Option<Response>>
    {
        let html = self.portal.render_route(route, is_authenticated(request))?;
        Ok(Some(htmlresponse(HttpResponseStatusCode::OK200, html)))
    }
}


// ------------------------------------------------------------------

pub fn favicon_handler() -> Arc<dyn Handler> {
    Arc::new(ExactFnHandler::new(|_: &Request| Ok(Response::text(""))))
}

pub fn login_handler() -> Arc<dyn Handler> {
    Arc::new(ExactFnHandler::new(|_: &Request| Ok(crate::auth::login_response())))
}

pub fn logout_handler() -> Arc<dyn Handler> {
    Arc::new(ExactFnHandler::new(|_: &Request| Ok(crate::auth::logout_response())))
}
