//! Selecting the theme page for a request.
//!
//! Candidates are tried in this order, first match wins:
//!
//! 1. `base`
//! 2. `base/index`
//! 3. `base/loader`
//!
//! where `base` is the requested route, prefixed with
//! `unauthenticated/` if the client is not authenticated (and `index`
//! resp. `unauthenticated/index` for the empty route). If nothing
//! matched for an unauthenticated client, but one of the candidates
//! exists for authenticated clients, the `unauthenticated/login` page
//! is shown. Otherwise the `404` page.

use std::collections::HashMap;

use crate::theme::ThemeFile;

pub const LOGIN_PAGE: &str = "unauthenticated/login";
pub const NOT_FOUND_PAGE: &str = "404";
const UNAUTHENTICATED_PREFIX: &str = "unauthenticated/";

const CANDIDATE_SUFFIXES: &[&str] = &["", "/index", "/loader"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionRequest<'s> {
    /// URL path without the leading slash, possibly empty
    pub requested_route: &'s str,
    pub is_authenticated: bool,
}

/// The outcome of resolution. `Login` and `NotFound` carry the theme's
/// respective page if it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'p> {
    Page(&'p ThemeFile),
    Login(Option<&'p ThemeFile>),
    NotFound(Option<&'p ThemeFile>),
}

impl<'p> Resolution<'p> {
    /// The page to render, if any.
    pub fn page(&self) -> Option<&'p ThemeFile> {
        match *self {
            Resolution::Page(p) => Some(p),
            Resolution::Login(p) => p,
            Resolution::NotFound(p) => p,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Resolution::Page(_) => "page",
            Resolution::Login(_) => "login",
            Resolution::NotFound(_) => "not found",
        }
    }
}

/// The route key all candidates for a request are derived from.
pub fn base_route(requested_route: &str, is_authenticated: bool) -> String {
    match (requested_route.is_empty(), is_authenticated) {
        (true, true) => "index".into(),
        (true, false) => format!("{UNAUTHENTICATED_PREFIX}index"),
        (false, true) => requested_route.into(),
        (false, false) => format!("{UNAUTHENTICATED_PREFIX}{requested_route}"),
    }
}

/// The candidate route keys, in order of preference.
pub fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    CANDIDATE_SUFFIXES.iter().map(move |suffix| format!("{base}{suffix}"))
}

/// Pages indexed by route key. When several pages share a route key,
/// the last one wins.
pub struct PageResolver<'p> {
    pages: HashMap<&'p str, &'p ThemeFile>,
}

impl<'p> PageResolver<'p> {
    pub fn new(pages: &'p [ThemeFile]) -> Self {
        PageResolver {
            pages: pages.iter().map(|p| (p.route_key.as_str(), p)).collect()
        }
    }

    pub fn get(&self, route_key: &str) -> Option<&'p ThemeFile> {
        self.pages.get(route_key).copied()
    }

    fn first_candidate(&self, base: &str) -> Option<&'p ThemeFile> {
        candidates(base).find_map(|key| self.get(&key))
    }

    pub fn resolve(&self, request: ResolutionRequest) -> Resolution<'p> {
        let ResolutionRequest { requested_route, is_authenticated } = request;
        let base = base_route(requested_route, is_authenticated);
        if let Some(page) = self.first_candidate(&base) {
            return Resolution::Page(page)
        }
        if !is_authenticated {
            let authenticated_base = base_route(requested_route, true);
            if self.first_candidate(&authenticated_base).is_some() {
                return Resolution::Login(self.get(LOGIN_PAGE))
            }
        }
        Resolution::NotFound(self.get(NOT_FOUND_PAGE))
    }
}
