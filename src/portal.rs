//! The per-request pipeline: read the theme, resolve the page, render
//! it.

use std::path::PathBuf;

use anyhow::Result;

use crate::context::{ContextData, RenderContext};
use crate::engine::HandlebarsEngine;
use crate::render::Renderer;
use crate::resolver::{PageResolver, Resolution, ResolutionRequest};
use crate::theme::Theme;
use crate::time_guard;


/// Everything fixed at startup.
#[derive(Debug, Clone)]
pub struct Portal {
    pub theme_dir: PathBuf,
    pub context_data: ContextData,
    pub renderer: Renderer,
}

impl Portal {
    pub fn new(theme_dir: impl Into<PathBuf>, context_data: ContextData, renderer: Renderer)
               -> Self
    {
        Portal {
            theme_dir: theme_dir.into(),
            context_data,
            renderer,
        }
    }

    /// Read the theme as it is on disk right now, logging duplicate
    /// route keys.
    pub fn read_theme(&self) -> Result<Theme> {
        let theme = Theme::read(&self.theme_dir)?;
        for dup in theme.validate() {
            log::warn!("theme {:?}: {dup}", self.theme_dir);
        }
        Ok(theme)
    }

    /// Render the page for `requested_route` (URL path without the
    /// leading slash). Returns the empty string if resolution ends up
    /// at a page the theme does not have.
    pub fn render_route(&self, requested_route: &str, is_authenticated: bool)
                        -> Result<String>
    {
        time_guard!("render_route");
        let theme = self.read_theme()?;
        let resolver = PageResolver::new(&theme.pages);
        let resolution = resolver.resolve(ResolutionRequest {
            requested_route,
            is_authenticated,
        });
        match resolution {
            Resolution::Page(page) =>
                log::debug!("{requested_route:?} -> {:?}", page.route_key.as_str()),
            Resolution::Login(None) | Resolution::NotFound(None) =>
                log::warn!("{requested_route:?}: theme {:?} has no {} page, \
                            sending empty response",
                           self.theme_dir, resolution.kind_str()),
            Resolution::Login(Some(_)) | Resolution::NotFound(Some(_)) =>
                log::debug!("{requested_route:?} -> {}", resolution.kind_str()),
        }
        let context = RenderContext::new(&self.context_data, is_authenticated);
        let mut engine = HandlebarsEngine::new();
        self.renderer.render(&mut engine, resolution.page(), &theme.partials, &context)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ClientScript, LOADED_MARKER_SCRIPT};
    use crate::theme::tests::write_file;

    fn portal(dir: &std::path::Path) -> Portal {
        Portal::new(dir,
                    ContextData::new("http://localhost:3000", "basic-auth"),
                    Renderer::new(ClientScript::Inline("/*client*/".into())))
    }

    fn theme(dir: &std::path::Path) {
        write_file(dir, "partials/nav.hbs",
                   "<nav>{{#if isAuthenticated}}out{{else}}in{{/if}}</nav>");
        write_file(dir, "pages/index.hbs", "{{> nav}}home");
        write_file(dir, "pages/settings/index.hbs", "{{> nav}}settings");
        write_file(dir, "pages/unauthenticated/index.hbs", "{{> nav}}welcome");
        write_file(dir, "pages/unauthenticated/login.hbs", "{{> nav}}login");
        write_file(dir, "specs/api.yaml", "openapi: 3.0.0");
    }

    fn body(out: &str) -> &str {
        let start = out.find("/*client*/</script>").unwrap() + "/*client*/</script>".len();
        &out[start..out.len() - LOADED_MARKER_SCRIPT.len()]
    }

    #[test]
    fn t_render_route() {
        let dir = tempfile::tempdir().unwrap();
        theme(dir.path());
        let p = portal(dir.path());
        assert_eq!(body(&p.render_route("", false).unwrap()), "<nav>in</nav>welcome");
        assert_eq!(body(&p.render_route("", true).unwrap()), "<nav>out</nav>home");
        assert_eq!(body(&p.render_route("settings", false).unwrap()), "<nav>in</nav>login");
        assert_eq!(body(&p.render_route("settings", true).unwrap()), "<nav>out</nav>settings");
    }

    #[test]
    fn t_missing_404_page_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        theme(dir.path());
        let p = portal(dir.path());
        assert_eq!(p.render_route("nowhere", true).unwrap(), "");
    }

    #[test]
    fn t_reread_per_request() {
        let dir = tempfile::tempdir().unwrap();
        theme(dir.path());
        let p = portal(dir.path());
        assert_eq!(p.render_route("new", true).unwrap(), "");
        write_file(dir.path(), "pages/new.hbs", "fresh");
        assert_eq!(body(&p.render_route("new", true).unwrap()), "fresh");
    }

    #[test]
    fn t_unreadable_theme_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = portal(&dir.path().join("missing"));
        assert!(p.render_route("", true).is_err());
    }

    #[test]
    fn t_shipped_theme() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("themes/default");
        let p = Portal::new(&dir,
                            ContextData::new("http://localhost:3000", "basic-auth"),
                            Renderer::default());
        assert!(p.read_theme().unwrap().validate().is_empty());
        assert!(p.render_route("", false).unwrap().contains("<h1>Welcome</h1>"));
        let home = p.render_route("", true).unwrap();
        assert!(home.contains("<strong>APIs</strong>"));
        assert!(home.contains(r#"window["config"] = {"PORTAL_GUI_URL":"http://localhost:3000"};"#));
        assert!(p.render_route("settings", false).unwrap().contains("<h1>Log in</h1>"));
        assert!(p.render_route("settings", true).unwrap().contains("<h1>Settings</h1>"));
        assert!(p.render_route("docs/petstore", true).unwrap().contains("<h1>Petstore API</h1>"));
        assert!(p.render_route("docs/petstore", false).unwrap().contains("<h1>Log in</h1>"));
        assert!(p.render_route("nowhere", true).unwrap().contains("<h1>Not found</h1>"));
    }
}
