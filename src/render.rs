//! Turning a resolved page into the final markup.

use std::path::PathBuf;

use anyhow::{Result, Context, anyhow};

use crate::context::RenderContext;
use crate::engine::TemplateEngine;
use crate::theme::ThemeFile;


/// Third-party libraries client code in themes relies on.
pub const BOOTSTRAP_SCRIPT_TAGS: &[&str] = &[
    r#"<script src="https://cdnjs.cloudflare.com/ajax/libs/js-yaml/3.12.1/js-yaml.min.js"></script>"#,
    r#"<script crossorigin src="https://unpkg.com/react@16/umd/react.development.js"></script>"#,
    r#"<script crossorigin src="https://unpkg.com/react-dom@16/umd/react-dom.development.js"></script>"#,
    r#"<script src="https://cdn.jsdelivr.net/npm/vue@2.5.22/dist/vue.js"></script>"#,
];

/// Appended last, tells client code that the page is complete. Also
/// works with a client script that does not define `window._portal`.
pub const LOADED_MARKER_SCRIPT: &str =
    "<script>(window._portal = window._portal || {}).loaded = true</script>";

const EMBEDDED_CLIENT_SCRIPT: &str = include_str!("../assets/client.js");

/// Where the client bootstrap script comes from. A file is re-read
/// on every render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientScript {
    Embedded,
    File(PathBuf),
    Inline(String),
}

impl ClientScript {
    pub fn contents(&self) -> Result<String> {
        match self {
            ClientScript::Embedded => Ok(EMBEDDED_CLIENT_SCRIPT.into()),
            ClientScript::File(path) => std::fs::read_to_string(path).with_context(
                || anyhow!("reading client script {:?}", path)),
            ClientScript::Inline(s) => Ok(s.clone()),
        }
    }
}

impl Default for ClientScript {
    fn default() -> Self {
        ClientScript::Embedded
    }
}


#[derive(Debug, Clone, Default)]
pub struct Renderer {
    pub client_script: ClientScript,
}

impl Renderer {
    pub fn new(client_script: ClientScript) -> Self {
        Renderer { client_script }
    }

    /// Render `page` with `partials` available, against `context`. No
    /// page (the theme lacks the `404` or login page) gives the empty
    /// string.
    pub fn render(
        &self,
        engine: &mut impl TemplateEngine,
        page: Option<&ThemeFile>,
        partials: &[ThemeFile],
        context: &RenderContext,
    ) -> Result<String> {
        let page = match page {
            Some(page) => page,
            None => return Ok(String::new()),
        };
        for partial in partials {
            engine.register_partial(&partial.route_key, &partial.contents)?;
        }
        let body = engine.render_template(&page.route_key, &page.contents, context)?;
        let client_script = self.client_script.contents()?;

        let mut out = String::with_capacity(
            body.len() + client_script.len() + 1024);
        for tag in BOOTSTRAP_SCRIPT_TAGS {
            out.push_str(tag);
            out.push('\n');
        }
        out.push_str("<script>");
        out.push_str(&client_script);
        out.push_str("</script>");
        out.push_str(&body);
        out.push_str(LOADED_MARKER_SCRIPT);
        Ok(out)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use kstring::KString;
    use crate::context::ContextData;
    use crate::engine::HandlebarsEngine;

    fn file(key: &str, contents: &str) -> ThemeFile {
        ThemeFile {
            contents: contents.into(),
            filename: format!("{key}.hbs"),
            name: key.into(),
            route_key: KString::from_ref(key),
            path: PathBuf::from(format!("{key}.hbs")),
        }
    }

    fn ctx() -> RenderContext {
        RenderContext::new(&ContextData::new("http://localhost:3000", "basic-auth"), false)
    }

    #[test]
    fn t_missing_page_renders_empty() {
        let r = Renderer::default();
        let out = r.render(&mut HandlebarsEngine::new(), None, &[], &ctx()).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn t_order() {
        let r = Renderer::new(ClientScript::Inline("window._portal = {};".into()));
        let page = file("index", "<main>{{> header}}</main>");
        let partials = [file("header", "<h1>{{authData.authType}}</h1>")];
        let out = r.render(&mut HandlebarsEngine::new(), Some(&page), &partials, &ctx())
            .unwrap();
        let last_tag = BOOTSTRAP_SCRIPT_TAGS.last().unwrap();
        let i_tags = out.find(last_tag).unwrap();
        let i_client = out.find("<script>window._portal = {};</script>").unwrap();
        let i_body = out.find("<main><h1>basic-auth</h1></main>").unwrap();
        assert!(out.starts_with(BOOTSTRAP_SCRIPT_TAGS[0]));
        assert!(i_tags < i_client);
        assert!(i_client < i_body);
        assert!(out.ends_with(LOADED_MARKER_SCRIPT));
    }

    #[test]
    fn t_marker_with_replaced_client_script() {
        // the configured script need not create `window._portal`
        let r = Renderer::new(ClientScript::Inline("console.log(1);".into()));
        let page = file("index", "body");
        let out = r.render(&mut HandlebarsEngine::new(), Some(&page), &[], &ctx()).unwrap();
        assert!(out.ends_with(
            "body<script>(window._portal = window._portal || {}).loaded = true</script>"));
    }

    /// Records calls, to check registration happens before compiling.
    #[derive(Default)]
    struct RecordingEngine {
        partials: HashMap<String, String>,
        log: Vec<String>,
    }

    impl TemplateEngine for RecordingEngine {
        fn register_partial(&mut self, key: &str, source: &str) -> Result<()> {
            self.log.push(format!("partial {key}"));
            self.partials.insert(key.into(), source.into());
            Ok(())
        }
        fn render_template(&self, name: &str, source: &str, _: &RenderContext)
                           -> Result<String> {
            assert_eq!(self.log.len(), self.partials.len());
            Ok(format!("{name}:{source}:{}", self.partials.len()))
        }
    }

    #[test]
    fn t_partials_registered_first() {
        let r = Renderer::new(ClientScript::Inline(String::new()));
        let page = file("a/b", "body");
        let partials = [file("p1", "1"), file("p2", "2")];
        let mut e = RecordingEngine::default();
        let out = r.render(&mut e, Some(&page), &partials, &ctx()).unwrap();
        assert!(out.contains("a/b:body:2"));
        assert_eq!(e.log, vec!["partial p1", "partial p2"]);
    }

    #[test]
    fn t_client_script_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("core.js");
        std::fs::write(&p, "var fromfile = 1;").unwrap();
        assert_eq!(ClientScript::File(p).contents().unwrap(), "var fromfile = 1;");
        assert!(ClientScript::File(dir.path().join("missing.js")).contents().is_err());
        assert!(ClientScript::Embedded.contents().unwrap().contains("_portal"));
    }
}
