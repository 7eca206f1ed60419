//! The template engine capability the renderer depends on, and its
//! Handlebars implementation with the fixed set of helpers themes
//! can use:
//!
//! * `{{json value}}`: the value serialized as JSON
//! * `{{#if (eq a b)}}`: equality of two values
//! * `{{{{raw}}}} .. {{{{/raw}}}}`: the block contents unevaluated
//! * `{{currentYear}}`
//! * `{{markdown text}}`: markdown converted to HTML (not escaped)
//! * `{{setToWindow "name" value}}`: makes `value` available to
//!   client code as `window.name`, via an inline script

use anyhow::{Result, anyhow, Context as _};
use chrono::{Datelike, Utc};
use handlebars::{Context, Handlebars, Helper, HelperDef, HelperResult, Output,
                 RenderContext as HbRenderContext, RenderErrorReason, Renderable,
                 handlebars_helper};
use pulldown_cmark::{Parser, Options, html::push_html};
use serde_json::Value;

use crate::context::RenderContext;


pub trait TemplateEngine {
    /// Make `source` available as partial `{{> key}}`. Registering the
    /// same key again replaces the earlier partial.
    fn register_partial(&mut self, key: &str, source: &str) -> Result<()>;

    /// Compile `source` and evaluate it against `context`. `name` is
    /// only used in error messages.
    fn render_template(&self, name: &str, source: &str, context: &RenderContext)
                       -> Result<String>;
}


handlebars_helper!(json_helper: |v: Json| serde_json::to_string(v).unwrap_or_default());
handlebars_helper!(eq_helper: |a: Json, b: Json| a == b);

/// Block contents are passed through without evaluation.
struct RawHelper;

impl HelperDef for RawHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut HbRenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        match h.template() {
            Some(t) => t.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}

fn current_year_helper(
    _: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut HbRenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&Utc::now().year().to_string())?;
    Ok(())
}

pub fn markdown_to_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let mut html = String::new();
    push_html(&mut html, Parser::new_ext(text, options));
    html
}

fn markdown_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut HbRenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param = h.param(0).ok_or(RenderErrorReason::ParamNotFoundForIndex("markdown", 0))?;
    match param.value() {
        Value::String(s) => out.write(&markdown_to_html(s))?,
        Value::Null => (),
        other => out.write(&markdown_to_html(&other.to_string()))?,
    }
    Ok(())
}

/// JSON for embedding into a `<script>` element: `</` would end the
/// element early.
pub fn script_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".into())
        .replace("</", "<\\/")
}

/// An inline script making `value` available as `window[name]` on
/// the client.
pub fn client_value_script(name: &str, value: &Value) -> String {
    format!("<script>window[{}] = {};</script>",
            script_json(&Value::from(name)),
            script_json(value))
}

fn set_to_window_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut HbRenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let name = h.param(0)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("setToWindow", 0))?
        .value();
    let name = name.as_str()
        .ok_or(RenderErrorReason::InvalidParamType("setToWindow: name must be a string"))?;
    let value = h.param(1)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("setToWindow", 1))?
        .value();
    out.write(&client_value_script(name, value))?;
    Ok(())
}


pub struct HandlebarsEngine {
    hbs: Handlebars<'static>,
}

impl HandlebarsEngine {
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.register_helper("json", Box::new(json_helper));
        hbs.register_helper("eq", Box::new(eq_helper));
        hbs.register_helper("raw", Box::new(RawHelper));
        hbs.register_helper("currentYear", Box::new(current_year_helper));
        hbs.register_helper("markdown", Box::new(markdown_helper));
        hbs.register_helper("setToWindow", Box::new(set_to_window_helper));
        HandlebarsEngine { hbs }
    }
}

impl Default for HandlebarsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for HandlebarsEngine {
    fn register_partial(&mut self, key: &str, source: &str) -> Result<()> {
        self.hbs.register_partial(key, source).with_context(
            || anyhow!("registering partial {key:?}"))
    }

    fn render_template(&self, name: &str, source: &str, context: &RenderContext)
                       -> Result<String>
    {
        self.hbs.render_template(source, context).with_context(
            || anyhow!("rendering template {name:?}"))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextData;
    use serde_json::json;

    fn ctx(auth: bool) -> RenderContext {
        RenderContext::new(&ContextData::new("http://localhost:3000", "basic-auth"), auth)
    }

    fn render(source: &str) -> String {
        HandlebarsEngine::new().render_template("test", source, &ctx(true)).unwrap()
    }

    #[test]
    fn t_context_fields() {
        assert_eq!(render("{{config.PORTAL_GUI_URL}} {{authData.authType}} {{isAuthenticated}}"),
                   "http://localhost:3000 basic-auth true");
    }

    #[test]
    fn t_partials() {
        let mut e = HandlebarsEngine::new();
        e.register_partial("layout/header", "<h1>{{authData.authType}}</h1>").unwrap();
        e.register_partial("layout/header", "<h2>{{authData.authType}}</h2>").unwrap();
        assert_eq!(e.render_template("p", "{{> layout/header}}", &ctx(false)).unwrap(),
                   "<h2>basic-auth</h2>");
    }

    #[test]
    fn t_missing_partial_is_error() {
        let e = HandlebarsEngine::new();
        let err = e.render_template("page", "{{> nope}}", &ctx(false)).err().unwrap();
        assert!(format!("{err:#}").contains("rendering template \"page\""));
    }

    #[test]
    fn t_eq() {
        assert_eq!(render("{{#if (eq authData.authType \"basic-auth\")}}yes{{else}}no{{/if}}"),
                   "yes");
        assert_eq!(render("{{#if (eq isAuthenticated false)}}yes{{else}}no{{/if}}"),
                   "no");
    }

    #[test]
    fn t_json() {
        assert_eq!(render("{{{json authData}}}"), r#"{"authType":"basic-auth"}"#);
    }

    #[test]
    fn t_raw() {
        assert_eq!(render("{{{{raw}}}}{{vue_binding}}{{{{/raw}}}}"), "{{vue_binding}}");
    }

    #[test]
    fn t_current_year() {
        let y: i32 = render("{{currentYear}}").parse().unwrap();
        assert!(y >= 2024);
    }

    #[test]
    fn t_markdown() {
        let mut data = ContextData::default();
        data.config.insert("text".into(), json!("# Hi\n\n*there*"));
        let out = HandlebarsEngine::new()
            .render_template("md", "{{markdown config.text}}", &RenderContext::new(&data, false))
            .unwrap();
        assert_eq!(out, "<h1>Hi</h1>\n<p><em>there</em></p>\n");
    }

    #[test]
    fn t_set_to_window() {
        assert_eq!(render("{{setToWindow \"authData\" authData}}"),
                   r#"<script>window["authData"] = {"authType":"basic-auth"};</script>"#);
    }

    #[test]
    fn t_script_json_escapes_end_tag() {
        assert_eq!(script_json(&json!("</script>")), r#""<\/script>""#);
    }
}
