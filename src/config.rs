//! Startup configuration: environment variables, overridden by
//! command line options.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use crate::context::ContextData;
use crate::render::ClientScript;
use crate::util::getenv;

pub const DEFAULT_DIRECTORY: &str = "./themes/default/";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";
pub const DEFAULT_PORTAL_GUI_URL: &str = "http://localhost:3000";
pub const DEFAULT_AUTH_TYPE: &str = "basic-auth";


#[derive(Parser, Debug, Default)]
#[clap(name = "portal", about = "Serve a themed portal")]
pub struct Opts {
    /// Theme root directory, containing `pages`, `partials` and
    /// `specs` (default: $DIRECTORY, or ./themes/default/)
    #[clap(long)]
    pub directory: Option<String>,

    /// Address to listen on (default: $LISTEN_HTTP, or 127.0.0.1:3000)
    #[clap(long)]
    pub listen: Option<String>,

    /// Client bootstrap script to inject into every page instead of
    /// the built-in one (default: $CLIENT_SCRIPT)
    #[clap(long)]
    pub client_script: Option<String>,

    /// Read and validate the theme, then exit
    #[clap(long)]
    pub check: bool,
}


#[derive(Debug, Clone, PartialEq)]
pub struct PortalConfig {
    pub directory: PathBuf,
    pub listen: String,
    pub client_script: ClientScript,
    pub context_data: ContextData,
    /// If missing, logs go to stderr
    pub logdir: Option<PathBuf>,
}

impl PortalConfig {
    /// `lookup` gets variables by name, e.g. `util::getenv`.
    pub fn from_vars(lookup: impl Fn(&str) -> Result<Option<String>>) -> Result<Self> {
        let or = |name: &str, default: &str| -> Result<String> {
            Ok(lookup(name)?.unwrap_or_else(|| default.to_string()))
        };
        let mut context_data = ContextData::new(
            &or("PORTAL_GUI_URL", DEFAULT_PORTAL_GUI_URL)?,
            &or("AUTH_TYPE", DEFAULT_AUTH_TYPE)?);
        if let Some(path) = lookup("CONTEXT_FILE")? {
            context_data.merge(ContextData::from_file(Path::new(&path))?);
        }
        Ok(PortalConfig {
            directory: or("DIRECTORY", DEFAULT_DIRECTORY)?.into(),
            listen: or("LISTEN_HTTP", DEFAULT_LISTEN)?,
            client_script: match lookup("CLIENT_SCRIPT")? {
                Some(path) => ClientScript::File(path.into()),
                None => ClientScript::Embedded,
            },
            context_data,
            logdir: lookup("LOGDIR")?.map(PathBuf::from),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_vars(getenv)
    }

    pub fn apply_opts(&mut self, opts: &Opts) {
        if let Some(d) = &opts.directory {
            self.directory = d.into();
        }
        if let Some(l) = &opts.listen {
            self.listen = l.clone();
        }
        if let Some(c) = &opts.client_script {
            self.client_script = ClientScript::File(c.into());
        }
    }
}
