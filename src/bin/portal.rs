use std::process::exit;
use std::sync::Arc;

use anyhow::{Result, Context, anyhow};
use clap::Parser;

use portal::apachelog::Logs;
use portal::config::{Opts, PortalConfig};
use portal::portal::Portal;
use portal::render::Renderer;
use portal::server::{portal_router, run_server};
use portal::theme::ThemeKind;


fn setup_logging() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"))
        .init();
}

/// Read the theme once and report what it contains.
fn check(portal: &Portal) -> Result<()> {
    let theme = portal.read_theme()?;
    for kind in ThemeKind::members() {
        println!("{:>8}: {}", kind.dirname(), theme.files(*kind).len());
    }
    let dups = theme.validate();
    if !dups.is_empty() {
        println!("{} duplicate route keys (the last file wins)", dups.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    setup_logging();

    let opts = Opts::parse();
    let mut config = PortalConfig::from_env()?;
    config.apply_opts(&opts);

    let portal = Portal::new(
        config.directory.clone(),
        config.context_data.clone(),
        Renderer::new(config.client_script.clone()));

    if opts.check {
        if let Err(e) = check(&portal) {
            eprintln!("theme {:?}: {e:#}", config.directory);
            exit(1);
        }
        return Ok(())
    }

    // Fail early on a missing theme instead of on the first request
    portal.read_theme().with_context(
        || anyhow!("reading theme from {:?}", config.directory))?;
    config.client_script.contents()?;

    let logs = match &config.logdir {
        Some(dir) => Logs::open_in_basedir(dir)?,
        None => Logs::stderr(),
    };
    let router = Arc::new(portal_router(Arc::new(portal), logs));
    log::info!("serving theme {:?}", config.directory);
    run_server(&config.listen, router)
}
