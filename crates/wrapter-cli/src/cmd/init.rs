use crate::session::Session;
use anyhow::Context;
use wrapter_core::backend::BackendConfig;
use wrapter_core::requirements::TOFU;

pub fn run(session: &Session) -> anyhow::Result<()> {
    session.require(&[TOFU])?;
    let cfg = session.load_config()?;
    let ctx = session.derive(&cfg)?;

    println!("Initializing backend for {} (region {})", ctx.state_key, ctx.region);
    let backend = BackendConfig::from_env(&cfg, &ctx);
    session
        .toolchain()
        .backend_init(&session.dir, &backend)
        .context("backend initialization failed")
}
