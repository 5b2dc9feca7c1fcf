use crate::session::Session;
use anyhow::Context;
use wrapter_core::backend::BackendConfig;
use wrapter_core::requirements::TOFU;

pub fn run(session: &Session) -> anyhow::Result<()> {
    session.require(&[TOFU])?;
    let cfg = session.load_config()?;
    let ctx = session.derive(&cfg)?;
    let backend = BackendConfig::from_env(&cfg, &ctx);

    let written = session
        .toolchain()
        .plan(&session.dir, &backend)
        .context("plan failed")?;
    match written {
        Some(path) => println!("Plan written to {}", path.display()),
        None if session.dry_run => {}
        None => println!("tofu show printed nothing; no plan JSON written"),
    }
    Ok(())
}
