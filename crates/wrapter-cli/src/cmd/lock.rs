use crate::session::Session;
use wrapter_core::requirements::TOFU;

pub fn run(session: &Session) -> anyhow::Result<()> {
    session.require(&[TOFU])?;
    super::for_each_dir(session, "locking providers", |tc, dir| tc.providers_lock(dir))
}
