use crate::session::Session;
use wrapter_core::requirements::TERRAFORM_DOCS;

pub fn run(session: &Session) -> anyhow::Result<()> {
    session.require(&[TERRAFORM_DOCS])?;
    super::for_each_dir(session, "generating docs", |tc, dir| tc.docs(dir))
}
