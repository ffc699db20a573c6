mod keys;
mod parse;
mod rewrite;

pub(crate) use keys::cmd_keys;
pub(crate) use parse::cmd_parse;
pub(crate) use rewrite::{cmd_rewrite, RewriteArgs};
pub(crate) use test::cmd_test;
