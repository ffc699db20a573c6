use super::{Rewriter, IFDEF, IFNDEF};
use crate::ast::Constructor;
use crate::error::Result;

impl Rewriter<'_> {
    /// Filter the constructors of variant type `type_name`. A constructor
    /// survives when every `IFDEF`/`IFNDEF` attribute on it holds; survivors
    /// lose those attributes and keep all others.
    pub(super) fn constructors(
        &self,
        type_name: &str,
        constructors: Vec<Constructor>,
    ) -> Result<Vec<Constructor>> {
        let mut out = Vec::with_capacity(constructors.len());
        for mut c in constructors {
            let mut keep = true;
            for attr in &c.attributes {
                let holds = match attr.name.as_str() {
                    IFDEF => self.is_defined(attr.payload.as_ref(), IFDEF, &attr.loc)?,
                    IFNDEF => !self.is_defined(attr.payload.as_ref(), IFNDEF, &attr.loc)?,
                    _ => true,
                };
                keep &= holds;
            }
            if keep {
                c.attributes
                    .retain(|a| a.name != IFDEF && a.name != IFNDEF);
                out.push(c);
            } else {
                log::debug!("{}: constructor {}.{} dropped", c.loc, type_name, c.name);
            }
        }
        Ok(out)
    }
}
