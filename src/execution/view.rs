//! CREATE VIEW execution

use super::{Executable, ResultSet};
use crate::error::Result;
use crate::scope::Scope;

/// Registers a named statement in the executing scope. Later statements in
/// the same scope (or its children) resolve the name before any path.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateView {
    pub name: String,
    pub statement: Box<Executable>,
}

impl CreateView {
    pub(crate) fn execute(&self, scope: &mut Scope) -> Result<ResultSet> {
        tracing::debug!(name = %self.name, "registering view");
        scope.register_view(self.name.clone(), (*self.statement).clone());
        Ok(ResultSet::empty())
    }
}
