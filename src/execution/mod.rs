//! Statement execution
//!
//! A compiled statement is an [`Executable`]; executing one against a scope
//! returns a [`ResultSet`]. Each statement kind lives in its own module.

pub mod describe;
pub mod insert;
pub mod result;
pub mod select;
pub mod view;

pub use describe::Describe;
pub use insert::Insert;
pub use result::{IoStatistics, ResultSet, Row};
pub use select::Select;
pub use view::CreateView;

use crate::error::Result;
use crate::scope::Scope;
use crate::sources::{DataResource, DataSourceFactory};
use crate::types::Expression;

/// A compiled statement, ready to run against a scope.
#[derive(Clone, Debug, PartialEq)]
pub enum Executable {
    Select(Select),
    Insert(Insert),
    CreateView(CreateView),
    Describe(Describe),
    Call(Call),
}

impl Executable {
    /// Executes the statement. The scope is the statement's own frame:
    /// CREATE VIEW registers into it, everything else only reads it.
    pub fn execute(&self, scope: &mut Scope) -> Result<ResultSet> {
        match self {
            Executable::Select(select) => select.execute(scope),
            Executable::Insert(insert) => insert.execute(scope),
            Executable::CreateView(view) => view.execute(scope),
            Executable::Describe(describe) => describe.execute(scope),
            Executable::Call(call) => call.execute(scope),
        }
    }
}

/// A bare function-call statement, e.g. `NOW()`. Produces a single row
/// holding the evaluated expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub expression: Expression,
}

impl Call {
    fn execute(&self, scope: &mut Scope) -> Result<ResultSet> {
        let value = self.expression.evaluate(scope)?;
        let row = Row::new(vec![(self.expression.label(), value)]);
        Ok(ResultSet::from_rows(vec![row]))
    }
}

/// Resolves a statement's input: registered views shadow path-addressed
/// sources, and paths go through variable expansion before the factory.
pub(crate) fn resolve_input(scope: &mut Scope, resource: &DataResource) -> Result<ResultSet> {
    let path = scope.expand(&resource.path);
    if let Some(view) = scope.lookup_view(&path).cloned() {
        let mut child = scope.child();
        return view.execute(&mut child);
    }
    DataSourceFactory::input_source(&path, &resource.hints)?.execute(scope)
}
