//! Lexical scope chain.
//!
//! Each `{ ... }` block owns one [`Environment`]; looking up a name walks
//! outward through `previous` until it is found or the chain is exhausted.

use indexmap::IndexMap;
use tacc_ir::Identifier;

#[derive(Debug, Default)]
pub struct Environment {
    table: IndexMap<String, Identifier>,
    previous: Option<Box<Environment>>,
}

impl Environment {
    /// Pushes a new, empty scope in front of `parent`.
    pub fn child_of(parent: Environment) -> Environment {
        Environment {
            table: IndexMap::new(),
            previous: Some(Box::new(parent)),
        }
    }

    /// Pops this scope, handing back its parent.
    ///
    /// Panics if called on the outermost scope; the parser never pops past
    /// the root it was constructed with.
    pub fn into_parent(self) -> Environment {
        *self.previous.expect("popped past the outermost scope")
    }

    pub fn put(&mut self, name: String, id: Identifier) {
        self.table.insert(name, id);
    }

    /// Looks up `name` in this scope, then each enclosing scope in turn.
    pub fn get(&self, name: &str) -> Option<&Identifier> {
        let mut env = self;
        loop {
            if let Some(id) = env.table.get(name) {
                return Some(id);
            }
            env = env.previous.as_deref()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tacc_lex::Type;

    fn id(name: &str) -> Identifier {
        Identifier {
            name: name.to_string(),
            ty: Type::int(),
            offset: 0,
        }
    }

    #[test]
    fn finds_name_declared_in_enclosing_scope() {
        let mut outer = Environment::default();
        outer.put("x".to_string(), id("x"));
        let inner = Environment::child_of(outer);
        assert_eq!(inner.get("x").unwrap().name, "x");
    }

    #[test]
    fn inner_declaration_shadows_outer() {
        let mut outer = Environment::default();
        outer.put("x".to_string(), id("x"));
        let mut inner = Environment::child_of(outer);
        inner.put(
            "x".to_string(),
            Identifier {
                name: "x".to_string(),
                ty: Type::float(),
                offset: 4,
            },
        );
        assert_eq!(inner.get("x").unwrap().ty, Type::float());
    }

    #[test]
    fn unknown_name_is_not_found() {
        let env = Environment::default();
        assert!(env.get("missing").is_none());
    }

    #[test]
    fn popping_restores_the_parent_scope() {
        let mut outer = Environment::default();
        outer.put("x".to_string(), id("x"));
        let inner = Environment::child_of(outer);
        let outer = inner.into_parent();
        assert_eq!(outer.get("x").unwrap().name, "x");
    }
}
