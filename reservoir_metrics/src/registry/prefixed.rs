use std::sync::Arc;

use crate::{Metric, Registry, Result, StandardRegistry};

/// A view of another registry that puts a prefix in front of every name.
///
/// Prefixes accumulate: a "b." registry over an "a." registry stores "foo"
/// as "a.b.foo" in the root. [`Registry::each`] only visits names under the
/// accumulated prefix, and reports them by their full name in the root.
#[derive(Debug, Clone)]
pub struct PrefixedRegistry {
    underlying: Arc<dyn Registry>,
    prefix: String,
}

impl PrefixedRegistry {
    /// A prefixed view of a new, empty [`StandardRegistry`]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::child(Arc::new(StandardRegistry::new()), prefix)
    }

    /// A prefixed view of `parent`, which may itself be prefixed
    pub fn child(parent: Arc<dyn Registry>, prefix: impl Into<String>) -> Self {
        Self {
            underlying: parent,
            prefix: prefix.into(),
        }
    }

    fn prefixed(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }
}

impl Registry for PrefixedRegistry {
    fn register(&self, name: &str, metric: Metric) -> Result<()> {
        self.underlying.register(&self.prefixed(name), metric)
    }

    fn get_or_register_with(&self, name: &str, make: Box<dyn FnOnce() -> Metric + '_>) -> Metric {
        self.underlying
            .get_or_register_with(&self.prefixed(name), make)
    }

    fn get(&self, name: &str) -> Option<Metric> {
        self.underlying.get(&self.prefixed(name))
    }

    fn unregister(&self, name: &str) {
        self.underlying.unregister(&self.prefixed(name))
    }

    fn unregister_all(&self) {
        let prefix = self.prefix();
        let mut names = Vec::new();
        self.each(&mut |name, _| {
            if let Some(name) = name.strip_prefix(&prefix) {
                names.push(name.to_string());
            }
        });
        for name in &names {
            self.unregister(name);
        }
    }

    fn each(&self, visit: &mut dyn FnMut(&str, &Metric)) {
        let prefix = self.prefix();
        self.underlying.each(&mut |name, metric| {
            if name.starts_with(&prefix) {
                visit(name, metric);
            }
        })
    }

    fn prefix(&self) -> String {
        format!("{}{}", self.underlying.prefix(), self.prefix)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::{
        default_registry, Counter, MeterTicker, PrefixedRegistry, Registry, StandardRegistry,
    };

    fn names(registry: &dyn Registry) -> Vec<String> {
        let mut names = Vec::new();
        registry.each(&mut |name, _| names.push(name.to_string()));
        names.sort();
        names
    }

    fn root() -> Arc<StandardRegistry> {
        Arc::new(StandardRegistry::with_meter_ticker(MeterTicker::default()))
    }

    #[test_log::test]
    fn get_or_register_prefixes_names() {
        let registry = PrefixedRegistry::new("prefix.");
        registry.get_or_register("foo", Counter::default().into());
        assert_eq!(vec!["prefix.foo"], names(&registry));
    }

    #[test_log::test]
    fn child_writes_prefixed_names_to_parent() {
        let root = root();
        let child = PrefixedRegistry::child(root.clone(), "prefix.");
        child.get_or_register("foo", Counter::default().into());
        root.register("bar", Counter::default().into())
            .expect("name is free");
        assert_eq!(vec!["bar", "prefix.foo"], names(&*root));
        assert_eq!(vec!["prefix.foo"], names(&child));
    }

    #[test_log::test]
    fn register_and_get() {
        let child = PrefixedRegistry::child(root(), "prefix.");
        child
            .register("foo", Counter::default().into())
            .expect("name is free");
        assert!(child.get("foo").is_some());
        assert!(child.get("prefix.foo").is_none());
        assert!(child
            .register("foo", Counter::default().into())
            .is_err());
    }

    #[test_log::test]
    fn unregister() {
        let registry = PrefixedRegistry::new("prefix.");
        registry
            .register("foo", Counter::default().into())
            .expect("name is free");
        assert_eq!(vec!["prefix.foo"], names(&registry));
        registry.unregister("foo");
        assert!(names(&registry).is_empty());
    }

    #[test_log::test]
    fn nested_prefixes_accumulate() {
        let root = root();
        let outer = Arc::new(PrefixedRegistry::child(root.clone(), "prefix."));
        let inner = PrefixedRegistry::child(outer.clone(), "prefix2.");
        outer
            .register("foo2", Counter::default().into())
            .expect("name is free");
        inner
            .register("baz", Counter::default().into())
            .expect("name is free");
        root.register("bars", Counter::default().into())
            .expect("name is free");

        assert_eq!("prefix.prefix2.", inner.prefix());
        assert_eq!(vec!["prefix.prefix2.baz"], names(&inner));
        assert_eq!(
            vec!["prefix.foo2", "prefix.prefix2.baz"],
            names(&*outer)
        );
        assert!(inner.get("baz").is_some());
        assert!(outer.get("prefix2.baz").is_some());
    }

    #[test_log::test]
    fn unregister_all_only_touches_the_prefix() {
        let root = root();
        let outer = Arc::new(PrefixedRegistry::child(root.clone(), "a."));
        let inner = PrefixedRegistry::child(outer.clone(), "b.");
        inner
            .register("x", Counter::default().into())
            .expect("name is free");
        outer
            .register("y", Counter::default().into())
            .expect("name is free");
        root.register("z", Counter::default().into())
            .expect("name is free");

        inner.unregister_all();
        assert_eq!(vec!["a.y", "z"], names(&*root));
        outer.unregister_all();
        assert_eq!(vec!["z"], names(&*root));
    }

    #[test_log::test]
    fn child_of_the_default_registry() {
        let child = PrefixedRegistry::child(default_registry().clone(), "prefixed.child.test.");
        child
            .register("foo", Counter::default().into())
            .expect("name is free");
        assert_eq!(vec!["prefixed.child.test.foo"], names(&child));
        assert!(default_registry()
            .get("prefixed.child.test.foo")
            .is_some());
        child.unregister_all();
        assert!(names(&child).is_empty());
    }
}
