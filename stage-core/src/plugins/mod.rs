//! Bundled plugins.
//!
//! Installed in this order unless the builder opts out:
//! active class, circular stepping, content loader, hash sync.

mod active_class;
mod circular;
mod content;
mod hash;

pub use active_class::ActiveClass;
pub use circular::CircularStepping;
pub use content::ContentLoader;
pub use hash::HashSync;

use crate::hooks::Plugin;

/// The default plugin set, in installation order.
#[must_use]
pub fn default_plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(ActiveClass),
        Box::new(CircularStepping),
        Box::new(ContentLoader),
        Box::new(HashSync::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let names: Vec<_> = default_plugins().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["active-class", "circular", "content-loader", "hash"]);
    }
}
