//! Panel type registry.
//!
//! Panels are never constructed directly by the host: a type name is
//! registered once with its options and a factory, and the engine instantiates
//! panels of that type on demand (from `add_panel`, from a drag-to-create, or
//! while restoring a snapshot).

use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::{DockError, Result};
use crate::panel::{PLACEHOLDER_TYPE, PanelFlags, PanelInit};

/// Factory invoked to fill in a new panel's initial state.
pub type PanelFactory = Box<dyn Fn(&mut PanelInit)>;

/// Registration options of a panel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelTypeOptions {
    /// Hidden from [`PanelRegistry::panel_types`] unless private types are
    /// requested.
    pub private: bool,
    /// Removing a panel of this type retains it for reuse instead of
    /// destroying it.
    pub persistent: bool,
    /// Maximum number of live instances.
    pub limit: Option<usize>,
    /// Flags new instances start with.
    pub flags: PanelFlags,
}

impl Default for PanelTypeOptions {
    fn default() -> Self {
        Self {
            private: false,
            persistent: false,
            limit: None,
            flags: PanelFlags::STANDARD,
        }
    }
}

struct PanelType {
    options: PanelTypeOptions,
    factory: PanelFactory,
}

/// Registered panel types, in registration order.
#[derive(Default)]
pub struct PanelRegistry {
    order: Vec<String>,
    types: FxHashMap<String, PanelType>,
}

impl fmt::Debug for PanelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelRegistry")
            .field("types", &self.order)
            .finish()
    }
}

impl PanelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a panel type.
    ///
    /// Fails on an empty name, the reserved placeholder name, or a name that
    /// is already registered; the registry is unchanged on failure.
    pub fn register<F>(&mut self, name: &str, options: PanelTypeOptions, factory: F) -> Result<()>
    where
        F: Fn(&mut PanelInit) + 'static,
    {
        if name.is_empty() || name == PLACEHOLDER_TYPE {
            return Err(DockError::ReservedPanelType(name.to_owned()));
        }
        if self.types.contains_key(name) {
            return Err(DockError::DuplicatePanelType(name.to_owned()));
        }
        self.order.push(name.to_owned());
        self.types.insert(
            name.to_owned(),
            PanelType {
                options,
                factory: Box::new(factory),
            },
        );
        tracing::debug!(target: "dockyard.engine", panel_type = name, "registered panel type");
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    #[must_use]
    pub fn options(&self, name: &str) -> Option<&PanelTypeOptions> {
        self.types.get(name).map(|entry| &entry.options)
    }

    /// Registered type names in registration order.
    #[must_use]
    pub fn panel_types(&self, include_private: bool) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| {
                include_private
                    || self
                        .types
                        .get(name.as_str())
                        .is_some_and(|entry| !entry.options.private)
            })
            .map(String::as_str)
            .collect()
    }

    /// Run the type's factory over a default init seeded with its flags.
    pub fn instantiate(&self, name: &str) -> Result<(PanelInit, PanelTypeOptions)> {
        let entry = self
            .types
            .get(name)
            .ok_or_else(|| DockError::UnknownPanelType(name.to_owned()))?;
        let mut init = PanelInit {
            flags: entry.options.flags,
            ..PanelInit::default()
        };
        (entry.factory)(&mut init);
        Ok((init, entry.options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_order_and_privacy() {
        let mut registry = PanelRegistry::new();
        registry
            .register("console", PanelTypeOptions::default(), |_| {})
            .expect("console");
        registry
            .register(
                "inspector",
                PanelTypeOptions {
                    private: true,
                    ..PanelTypeOptions::default()
                },
                |_| {},
            )
            .expect("inspector");
        registry
            .register("assets", PanelTypeOptions::default(), |_| {})
            .expect("assets");

        assert_eq!(registry.panel_types(false), vec!["console", "assets"]);
        assert_eq!(
            registry.panel_types(true),
            vec!["console", "inspector", "assets"]
        );
    }

    #[test]
    fn duplicate_and_reserved_names_fail() {
        let mut registry = PanelRegistry::new();
        registry
            .register("console", PanelTypeOptions::default(), |_| {})
            .expect("first registration");
        assert_eq!(
            registry.register("console", PanelTypeOptions::default(), |_| {}),
            Err(DockError::DuplicatePanelType("console".into()))
        );
        assert_eq!(
            registry.register(PLACEHOLDER_TYPE, PanelTypeOptions::default(), |_| {}),
            Err(DockError::ReservedPanelType(PLACEHOLDER_TYPE.into()))
        );
        assert_eq!(registry.panel_types(true).len(), 1);
    }

    #[test]
    fn instantiate_runs_factory_over_type_flags() {
        let mut registry = PanelRegistry::new();
        let options = PanelTypeOptions {
            flags: PanelFlags::MOVEABLE,
            ..PanelTypeOptions::default()
        };
        registry
            .register("log", options, |init| {
                init.title = "Log".into();
                init.desired_size.width = 240.0;
            })
            .expect("register");

        let (init, got) = registry.instantiate("log").expect("instantiate");
        assert_eq!(init.title, "Log");
        assert_eq!(init.desired_size.width, 240.0);
        assert_eq!(init.flags, PanelFlags::MOVEABLE);
        assert_eq!(got, options);
        assert!(matches!(
            registry.instantiate("missing"),
            Err(DockError::UnknownPanelType(_))
        ));
    }
}
