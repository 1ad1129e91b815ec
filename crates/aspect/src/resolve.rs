// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Configuration resolution
//!
//! Picks the [`ProfiledConfig`] for one call. Precedence:
//!
//! 1. metadata attached to the method itself
//! 2. the registry entry for `(declaring type, method)`
//! 3. the resolver's default
//!
//! A call without a method reference gets the default. Resolution has no side
//! effects; resolving the same call site twice yields the same config.

use std::sync::Arc;
use timing_aspect_profiled::{MethodRef, ProfiledConfig, ProfiledRegistry};

#[derive(Debug, Clone)]
pub struct ConfigResolver {
    registry: Option<Arc<ProfiledRegistry>>,
    default: Arc<ProfiledConfig>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self {
            registry: None,
            default: ProfiledConfig::default_instance(),
        }
    }
}

impl ConfigResolver {
    /// Resolver with no registry and the framework default config
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(mut self, registry: impl Into<Arc<ProfiledRegistry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Replace the fallback config
    pub fn with_default(mut self, config: impl Into<Arc<ProfiledConfig>>) -> Self {
        self.default = config.into();
        self
    }

    pub fn registry(&self) -> Option<&Arc<ProfiledRegistry>> {
        self.registry.as_ref()
    }

    pub fn default_config(&self) -> &Arc<ProfiledConfig> {
        &self.default
    }

    pub fn resolve(&self, method: Option<&MethodRef>) -> Arc<ProfiledConfig> {
        let Some(method) = method else {
            return Arc::clone(&self.default);
        };

        if let Some(config) = method.profiled() {
            return Arc::clone(config);
        }

        self.lookup(method.declaring_type(), method.name())
            .unwrap_or_else(|| Arc::clone(&self.default))
    }

    /// Resolve by name, for call sites without a [`MethodRef`]
    pub fn resolve_named(&self, declaring_type: &str, method: &str) -> Arc<ProfiledConfig> {
        self.lookup(declaring_type, method)
            .unwrap_or_else(|| Arc::clone(&self.default))
    }

    fn lookup(&self, declaring_type: &str, method: &str) -> Option<Arc<ProfiledConfig>> {
        self.registry.as_ref()?.lookup(declaring_type, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timing_aspect_profiled::FRAMEWORK_DEFAULT_TAG;

    fn registry() -> ProfiledRegistry {
        ProfiledRegistry::new()
            .with_method("shop::Orders", "place", ProfiledConfig::new("registered"))
            .unwrap()
    }

    #[test]
    fn test_missing_method_uses_default() {
        let resolver = ConfigResolver::new();
        let config = resolver.resolve(None);

        assert_eq!(config.tag, FRAMEWORK_DEFAULT_TAG);
        assert!(Arc::ptr_eq(&config, &ProfiledConfig::default_instance()));
    }

    #[test]
    fn test_method_metadata_wins() {
        let resolver = ConfigResolver::new().with_registry(registry());
        let method =
            MethodRef::new("shop::Orders", "place").with_profiled(ProfiledConfig::new("annotated"));

        assert_eq!(resolver.resolve(Some(&method)).tag, "annotated");
    }

    #[test]
    fn test_registry_before_default() {
        let resolver = ConfigResolver::new().with_registry(registry());

        let registered = MethodRef::new("shop::Orders", "place");
        let unknown = MethodRef::new("shop::Orders", "cancel");

        assert_eq!(resolver.resolve(Some(&registered)).tag, "registered");
        assert_eq!(resolver.resolve(Some(&unknown)).tag, FRAMEWORK_DEFAULT_TAG);
        assert_eq!(resolver.resolve_named("shop::Orders", "place").tag, "registered");
    }

    #[test]
    fn test_custom_default() {
        let resolver = ConfigResolver::new().with_default(ProfiledConfig::new("fallback"));
        assert_eq!(resolver.resolve(None).tag, "fallback");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = ConfigResolver::new().with_registry(registry());
        let method = MethodRef::new("shop::Orders", "place");

        assert_eq!(resolver.resolve(Some(&method)), resolver.resolve(Some(&method)));
    }
}
