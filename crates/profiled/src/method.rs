// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Method references carrying optional profiling metadata.

use std::sync::Arc;

use crate::config::ProfiledConfig;

/// Reference to an intercepted method
///
/// The interception layer hands one of these to the resolver. `profiled` is
/// the metadata attached to the method itself, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRef {
    declaring_type: String,
    name: String,
    profiled: Option<Arc<ProfiledConfig>>,
}

impl MethodRef {
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            profiled: None,
        }
    }

    /// Attach profiling metadata to the method
    pub fn with_profiled(mut self, config: impl Into<Arc<ProfiledConfig>>) -> Self {
        self.profiled = Some(config.into());
        self
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profiled(&self) -> Option<&Arc<ProfiledConfig>> {
        self.profiled.as_ref()
    }

    /// Last path segment of the declaring type (`billing::Invoice` -> `Invoice`)
    pub fn simple_type_name(&self) -> &str {
        simple_name(&self.declaring_type)
    }
}

/// Strip the module path from a type name
pub fn simple_name(type_name: &str) -> &str {
    type_name
        .rsplit(|c| c == ':' || c == '.')
        .find(|segment| !segment.is_empty())
        .unwrap_or(type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("billing::invoice::InvoiceService"), "InvoiceService");
        assert_eq!(simple_name("com.acme.Orders"), "Orders");
        assert_eq!(simple_name("Plain"), "Plain");
    }

    #[test]
    fn test_method_without_metadata() {
        let method = MethodRef::new("billing::InvoiceService", "issue");

        assert_eq!(method.declaring_type(), "billing::InvoiceService");
        assert_eq!(method.name(), "issue");
        assert_eq!(method.simple_type_name(), "InvoiceService");
        assert!(method.profiled().is_none());
    }

    #[test]
    fn test_method_with_metadata() {
        let method = MethodRef::new("billing::InvoiceService", "issue")
            .with_profiled(ProfiledConfig::new("invoice.issue"));

        assert_eq!(method.profiled().map(|p| p.tag.as_str()), Some("invoice.issue"));
    }
}
