// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Tag and message templates
//!
//! Templates are literal text with `{expr}` placeholders. An expression is a
//! root followed by dotted segments:
//!
//! | root | value |
//! |------|-------|
//! | `$0`, `$1`, ... | positional argument |
//! | `$return` | return value (successful calls only) |
//! | `$exception` | failure description (failed calls only) |
//! | `$methodName` | method name |
//! | `$class.name`, `$class.simpleName` | declaring type, full or last segment |
//! | `$depth`, `$threadName`, ... | any additional variable |
//!
//! Segments index JSON objects by key and arrays by position, so
//! `{$0.items.1.sku}` reaches into the first argument. Strings render without
//! quotes; other values render as compact JSON.
//!
//! Rendering never fails. An expression that cannot be resolved renders as
//! [`EL_ERROR`] and is reported through `tracing::debug!`. A `{` without a
//! closing `}` is literal text.

use serde_json::Value;
use std::borrow::Cow;
use timing_aspect_profiled::simple_name;

use crate::join_point::CallSite;

/// Rendered in place of an expression that could not be evaluated
pub const EL_ERROR: &str = "_EL_ERROR_";

/// Everything a template may refer to
pub struct TemplateContext<'a> {
    site: &'a dyn CallSite,
    returned: Option<&'a Value>,
    exception: Option<&'a str>,
}

impl<'a> TemplateContext<'a> {
    pub fn new(site: &'a dyn CallSite) -> Self {
        Self {
            site,
            returned: None,
            exception: None,
        }
    }

    /// Expose `$return`
    pub fn with_return(mut self, value: Option<&'a Value>) -> Self {
        self.returned = value;
        self
    }

    /// Expose `$exception`
    pub fn with_exception(mut self, description: &'a str) -> Self {
        self.exception = Some(description);
        self
    }

    /// Resolve one expression
    pub fn evaluate(&self, expression: &str) -> Option<Value> {
        let mut segments = expression.split('.');
        let root = self.root(segments.next()?, &mut segments)?;

        let mut current: &Value = &root;
        for segment in segments {
            current = step(current, segment)?;
        }

        Some(current.clone())
    }

    fn root<'s>(
        &self,
        name: &str,
        segments: &mut impl Iterator<Item = &'s str>,
    ) -> Option<Cow<'a, Value>> {
        let site = self.site;
        match name {
            "$return" => self.returned.map(Cow::Borrowed),
            "$exception" => self.exception.map(|e| Cow::Owned(Value::from(e))),
            "$methodName" => {
                let method = site.method_name();
                Some(Cow::Owned(if method.is_empty() {
                    Value::Null
                } else {
                    Value::from(method)
                }))
            }
            "$class" => {
                let declaring_type = site.declaring_type();
                let rendered = match segments.next() {
                    None | Some("name") => declaring_type,
                    Some("simpleName") => declaring_type.map(simple_name),
                    Some(_) => return None,
                };
                Some(Cow::Owned(rendered.map_or(Value::Null, Value::from)))
            }
            _ => {
                if let Some(index) = name.strip_prefix('$').and_then(|n| n.parse::<usize>().ok()) {
                    return site.parameters().get(index).map(Cow::Borrowed);
                }
                site.additional_variables().get(name).map(Cow::Borrowed)
            }
        }
    }
}

fn step<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}

/// Render `template` against `context`
///
/// With `evaluate` off the template is returned verbatim.
pub fn render(template: &str, context: &TemplateContext<'_>, evaluate: bool) -> String {
    if !evaluate || !template.contains('{') {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut first_failure: Option<&str> = None;

    while let Some(open) = rest.find('{') {
        let body = &rest[open + 1..];
        let Some(close) = body.find('}') else {
            break;
        };

        out.push_str(&rest[..open]);

        let expression = body[..close].trim();
        match context.evaluate(expression) {
            Some(value) => push_value(&mut out, &value),
            None => {
                out.push_str(EL_ERROR);
                first_failure.get_or_insert(expression);
            }
        }

        rest = &body[close + 1..];
    }
    out.push_str(rest);

    if let Some(expression) = first_failure {
        tracing::debug!(
            template,
            expression,
            method = context.site.method_name(),
            "Could not evaluate template expression"
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::Variables;
    use serde_json::json;

    struct Site {
        method: &'static str,
        declaring_type: Option<&'static str>,
        parameters: Vec<Value>,
        variables: Variables,
    }

    impl Site {
        fn new(parameters: Vec<Value>) -> Self {
            let mut variables = Variables::new();
            variables.insert("$depth".to_string(), json!(2));
            Self {
                method: "place",
                declaring_type: Some("shop::orders::OrderService"),
                parameters,
                variables,
            }
        }
    }

    impl CallSite for Site {
        fn parameters(&self) -> &[Value] {
            &self.parameters
        }

        fn method_name(&self) -> &str {
            self.method
        }

        fn declaring_type(&self) -> Option<&str> {
            self.declaring_type
        }

        fn additional_variables(&self) -> &Variables {
            &self.variables
        }

        fn additional_variables_mut(&mut self) -> &mut Variables {
            &mut self.variables
        }
    }

    fn render_with(site: &Site, template: &str) -> String {
        render(template, &TemplateContext::new(site), true)
    }

    #[test]
    fn test_literal_template() {
        let site = Site::new(vec![]);
        assert_eq!(render_with(&site, "orders.place"), "orders.place");
    }

    #[test]
    fn test_parameters_and_variables() {
        let site = Site::new(vec![json!("eu"), json!(42)]);

        assert_eq!(render_with(&site, "orders.{$0}.{$1}"), "orders.eu.42");
        assert_eq!(render_with(&site, "depth={ $depth }"), "depth=2");
    }

    #[test]
    fn test_class_and_method() {
        let site = Site::new(vec![]);

        assert_eq!(
            render_with(&site, "{$class.name}#{$methodName}"),
            "shop::orders::OrderService#place"
        );
        assert_eq!(render_with(&site, "{$class.simpleName}"), "OrderService");
        assert_eq!(render_with(&site, "{$class}"), "shop::orders::OrderService");
    }

    #[test]
    fn test_missing_type_and_method_render_null() {
        let mut site = Site::new(vec![]);
        site.declaring_type = None;
        site.method = "";

        assert_eq!(render_with(&site, "{$class.name}#{$methodName}"), "null#null");
    }

    #[test]
    fn test_nested_segments() {
        let site = Site::new(vec![json!({"items": [{"sku": "A-1"}, {"sku": "B-2"}]})]);

        assert_eq!(render_with(&site, "{$0.items.1.sku}"), "B-2");
        assert_eq!(render_with(&site, "{$0.items}"), r#"[{"sku":"A-1"},{"sku":"B-2"}]"#);
    }

    #[test]
    fn test_return_and_exception() {
        let site = Site::new(vec![]);
        let returned = json!({"id": 7});

        let success = TemplateContext::new(&site).with_return(Some(&returned));
        assert_eq!(render("id={$return.id}", &success, true), "id=7");

        let failure = TemplateContext::new(&site).with_exception("card declined");
        assert_eq!(render("{$exception}", &failure, true), "card declined");
        assert_eq!(render("{$return}", &failure, true), EL_ERROR);
    }

    #[test]
    fn test_unresolvable_expressions() {
        let site = Site::new(vec![json!("eu")]);

        assert_eq!(render_with(&site, "{$5}"), EL_ERROR);
        assert_eq!(render_with(&site, "{$0.region}"), EL_ERROR);
        assert_eq!(render_with(&site, "a{}b"), format!("a{EL_ERROR}b"));
        assert_eq!(render_with(&site, "{$class.module}"), EL_ERROR);
        assert_eq!(render_with(&site, "{unknown}"), EL_ERROR);
    }

    #[test]
    fn test_unclosed_brace_is_literal() {
        let site = Site::new(vec![json!("eu")]);
        assert_eq!(render_with(&site, "{$0}.{$0"), "eu.{$0");
    }

    #[test]
    fn test_evaluation_disabled() {
        let site = Site::new(vec![json!("eu")]);
        let context = TemplateContext::new(&site);

        assert_eq!(render("orders.{$0}", &context, false), "orders.{$0}");
    }
}
