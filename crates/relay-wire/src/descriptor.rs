//! Service descriptor model consumed by the proxy generator.
//!
//! A descriptor is built once per interface (from static reflection, an IDL,
//! or a build-time schema) and is immutable afterwards. Method names double
//! as the action identifiers on the wire, so they must be unique within a
//! descriptor.

use crate::types::TypeKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A descriptor could not be built from its schema input.
///
/// These are generation-time failures: they abort code generation for the
/// offending method or descriptor and are never seen at runtime.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    /// Two methods share a name; the action tag could not disambiguate them.
    #[error("duplicate method name: {0}")]
    DuplicateMethod(String),

    /// A schema type name does not resolve to a wire-representable kind.
    #[error("method `{method}`: unsupported type `{type_name}` for {position}")]
    UnsupportedType {
        method: String,
        /// `parameter `name`` or `return value`.
        position: String,
        type_name: String,
    },
}

/// One typed parameter of a service method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    name: String,
    kind: TypeKind,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }
}

/// One method of a service interface: name, ordered parameters, return kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<ParameterDescriptor>,
    returns: TypeKind,
}

impl MethodDescriptor {
    pub fn new(
        name: impl Into<String>,
        params: Vec<ParameterDescriptor>,
        returns: TypeKind,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
        }
    }

    /// Build a method descriptor from schema type names.
    ///
    /// Each `(name, type)` pair and the return type are resolved through
    /// [`TypeKind::parse`]; an unresolvable name aborts with an error that
    /// identifies the offending type and position.
    pub fn from_signature(
        name: &str,
        params: &[(&str, &str)],
        returns: &str,
    ) -> Result<Self, DescriptorError> {
        let mut resolved = Vec::with_capacity(params.len());
        for (param_name, type_name) in params {
            let kind = TypeKind::parse(type_name).ok_or_else(|| {
                DescriptorError::UnsupportedType {
                    method: name.to_owned(),
                    position: format!("parameter `{param_name}`"),
                    type_name: (*type_name).to_owned(),
                }
            })?;
            resolved.push(ParameterDescriptor::new(*param_name, kind));
        }

        let returns = TypeKind::parse(returns).ok_or_else(|| {
            DescriptorError::UnsupportedType {
                method: name.to_owned(),
                position: "return value".to_owned(),
                type_name: returns.to_owned(),
            }
        })?;

        Ok(Self::new(name, resolved, returns))
    }

    /// The method name; also the action identifier on the wire.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn params(&self) -> &[ParameterDescriptor] {
        &self.params
    }

    #[must_use]
    pub fn returns(&self) -> TypeKind {
        self.returns
    }
}

/// An ordered set of methods identifying the interface being proxied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    name: String,
    methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    /// Build a descriptor, rejecting duplicate method names.
    pub fn new(
        name: impl Into<String>,
        methods: Vec<MethodDescriptor>,
    ) -> Result<Self, DescriptorError> {
        let mut seen = std::collections::HashSet::new();
        for method in &methods {
            if !seen.insert(method.name.as_str()) {
                return Err(DescriptorError::DuplicateMethod(method.name.clone()));
            }
        }
        Ok(Self {
            name: name.into(),
            methods,
        })
    }

    /// The interface name, e.g. `Calculator`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Look a method up by action identifier.
    #[must_use]
    pub fn method(&self, action: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == action)
    }
}
