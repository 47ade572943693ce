//! Descriptor-driven emission of the proxy pair.

use relay_wire::{DescriptorError, MethodDescriptor, ServiceDescriptor, TypeKind};
use std::fmt::Write;
use thiserror::Error;
use tracing::debug;

/// Generation failed for a descriptor.
///
/// All of these are fatal to the offending descriptor only; nothing is
/// emitted for it.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The descriptor itself could not be built from its schema input.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// A service, method, or parameter name is not a usable Rust
    /// identifier.
    #[error("invalid identifier `{name}` for {position}")]
    InvalidIdentifier { name: String, position: String },

    /// The descriptor names no methods; there is nothing to proxy.
    #[error("descriptor for `{0}` has no methods")]
    EmptyDescriptor(String),

    /// Formatting into the output buffer failed.
    #[error("failed to render generated source: {0}")]
    Render(#[from] std::fmt::Error),
}

/// The two generated sources for one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPair {
    pub client: String,
    pub dispatcher: String,
}

/// Emits the client stub and dispatch adapter for one service descriptor.
///
/// Emission walks the descriptor in declaration order and nothing else, so
/// identical descriptors always produce byte-identical text.
pub struct ProxyGenerator<'a> {
    descriptor: &'a ServiceDescriptor,
}

impl<'a> ProxyGenerator<'a> {
    pub fn new(descriptor: &'a ServiceDescriptor) -> Self {
        Self { descriptor }
    }

    /// `<Service>Client`, the emitted stub type.
    #[must_use]
    pub fn client_type_name(&self) -> String {
        format!("{}Client", self.descriptor.name())
    }

    /// `<Service>Dispatch`, the emitted adapter type.
    #[must_use]
    pub fn dispatcher_type_name(&self) -> String {
        format!("{}Dispatch", self.descriptor.name())
    }

    /// `<Service>Service`, the implementation trait the adapter binds to.
    /// The trait itself is authored by hand, next to the implementation.
    #[must_use]
    pub fn service_trait_name(&self) -> String {
        format!("{}Service", self.descriptor.name())
    }

    /// Generate both sides of the pair.
    pub fn generate(&self) -> Result<GeneratedPair, GenerationError> {
        debug!(service = %self.descriptor.name(), "Generating proxy pair");
        let pair = GeneratedPair {
            client: self.generate_client()?,
            dispatcher: self.generate_dispatcher()?,
        };
        debug!(
            service = %self.descriptor.name(),
            client_bytes = pair.client.len(),
            dispatcher_bytes = pair.dispatcher.len(),
            "Proxy pair generated"
        );
        Ok(pair)
    }

    /// Generate the client stub source.
    pub fn generate_client(&self) -> Result<String, GenerationError> {
        self.validate()?;
        let service = self.descriptor.name();
        let client = self.client_type_name();
        let mut out = String::new();

        writeln!(out, "//! Client stub for the `{service}` service.")?;
        writeln!(out, "//!")?;
        writeln!(
            out,
            "//! Generated from the service descriptor; manual edits will be overwritten."
        )?;
        writeln!(out)?;
        writeln!(out, "use std::sync::Arc;")?;
        writeln!(out)?;
        writeln!(out, "use relay_bus::{{DeliveryOptions, MessageBus}};")?;
        writeln!(out, "use relay_proxy::{{ClientProxy, ProxyError}};")?;
        writeln!(out, "use relay_wire as wire;")?;
        writeln!(out)?;
        writeln!(out, "pub struct {client} {{")?;
        writeln!(out, "    inner: ClientProxy,")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "impl {client} {{")?;
        writeln!(out, "    pub fn new(")?;
        writeln!(out, "        bus: Arc<dyn MessageBus>,")?;
        writeln!(out, "        address: impl Into<String>,")?;
        writeln!(out, "        options: DeliveryOptions,")?;
        writeln!(out, "    ) -> Self {{")?;
        writeln!(out, "        Self {{")?;
        writeln!(out, "            inner: ClientProxy::new(bus, address, options),")?;
        writeln!(out, "        }}")?;
        writeln!(out, "    }}")?;
        writeln!(out)?;
        writeln!(
            out,
            "    /// Mark this stub closed; subsequent calls fail without sending."
        )?;
        writeln!(out, "    pub fn close(&self) {{")?;
        writeln!(out, "        self.inner.close();")?;
        writeln!(out, "    }}")?;

        for method in self.descriptor.methods() {
            writeln!(out)?;
            Self::client_method(&mut out, method)?;
        }

        writeln!(out, "}}")?;
        Ok(out)
    }

    /// Generate the dispatch adapter source.
    pub fn generate_dispatcher(&self) -> Result<String, GenerationError> {
        self.validate()?;
        let service = self.descriptor.name();
        let dispatch = self.dispatcher_type_name();
        let service_trait = self.service_trait_name();
        let mut out = String::new();

        writeln!(out, "//! Dispatch adapter for the `{service}` service.")?;
        writeln!(out, "//!")?;
        writeln!(
            out,
            "//! Generated from the service descriptor; manual edits will be overwritten."
        )?;
        writeln!(
            out,
            "//! Binds any `{service_trait}` implementation to the dispatcher runtime."
        )?;
        writeln!(out)?;
        writeln!(out, "use std::sync::Arc;")?;
        writeln!(out)?;
        writeln!(out, "use async_trait::async_trait;")?;
        writeln!(out, "use relay_proxy::ServiceAdapter;")?;
        writeln!(
            out,
            "use relay_wire::{{self as wire, ServiceFault, WireValue}};"
        )?;
        writeln!(out)?;
        writeln!(out, "pub struct {dispatch}<S> {{")?;
        writeln!(out, "    service: Arc<S>,")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "impl<S> {dispatch}<S> {{")?;
        writeln!(out, "    pub fn new(service: Arc<S>) -> Self {{")?;
        writeln!(out, "        Self {{ service }}")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "#[async_trait]")?;
        writeln!(out, "impl<S> ServiceAdapter for {dispatch}<S>")?;
        writeln!(out, "where")?;
        writeln!(out, "    S: {service_trait} + Send + Sync + 'static,")?;
        writeln!(out, "{{")?;
        writeln!(out, "    fn recognizes(&self, action: &str) -> bool {{")?;
        let actions = self
            .descriptor
            .methods()
            .iter()
            .map(|m| format!("\"{}\"", m.name()))
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(out, "        matches!(action, {actions})")?;
        writeln!(out, "    }}")?;
        writeln!(out)?;
        let any_params = self
            .descriptor
            .methods()
            .iter()
            .any(|m| !m.params().is_empty());
        let body_name = if any_params { "body" } else { "_body" };
        writeln!(
            out,
            "    async fn invoke(&self, action: &str, {body_name}: &wire::Body) -> Result<WireValue, ServiceFault> {{"
        )?;
        writeln!(out, "        match action {{")?;

        for method in self.descriptor.methods() {
            Self::dispatch_arm(&mut out, method)?;
        }

        writeln!(out, "            other => Err(ServiceFault::invalid_action(other)),")?;
        writeln!(out, "        }}")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        Ok(out)
    }

    fn client_method(out: &mut String, method: &MethodDescriptor) -> Result<(), GenerationError> {
        let name = method.name();

        let mut signature = String::new();
        for param in method.params() {
            write!(signature, ", {}: {}", param.name(), rust_type(param.kind()))?;
        }

        writeln!(
            out,
            "    pub async fn {name}(&self{signature}) -> Result<{}, ProxyError> {{",
            rust_type(method.returns())
        )?;
        if method.params().is_empty() {
            writeln!(out, "        let body = wire::Body::new();")?;
        } else {
            writeln!(out, "        let mut body = wire::Body::new();")?;
            for param in method.params() {
                writeln!(
                    out,
                    "        body.insert(\"{0}\".to_owned(), wire::{1}({0}));",
                    param.name(),
                    encode_fn(param.kind())
                )?;
            }
        }
        writeln!(
            out,
            "        let reply = self.inner.invoke(\"{name}\", body).await?;"
        )?;
        writeln!(out, "        Ok(wire::{}(&reply)?)", decode_fn(method.returns()))?;
        writeln!(out, "    }}")?;
        Ok(())
    }

    fn dispatch_arm(out: &mut String, method: &MethodDescriptor) -> Result<(), GenerationError> {
        let name = method.name();

        writeln!(out, "            \"{name}\" => {{")?;
        for param in method.params() {
            writeln!(
                out,
                "                let {0} = wire::{1}(body, \"{0}\")?;",
                param.name(),
                get_fn(param.kind())
            )?;
        }
        let args = method
            .params()
            .iter()
            .map(|p| p.name().to_owned())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            out,
            "                let value = self.service.{name}({args}).await?;"
        )?;
        writeln!(out, "                Ok(wire::{}(value))", encode_fn(method.returns()))?;
        writeln!(out, "            }}")?;
        Ok(())
    }

    fn validate(&self) -> Result<(), GenerationError> {
        check_identifier(self.descriptor.name(), "service name")?;

        if self.descriptor.methods().is_empty() {
            return Err(GenerationError::EmptyDescriptor(
                self.descriptor.name().to_owned(),
            ));
        }

        for method in self.descriptor.methods() {
            check_identifier(method.name(), "method name")?;
            for param in method.params() {
                check_identifier(
                    param.name(),
                    &format!("parameter of `{}`", method.name()),
                )?;
            }
        }
        Ok(())
    }
}

/// Rust surface type for a wire kind.
fn rust_type(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Bool => "bool",
        TypeKind::Byte => "i8",
        TypeKind::Short => "i16",
        TypeKind::Int32 => "i32",
        TypeKind::Int64 => "i64",
        TypeKind::Float32 => "f32",
        TypeKind::Float64 => "f64",
        TypeKind::String => "String",
        TypeKind::Object => "wire::Body",
        TypeKind::Array => "Vec<wire::WireValue>",
    }
}

/// Encoder in `relay_wire` for a kind.
fn encode_fn(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Bool => "encode_bool",
        TypeKind::Byte => "encode_byte",
        TypeKind::Short => "encode_short",
        TypeKind::Int32 => "encode_i32",
        TypeKind::Int64 => "encode_i64",
        TypeKind::Float32 => "encode_f32",
        TypeKind::Float64 => "encode_f64",
        TypeKind::String => "encode_string",
        TypeKind::Object => "encode_object",
        TypeKind::Array => "encode_array",
    }
}

/// Body accessor in `relay_wire` for a kind; carries the narrowing rules
/// for `byte` and `short`.
fn get_fn(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Bool => "get_bool",
        TypeKind::Byte => "get_byte",
        TypeKind::Short => "get_short",
        TypeKind::Int32 => "get_i32",
        TypeKind::Int64 => "get_i64",
        TypeKind::Float32 => "get_f32",
        TypeKind::Float64 => "get_f64",
        TypeKind::String => "get_string",
        TypeKind::Object => "get_object",
        TypeKind::Array => "get_array",
    }
}

/// Reply decoder in `relay_wire` for a kind.
fn decode_fn(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Bool => "decode_bool",
        TypeKind::Byte => "decode_byte",
        TypeKind::Short => "decode_short",
        TypeKind::Int32 => "decode_i32",
        TypeKind::Int64 => "decode_i64",
        TypeKind::Float32 => "decode_f32",
        TypeKind::Float64 => "decode_f64",
        TypeKind::String => "decode_string",
        TypeKind::Object => "decode_object",
        TypeKind::Array => "decode_array",
    }
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

fn check_identifier(name: &str, position: &str) -> Result<(), GenerationError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || RUST_KEYWORDS.contains(&name) {
        return Err(GenerationError::InvalidIdentifier {
            name: name.to_owned(),
            position: position.to_owned(),
        });
    }
    Ok(())
}
