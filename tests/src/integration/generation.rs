//! Generator output checked against the compiled fixture pair.
//!
//! The stub and adapter in `calculator.rs` are the expansion of what the
//! generator emits for the fixture descriptor. These tests pin the emitted
//! text to the shapes that expansion actually compiles with, so the two
//! cannot drift apart silently.

#[cfg(test)]
mod tests {
    use relay_codegen::{GenerationError, ProxyGenerator};
    use relay_wire::{MethodDescriptor, ServiceDescriptor};

    use crate::integration::calculator::descriptor;

    #[test]
    fn test_generation_is_deterministic() {
        let descriptor = descriptor();
        let first = ProxyGenerator::new(&descriptor).generate().unwrap();
        let second = ProxyGenerator::new(&descriptor).generate().unwrap();
        assert_eq!(first.client, second.client);
        assert_eq!(first.dispatcher, second.dispatcher);
    }

    #[test]
    fn test_client_matches_fixture_signatures() {
        let descriptor = descriptor();
        let client = ProxyGenerator::new(&descriptor).generate_client().unwrap();

        // One signature per fixture stub method, verbatim.
        for line in [
            "    pub async fn add(&self, a: i32, b: i32) -> Result<i32, ProxyError> {",
            "    pub async fn echo(&self, text: String) -> Result<String, ProxyError> {",
            "    pub async fn command(&self, device_id: i32, cmd: i8, amount: i16) -> Result<bool, ProxyError> {",
            "    pub async fn fail(&self, message: String) -> Result<bool, ProxyError> {",
            "    pub async fn slow_add(&self, a: i32, b: i32) -> Result<i32, ProxyError> {",
        ] {
            assert!(client.contains(line), "missing client line: {line}");
        }

        assert!(client.contains("pub struct CalculatorClient {"));
        assert!(client.contains("body.insert(\"cmd\".to_owned(), wire::encode_byte(cmd));"));
    }

    #[test]
    fn test_dispatcher_matches_fixture_arms() {
        let descriptor = descriptor();
        let dispatcher = ProxyGenerator::new(&descriptor)
            .generate_dispatcher()
            .unwrap();

        assert!(dispatcher
            .contains("matches!(action, \"add\" | \"echo\" | \"command\" | \"fail\" | \"slow_add\")"));
        for line in [
            "                let device_id = wire::get_i32(body, \"device_id\")?;",
            "                let cmd = wire::get_byte(body, \"cmd\")?;",
            "                let amount = wire::get_short(body, \"amount\")?;",
            "                let value = self.service.command(device_id, cmd, amount).await?;",
            "            other => Err(ServiceFault::invalid_action(other)),",
        ] {
            assert!(dispatcher.contains(line), "missing dispatcher line: {line}");
        }

        assert!(dispatcher.contains("S: CalculatorService + Send + Sync + 'static,"));
    }

    #[test]
    fn test_schema_signature_path_builds_same_descriptor() {
        let from_schema = ServiceDescriptor::new(
            "Calculator",
            vec![
                MethodDescriptor::from_signature("add", &[("a", "i32"), ("b", "i32")], "i32")
                    .unwrap(),
                MethodDescriptor::from_signature("echo", &[("text", "string")], "string").unwrap(),
                MethodDescriptor::from_signature(
                    "command",
                    &[("device_id", "i32"), ("cmd", "byte"), ("amount", "short")],
                    "bool",
                )
                .unwrap(),
                MethodDescriptor::from_signature("fail", &[("message", "string")], "bool")
                    .unwrap(),
                MethodDescriptor::from_signature("slow_add", &[("a", "i32"), ("b", "i32")], "i32")
                    .unwrap(),
            ],
        )
        .unwrap();

        assert_eq!(from_schema, descriptor());
    }

    #[test]
    fn test_unsupported_schema_type_fails_generation() {
        let err = MethodDescriptor::from_signature("watch", &[("since", "timestamp")], "bool")
            .map_err(GenerationError::from)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("watch"));
        assert!(message.contains("timestamp"));
    }
}
