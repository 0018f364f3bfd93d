//! Agent command-line flags.
//!
//! # Responsibilities
//! - Flatten instance options into `--key=value` flags
//! - Fill in the gRPC reporter when the instance does not choose one
//! - Emit flags sorted by key so the output never depends on map order

use std::collections::BTreeMap;

use crate::model::{BackendInstance, Options};

/// Option selecting the agent's reporter.
pub const REPORTER_TYPE: &str = "reporter.type";

/// Option pointing the gRPC reporter at a collector.
pub const REPORTER_GRPC_HOST_PORT: &str = "reporter.grpc.host-port";

/// Reporter used when none is configured.
pub const DEFAULT_REPORTER: &str = "grpc";

/// Collector gRPC port.
pub const COLLECTOR_GRPC_PORT: u16 = 14250;

/// The collector endpoint of an instance, resolved through its headless service.
pub fn collector_host_port(instance: &BackendInstance) -> String {
    format!(
        "dns:///{}-collector-headless.{}:{}",
        instance.name,
        instance.namespace_or_default(),
        COLLECTOR_GRPC_PORT
    )
}

/// Merge options with reporter defaults and render them as sorted flags.
///
/// The gRPC endpoint default only applies when the reporter type is defaulted
/// too; an explicitly chosen reporter is configured entirely by its options.
pub fn build_args(options: &Options, host_port: &str) -> Vec<String> {
    let mut merged: BTreeMap<String, String> = options.flatten();

    if !merged.contains_key(REPORTER_TYPE) {
        merged.insert(REPORTER_TYPE.to_string(), DEFAULT_REPORTER.to_string());
        merged
            .entry(REPORTER_GRPC_HOST_PORT.to_string())
            .or_insert_with(|| host_port.to_string());
    }

    merged
        .into_iter()
        .map(|(key, value)| format!("--{key}={value}"))
        .collect()
}

/// Value of `--key=` in an argument list.
pub fn find_arg<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    let prefix = format!("--{key}=");
    args.iter().find_map(|arg| arg.strip_prefix(prefix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST_PORT: &str = "dns:///simple-collector-headless.default:14250";

    #[test]
    fn test_order_of_arguments() {
        let options: Options = [
            ("b-option", "b-value"),
            ("a-option", "a-value"),
            ("c-option", "c-value"),
        ]
        .into_iter()
        .collect();

        let args = build_args(&options, HOST_PORT);
        assert_eq!(
            args,
            vec![
                "--a-option=a-value".to_string(),
                "--b-option=b-value".to_string(),
                "--c-option=c-value".to_string(),
                format!("--reporter.grpc.host-port={HOST_PORT}"),
                "--reporter.type=grpc".to_string(),
            ]
        );
    }

    #[test]
    fn test_override_reporter() {
        let options: Options = [
            ("reporter.type", "thrift"),
            ("reporter.thrift.host-port", "collector:14267"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            build_args(&options, HOST_PORT),
            vec![
                "--reporter.thrift.host-port=collector:14267".to_string(),
                "--reporter.type=thrift".to_string(),
            ]
        );
    }

    #[test]
    fn test_user_host_port_wins() {
        let options: Options = [("reporter.grpc.host-port", "collector.obs:14250")]
            .into_iter()
            .collect();

        assert_eq!(
            build_args(&options, HOST_PORT),
            vec![
                "--reporter.grpc.host-port=collector.obs:14250".to_string(),
                "--reporter.type=grpc".to_string(),
            ]
        );
    }

    #[test]
    fn test_byte_wise_ordering() {
        let options: Options = [("a", "1"), ("B", "2"), ("a.b", "3"), ("a-b", "4")]
            .into_iter()
            .collect();

        let args = build_args(&options, HOST_PORT);
        let keys: Vec<&str> = args
            .iter()
            .map(|a| a.trim_start_matches("--").split('=').next().unwrap())
            .collect();
        assert_eq!(keys, vec!["B", "a", "a-b", "a.b", "reporter.grpc.host-port", "reporter.type"]);
    }

    #[test]
    fn test_nested_and_dotted_spellings_are_stable() {
        let options: Options = serde_json::from_str(
            r#"{
                "reporter.type": "thrift",
                "reporter": {"type": "grpc"},
                "a": "1", "b": "2", "c": "3", "d": "4"
            }"#,
        )
        .unwrap();

        let first = build_args(&options, HOST_PORT);
        assert_eq!(
            first,
            vec!["--a=1", "--b=2", "--c=3", "--d=4", "--reporter.type=thrift"]
        );
        for _ in 0..200 {
            let options: Options = serde_json::from_str(
                r#"{"reporter": {"type": "grpc"}, "reporter.type": "thrift", "a": "1", "b": "2", "c": "3", "d": "4"}"#,
            )
            .unwrap();
            assert_eq!(build_args(&options, HOST_PORT), first);
        }
    }

    #[test]
    fn test_collector_host_port() {
        let instance = BackendInstance::new("prod").with_namespace("observability");
        assert_eq!(
            collector_host_port(&instance),
            "dns:///prod-collector-headless.observability:14250"
        );
        assert_eq!(
            collector_host_port(&BackendInstance::new("simple")),
            HOST_PORT
        );
    }

    #[test]
    fn test_find_arg() {
        let args = vec!["--a=1".to_string(), "--ab=2".to_string()];
        assert_eq!(find_arg(&args, "a"), Some("1"));
        assert_eq!(find_arg(&args, "ab"), Some("2"));
        assert_eq!(find_arg(&args, "b"), None);
    }
}
