//! Sidecar assembly and workload mutation.
//!
//! # Data Flow
//! ```text
//! Workload + BackendInstance + SidecarConfig
//!     → eligibility::needed (gate)
//!     → env::decorate on every existing container
//!     → env::build_env + args::build_args + resources::resolve_for_workload
//!     → sidecar container appended last
//! ```

use crate::config::SidecarConfig;
use crate::inject::args::{build_args, collector_host_port, find_arg};
use crate::inject::env::{build_env, decorate, defaults, APP_LABEL};
use crate::inject::resources::resolve_for_workload;
use crate::inject::{eligibility, selector, SIDECAR_NAME};
use crate::model::{BackendInstance, Container, ContainerPort, Routing, Workload};

/// Agent ports: name, default port, and the option that may move it.
const AGENT_PORTS: [(&str, u16, &str); 4] = [
    ("zk-compact-trft", 5775, "processor.zipkin-compact.server-host-port"),
    ("jg-compact-trft", 6831, "processor.jaeger-compact.server-host-port"),
    ("jg-binary-trft", 6832, "processor.jaeger-binary.server-host-port"),
    ("config-rest", 5778, "http-server.host-port"),
];

/// Attach a sidecar reporting to `instance`, or return the workload unchanged.
///
/// Unchanged when the workload does not need a sidecar, or when it names an
/// instance other than `instance`.
pub fn inject(mut workload: Workload, instance: &BackendInstance, config: &SidecarConfig) -> Workload {
    if !eligibility::needed(&workload) {
        tracing::trace!(workload = %workload.display_name(), "Sidecar not needed");
        return workload;
    }

    if let Some(Routing::Specific(name)) = selector::routing(&workload) {
        if name != instance.name {
            tracing::trace!(
                workload = %workload.display_name(),
                requested = %name,
                instance = %instance.name,
                "Workload requests a different instance, skipping"
            );
            return workload;
        }
    }

    let sidecar = container(&workload, instance, config);

    // Application containers are only decorated when the workload names its app.
    if workload.label(APP_LABEL).is_some() {
        let env_defaults = defaults(&workload);
        for existing in &mut workload.containers {
            decorate(existing, &env_defaults);
        }
    }

    tracing::debug!(
        workload = %workload.display_name(),
        instance = %instance.name,
        image = %sidecar.image,
        "Injecting sidecar"
    );
    workload.containers.push(sidecar);
    workload
}

/// Build the sidecar container for a workload.
pub fn container(workload: &Workload, instance: &BackendInstance, config: &SidecarConfig) -> Container {
    let args = build_args(&instance.options, &collector_host_port(instance));
    let limits = resolve_for_workload(workload, &config.cpu_limit, &config.memory_limit);

    Container {
        name: SIDECAR_NAME.to_string(),
        image: instance
            .image
            .clone()
            .filter(|image| !image.is_empty())
            .unwrap_or_else(|| config.image_reference()),
        env: build_env(workload),
        ports: ports(&args),
        args,
        resource_limits: limits.into_map(),
    }
}

/// Agent ports, honouring `host:port` overrides in the arguments.
pub fn ports(args: &[String]) -> Vec<ContainerPort> {
    AGENT_PORTS
        .iter()
        .map(|(name, default, option)| {
            let port = find_arg(args, option).and_then(port_of).unwrap_or(*default);
            ContainerPort::new(*name, port)
        })
        .collect()
}

fn port_of(host_port: &str) -> Option<u16> {
    host_port.rsplit_once(':')?.1.parse().ok()
}
