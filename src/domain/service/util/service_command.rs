//! `docker service create` equivalent of a deployed service

use serde_json::Value;

use crate::core::client::orchestration::ServiceDescriptor;

/// Renders the CLI invocation that would recreate `service` from its spec.
pub fn service_command(service: &ServiceDescriptor) -> String {
    let spec = &service.spec;
    let container = &spec["TaskTemplate"]["ContainerSpec"];
    let mut args: Vec<String> = vec!["docker".into(), "service".into(), "create".into()];

    push_flag(&mut args, "name", service.name());

    match spec["Mode"]["Replicated"]["Replicas"].as_u64() {
        Some(replicas) => push_flag(&mut args, "replicas", &replicas.to_string()),
        None if spec["Mode"].get("Global").is_some() => push_flag(&mut args, "mode", "global"),
        None => {}
    }

    if let Some(labels) = spec["Labels"].as_object() {
        for (key, value) in labels {
            push_flag(&mut args, "label", &format!("{key}={}", value.as_str().unwrap_or_default()));
        }
    }

    for env in strings(&container["Env"]) {
        push_flag(&mut args, "env", env);
    }

    for constraint in strings(&spec["TaskTemplate"]["Placement"]["Constraints"]) {
        push_flag(&mut args, "constraint", constraint);
    }

    for network in attachments(spec) {
        push_flag(&mut args, "network", network);
    }

    for mount in list(&container["Mounts"]) {
        let mut parts = vec![
            format!("type={}", mount["Type"].as_str().unwrap_or("volume")),
            format!("target={}", mount["Target"].as_str().unwrap_or_default()),
        ];
        if let Some(source) = mount["Source"].as_str().filter(|s| !s.is_empty()) {
            parts.insert(1, format!("source={source}"));
        }
        if mount["ReadOnly"].as_bool() == Some(true) {
            parts.push("readonly".into());
        }
        push_flag(&mut args, "mount", &parts.join(","));
    }

    for port in list(&spec["EndpointSpec"]["Ports"]) {
        let mut parts = Vec::new();
        if let Some(published) = port["PublishedPort"].as_u64() {
            parts.push(format!("published={published}"));
        }
        parts.push(format!("target={}", port["TargetPort"].as_u64().unwrap_or_default()));
        if let Some(protocol) = port["Protocol"].as_str() {
            parts.push(format!("protocol={protocol}"));
        }
        push_flag(&mut args, "publish", &parts.join(","));
    }

    let entrypoint = strings(&container["Command"]).collect::<Vec<_>>();
    if !entrypoint.is_empty() {
        push_flag(&mut args, "entrypoint", &entrypoint.join(" "));
    }

    args.push(quote(service.image()));
    args.extend(strings(&container["Args"]).map(quote));

    args.join(" ")
}

fn push_flag(args: &mut Vec<String>, name: &str, value: &str) {
    args.push(format!("--{name}"));
    args.push(quote(value));
}

fn list(value: &Value) -> impl Iterator<Item = &Value> {
    value.as_array().into_iter().flatten()
}

fn strings(value: &Value) -> impl Iterator<Item = &str> {
    list(value).filter_map(Value::as_str)
}

/// Task-level attachments, falling back to the deprecated service-level list.
fn attachments(spec: &Value) -> impl Iterator<Item = &str> {
    let task_level = &spec["TaskTemplate"]["Networks"];
    let source = if task_level.as_array().is_some_and(|a| !a.is_empty()) {
        task_level
    } else {
        &spec["Networks"]
    };
    list(source).filter_map(|n| n["Target"].as_str())
}

/// Single-quotes anything a POSIX shell would split or expand.
fn quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=,@%+".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
