//! End-to-end dashboard flow: templating model, panel dependency tracking,
//! and query interpolation working together.

use dashvar::{
    parse_templating, Interpolator, ScopedVars, StateSnapshot, VariableDependencySet,
};
use serde_json::json;

const TEMPLATING: &str = r#"{
    "list": [
        { "name": "env", "label": "Environment", "type": "custom",
          "current": { "text": "Production", "value": "prod" } },
        { "name": "host", "type": "query",
          "current": { "text": ["web-1", "web-2"], "value": ["web-1", "web-2"] } },
        { "name": "cluster", "type": "constant", "query": "eu-central" }
    ]
}"#;

const QUERY: &str = r#"sum(rate(http_requests_total{env="$env",host=~"${host:regex}"}[$__rate_interval])) by (code)"#;

#[test]
fn panel_dependencies_follow_the_panel_state() {
    let mut deps = VariableDependencySet::new(["expr", "legend"]);
    let panel = StateSnapshot::new()
        .set("expr", QUERY)
        .set("legend", "{{code}} in ${env}")
        .set("title", "HTTP traffic by $ignored")
        .shared();

    let names: Vec<_> = deps.names(&panel).iter().map(String::as_str).collect();
    assert_eq!(names, ["env", "host", "__rate_interval"]);
    assert!(deps.has_dependency_on("env"));
    assert!(!deps.has_dependency_on("ignored"));
}

#[test]
fn only_affected_panels_rescan() {
    let mut cpu = VariableDependencySet::new(["expr"]);
    let mut mem = VariableDependencySet::new(["expr"]);

    let cpu_panel = StateSnapshot::new().set("expr", r#"cpu{env="$env"}"#);
    let mem_panel = StateSnapshot::new().set("expr", r#"mem{host="$host"}"#);

    let cpu_snap = cpu_panel.clone().shared();
    let mem_snap = mem_panel.clone().shared();
    cpu.names(&cpu_snap);
    mem.names(&mem_snap);

    // Edit only the cpu panel's query.
    let cpu_snap2 = cpu_panel.with("expr", r#"cpu{env="$env",dc="$dc"}"#).shared();
    cpu.names(&cpu_snap2);
    mem.names(&mem_snap);

    assert_eq!(cpu.scan_count(), 2);
    assert_eq!(mem.scan_count(), 1);
    assert!(cpu.has_dependency_on("dc"));
}

#[test]
fn interpolation_resolves_model_variables_and_keeps_unknowns() {
    let (vars, errors) = parse_templating(TEMPLATING).unwrap();
    assert!(errors.is_empty(), "{errors:?}");

    let interp = Interpolator::new(&vars);
    let partial = interp.replace(QUERY);
    assert_eq!(
        partial,
        r#"sum(rate(http_requests_total{env="prod",host=~"(web\-1|web\-2)"}[$__rate_interval])) by (code)"#
    );

    // The built-in resolves once the request binds it.
    let mut scoped = ScopedVars::new();
    scoped.set("__rate_interval", "5m");
    let full = Interpolator::new(&vars).with_scoped(&scoped).replace(&partial);
    assert_eq!(
        full,
        r#"sum(rate(http_requests_total{env="prod",host=~"(web\-1|web\-2)"}[5m])) by (code)"#
    );
}

#[test]
fn legend_text_format_uses_display_text() {
    let (vars, _) = parse_templating(TEMPLATING).unwrap();
    let interp = Interpolator::new(&vars);
    assert_eq!(
        interp.replace("${env:text} on ${host:text}"),
        "Production on web-1 + web-2"
    );
}

#[test]
fn structured_panel_state_is_scanned_through_json() {
    let mut deps = VariableDependencySet::new(["targets"]);
    let panel = StateSnapshot::new()
        .set(
            "targets",
            json!([
                { "refId": "A", "expr": "up{env=\"$env\"}" },
                { "refId": "B", "expr": "node_load1{host=~\"$host\"}" }
            ]),
        )
        .shared();

    let names: Vec<_> = deps.names(&panel).iter().map(String::as_str).collect();
    assert_eq!(names, ["env", "host"]);
}

#[test]
fn editing_a_query_updates_dependencies_and_output() {
    let (vars, _) = parse_templating(TEMPLATING).unwrap();
    let mut deps = VariableDependencySet::new(["expr"]);

    let v1 = StateSnapshot::new().set("expr", r#"up{env="$env"}"#);
    let snap1 = v1.clone().shared();
    deps.names(&snap1);
    assert!(deps.has_dependency_on("env"));
    assert!(!deps.has_dependency_on("cluster"));

    let edited = r#"up{env="$env",cluster="$cluster"}"#;
    let snap2 = v1.with("expr", edited).shared();
    assert!(deps.names(&snap2).contains("cluster"));
    assert_eq!(deps.scan_count(), 2);

    let interp = Interpolator::new(&vars);
    assert_eq!(
        interp.replace(edited),
        r#"up{env="prod",cluster="eu-central"}"#
    );
}
