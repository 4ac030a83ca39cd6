//! Installing the filter set into environments that already define filters.

use std::collections::BTreeMap;

use minijinja::Value;
use standout_scaffold::{register_filters, ConflictPolicy, EnvConfig, ScaffoldEnvironment};
use tracing_test::traced_test;

fn host_hash() -> Value {
    Value::from_function(|value: String| format!("host:{}", value))
}

#[test]
#[traced_test]
fn overwriting_a_host_filter_warns_once() {
    let mut env = ScaffoldEnvironment::empty();
    env.add_filter("hash", host_hash());

    let collisions = env.install(ConflictPolicy::Overwrite).to_vec();

    assert_eq!(collisions, vec!["hash"]);
    assert_eq!(
        env.render_str("{{ 'test2' | hash }}", ()).unwrap(),
        "109f4b3c50d7b0df729d299bc6f8e9ef9066971f"
    );
    assert!(logs_contain(
        "A filter named \"hash\" already exists in the template environment and will be overwritten"
    ));
    logs_assert(|lines: &[&str]| {
        match lines
            .iter()
            .filter(|line| line.contains("already exists in the template environment"))
            .count()
        {
            1 => Ok(()),
            n => Err(format!("expected one collision warning, saw {}", n)),
        }
    });
}

#[test]
#[traced_test]
fn keep_existing_reports_kept_filter() {
    let config = EnvConfig::from_yaml("on_conflict: keep_existing").unwrap();
    let env = ScaffoldEnvironment::from_config(&config).unwrap();

    assert_eq!(env.collisions(), ["bool"]);
    assert!(logs_contain("A filter named \"bool\" already exists"));
    assert!(logs_contain("will be kept"));
    // MiniJinja's own bool filter only knows truthiness.
    assert_eq!(
        env.render_str("{% if 'off' | bool %}1{% else %}0{% endif %}", ())
            .unwrap(),
        "1"
    );
}

#[test]
#[traced_test]
fn clean_install_does_not_warn() {
    let mut env = ScaffoldEnvironment::empty();
    assert!(env.install(ConflictPolicy::Overwrite).is_empty());
    assert!(!logs_contain("already exists"));
}

#[test]
fn plain_map_host() {
    let mut table: BTreeMap<String, Value> = BTreeMap::new();
    table.insert("quote".into(), Value::from("host"));
    table.insert("custom".into(), Value::from("host"));

    let collisions = register_filters(&mut table);

    assert_eq!(collisions, vec!["quote"]);
    assert_eq!(table["custom"], Value::from("host"));
    assert_ne!(table["quote"], Value::from("host"));
    assert_eq!(
        table.len(),
        standout_scaffold::filter_names().len() + 1
    );
}

#[test]
fn host_filters_keep_working_after_install() {
    let mut env = ScaffoldEnvironment::new();
    env.add_filter(
        "shout",
        Value::from_function(|value: String| value.to_uppercase()),
    );
    assert_eq!(
        env.render_str("{{ 'a b' | shout | quote }}", ()).unwrap(),
        "'A B'"
    );
}
