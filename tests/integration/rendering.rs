use parchment::{Catalog, Value};

use super::common::Fixture;

#[test]
fn test_concatenation() {
    let fx = Fixture::new();
    assert_eq!(fx.render("a.tpl", r#"{{ "a" ~ "b" ~ "c" }}"#), "abc");
}

#[test]
fn test_conditionals() {
    let fx = Fixture::new();
    assert_eq!(
        fx.render("a.tpl", "{% IF 1 == 1 and not (2 == 3) %}X{% ELSE %}Y{% ENDIF %}"),
        "X"
    );
    assert_eq!(
        fx.render("b.tpl", "{% IF false %}X{% ELSEIF true %}Y{% ELSE %}Z{% ENDIF %}"),
        "Y"
    );
}

#[test]
fn test_loop_binding() {
    let fx = Fixture::new();
    let path = fx.write("a.tpl", "{% FOR i IN items %}{{ i.name }}{% ENDFOR %}");
    let mut tpl = fx.engine.template(path);
    tpl.set(
        "items",
        Value::from(serde_json::json!([{ "name": "a" }, { "name": "b" }])),
    );
    assert_eq!(tpl.output().unwrap(), "ab");
}

#[test]
fn test_silent_miss() {
    let fx = Fixture::new();
    assert_eq!(
        fx.render("a.tpl", "<{{ nope }}>{% IF nope %}yes{% ELSE %}no{% ENDIF %}"),
        "<>no"
    );
}

#[test]
fn test_set_then_lang_scenario() {
    let catalog: Catalog = [("greeting", "hi")].into_iter().collect();
    let fx = Fixture::build(|b| b.translator(catalog));
    assert_eq!(
        fx.render("a.tpl", "{% SET total = 2 %}{{ total }}-{{ Lang.greeting }}"),
        "2-hi"
    );
}

#[test]
fn test_literal_output() {
    let fx = Fixture::new();
    assert_eq!(
        fx.render("a.tpl", "{{ 1.5 }}|{{ true }}|{{ false }}|{{ count([1, [2, 3]]) }}"),
        "1.5|1||2"
    );
}

#[test]
fn test_comments_and_noparse() {
    let fx = Fixture::new();
    assert_eq!(
        fx.render(
            "a.tpl",
            "a{# {{ hidden }} #}b{% NOPARSE %}{{ raw }}{% ENDNOPARSE %}c"
        ),
        "ab{{ raw }}c"
    );
}

#[test]
fn test_locals_shadow_globals() {
    let fx = Fixture::new();
    fx.engine.add_global("title", "Site");
    fx.engine.add_global("footer", "(c)");
    let path = fx.write("a.tpl", "{{ title }} {{ footer }}");
    let mut tpl = fx.engine.template(path);
    assert_eq!(tpl.output().unwrap(), "Site (c)");
    tpl.set("title", "Page");
    assert_eq!(tpl.output().unwrap(), "Page (c)");
}

#[test]
fn test_missing_source() {
    let fx = Fixture::new();
    let path = fx.dir.path().join("absent.tpl");
    let out = fx.engine.template(&path).output().unwrap();
    assert!(out.starts_with("Error loading template file ("));
    assert!(out.contains("absent.tpl"));
}

#[test]
fn test_strict_engine() {
    let fx = Fixture::with_config(|c| c.with_strict(true));
    let path = fx.write("a.tpl", "{{ nope }}");
    assert!(fx.engine.template(path).output().is_err());
}
