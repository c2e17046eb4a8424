use parchment::TemplateError;

use super::common::Fixture;

#[test]
fn test_nested_includes() {
    let fx = Fixture::new();
    fx.write("header.tpl", "<h1>{{ site }}</h1>");
    fx.write("body.html", "<p>{{ text }}</p>");
    fx.engine.add_global("site", "S");
    let path = fx.write(
        "page.tpl",
        r#"{% INCLUDE "header.tpl" %}{% SET text = "T" %}{% INCLUDE "body.html" %}"#,
    );
    assert_eq!(fx.engine.template(path).output().unwrap(), "<h1>S</h1><p>T</p>");
}

#[test]
fn test_include_cycle_hits_depth_limit() {
    let fx = Fixture::with_config(|c| c.with_max_include_depth(5));
    fx.write("a.tpl", r#"a{% INCLUDE "b.tpl" %}"#);
    let b = fx.write("b.tpl", r#"b{% INCLUDE "a.tpl" %}"#);
    let err = fx.engine.template(b).output().unwrap_err();
    assert!(matches!(err, TemplateError::IncludeDepth { limit: 5, .. }), "{err}");
}
