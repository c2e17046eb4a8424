use parchment::{HookRegistry, Value};

use super::common::Fixture;

fn suffix(
    tag: &'static str,
) -> impl Fn(&[Value]) -> Result<Value, parchment::CallError> + Send + Sync + 'static {
    move |args: &[Value]| {
        let base = args.first().map(Value::to_output_string).unwrap_or_default();
        Ok(Value::String(format!("{base}{tag}")))
    }
}

#[test]
fn test_filter_chaining() {
    let hooks = HookRegistry::new();
    hooks.add_fn("title", suffix("-one"));
    hooks.add_fn("title", suffix("-two"));
    let fx = Fixture::build(|b| b.hooks(hooks));
    assert_eq!(fx.render("a.tpl", r#"{% HOOK.title("t") %}"#), "t-one-two");
}

#[test]
fn test_action_output_and_late_registration() {
    let hooks = HookRegistry::new();
    let fx = Fixture::build(|b| b.hooks(hooks.clone()));
    let path = fx.write("a.tpl", "[{% HOOK.footer %}]");
    let tpl = fx.engine.template(path);
    assert_eq!(tpl.output().unwrap(), "[]");

    hooks.add_fn("footer", |_: &[Value]| Ok(Value::from("bye")));
    assert_eq!(tpl.output().unwrap(), "[bye]");
}
