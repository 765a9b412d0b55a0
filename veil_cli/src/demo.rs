//! Guided walkthrough of private fields and revocation.

use serde_json::Value;
use veil_core::{
    create_revocable, AccessOutcome, AccessPolicy, AuditLog, PropertyDescriptor, Record, Result,
    Symbol, ViewBuilder, ViewRegistry,
};

/// Render a view result the way the transcript prints it.
pub fn describe<T, F>(result: &Result<T>, render: F) -> String
where
    F: Fn(&T) -> String,
{
    match result {
        Ok(value) => render(value),
        Err(err) => format!("error: {}", err),
    }
}

pub fn describe_value(value: &Option<Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "undefined".to_string(),
    }
}

/// Run the walkthrough and return its transcript.
pub fn run(marker: char) -> Vec<String> {
    let mut out = Vec::new();

    let id = Symbol::new("id");
    let target = Record::new()
        .with("_jimous", "jimous is cool")
        .with("cool", "jimous also cool")
        .with(id.clone(), "sjfiosjfisoj12132");
    let audit = AuditLog::default();
    let view = ViewBuilder::new(target.clone())
        .policy(AccessPolicy::marker(marker))
        .audit(audit.clone())
        .build();
    let private = |name: &str| format!("{}{}", marker, name);

    out.push(format!("== private fields (marker '{}')", marker));

    let defined = view.define(
        private("name"),
        &PropertyDescriptor::new().with_value("jimous111"),
    );
    out.push(format!(
        "define {} -> {}",
        private("name"),
        describe(&defined, |_| "ok".into())
    ));

    for (key, value) in [("exposed", Value::Bool(true)), ("jimous", Value::from("jimous"))] {
        let written = view.write(key, value);
        out.push(format!("write {} -> {}", key, describe(&written, |_| "ok".into())));
    }

    let written = view.write(private("test"), "1212");
    out.push(format!(
        "write {} -> {}",
        private("test"),
        describe(&written, |_| "ok".into())
    ));

    let removed = view.remove(private("jimous"));
    out.push(format!(
        "remove {} -> {}",
        private("jimous"),
        describe(&removed, |removed| removed.to_string())
    ));

    out.push(format!(
        "keys -> {}",
        describe(&view.keys(), |keys| format!("{:?}", keys))
    ));
    out.push(format!(
        "list_keys -> {}",
        describe(&view.list_keys(), |keys| {
            let rendered: Vec<String> = keys.iter().map(|key| key.to_string()).collect();
            format!("{:?}", rendered)
        })
    ));

    for key in ["cool", "jimous", "somethingElse"] {
        out.push(format!(
            "read {} -> {}",
            key,
            describe(&view.read(key), describe_value)
        ));
    }
    out.push(format!(
        "read {} -> {}",
        id,
        describe(&view.read(id.clone()), describe_value)
    ));

    out.push(format!(
        "record exposed={} jimous={} {}={}",
        describe_value(&target.get("exposed")),
        describe_value(&target.get("jimous")),
        private("jimous"),
        describe_value(&target.get(private("jimous")))
    ));

    out.push(format!(
        "contains {} -> {}",
        private("jimous"),
        describe(&view.contains(private("jimous")), |b| b.to_string())
    ));
    out.push(format!(
        "has_own {} -> {}",
        private("jimous"),
        describe(&view.has_own(private("jimous")), |b| b.to_string())
    ));

    out.push(format!(
        "audit denied={} permitted={}",
        audit.count(&view.id(), AccessOutcome::Denied),
        audit.count(&view.id(), AccessOutcome::Permitted)
    ));

    out.push("== revocable view".to_string());

    let (revocable, token) = create_revocable(target.clone(), AccessPolicy::open());
    let written = revocable.write("isUsable", true);
    out.push(format!("write isUsable -> {}", describe(&written, |_| "ok".into())));
    out.push(format!(
        "read isUsable -> {}",
        describe(&revocable.read("isUsable"), describe_value)
    ));
    token.revoke();
    out.push("revoke".to_string());
    out.push(format!(
        "read isUsable -> {}",
        describe(&revocable.read("isUsable"), describe_value)
    ));

    out.push("== storage registry".to_string());

    let storage = Record::new();
    let registry = ViewRegistry::new(storage.clone(), AccessPolicy::marker(marker));
    let handle = registry.issue();
    let written = handle.write("session", "open");
    out.push(format!(
        "issue {} write session -> {}",
        handle.id(),
        describe(&written, |_| "ok".into())
    ));
    out.push(format!("revoke {} -> {}", handle.id(), registry.revoke(&handle.id())));
    out.push(format!(
        "read session -> {}",
        describe(&handle.read("session"), describe_value)
    ));
    out.push(format!(
        "storage session={}",
        describe_value(&storage.get("session"))
    ));

    out
}
