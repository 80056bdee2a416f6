//! launchd property lists for macOS launch agents.
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::config::paths::Paths;
use crate::config::services::ServiceDef;

enum Value {
    String(String),
    Bool(bool),
    Integer(u64),
    Array(Vec<String>),
    Dict(BTreeMap<String, String>),
}

/// `~/Library/LaunchAgents/<label>.plist`.
#[must_use]
pub fn plist_path(svc: &ServiceDef, paths: &Paths) -> PathBuf {
    paths.launch_agents.join(format!("{}.plist", svc.label))
}

/// Render the launch agent property list for `svc`.
///
/// Keys are emitted in sorted order; `KeepAlive` appears only when set and
/// `StartInterval` only for periodic services.
#[must_use]
pub fn generate_plist(svc: &ServiceDef, paths: &Paths) -> String {
    let logs = &paths.mac_logs;
    let mut entries: BTreeMap<&str, Value> = BTreeMap::new();

    entries.insert("Label", Value::String(svc.label.clone()));
    let mut program_arguments = vec![paths.expand_arg(&svc.program)];
    program_arguments.extend(svc.args.iter().map(|arg| paths.expand_arg(arg)));
    entries.insert("ProgramArguments", Value::Array(program_arguments));
    entries.insert("RunAtLoad", Value::Bool(svc.run_at_load));
    if let Some(dir) = &svc.working_directory {
        entries.insert(
            "WorkingDirectory",
            Value::String(paths.expand_tilde(dir).display().to_string()),
        );
    }
    if !svc.env.is_empty() {
        entries.insert("EnvironmentVariables", Value::Dict(svc.env.clone()));
    }
    if svc.keep_alive {
        entries.insert("KeepAlive", Value::Bool(true));
    }
    if let Some(interval) = svc.interval {
        entries.insert("StartInterval", Value::Integer(interval));
    }
    entries.insert(
        "StandardOutPath",
        Value::String(
            logs.join(format!("{}.log", svc.label))
                .display()
                .to_string(),
        ),
    );
    entries.insert(
        "StandardErrorPath",
        Value::String(
            logs.join(format!("{}.err.log", svc.label))
                .display()
                .to_string(),
        ),
    );

    let mut out = String::from(concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
        "\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
        "<plist version=\"1.0\">\n",
        "<dict>\n",
    ));
    for (key, value) in &entries {
        let _ = writeln!(out, "\t<key>{key}</key>");
        write_value(&mut out, value);
    }
    out.push_str("</dict>\n</plist>\n");
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => {
            let _ = writeln!(out, "\t<string>{}</string>", escape(s));
        }
        Value::Bool(true) => out.push_str("\t<true/>\n"),
        Value::Bool(false) => out.push_str("\t<false/>\n"),
        Value::Integer(n) => {
            let _ = writeln!(out, "\t<integer>{n}</integer>");
        }
        Value::Array(items) => {
            out.push_str("\t<array>\n");
            for item in items {
                let _ = writeln!(out, "\t\t<string>{}</string>", escape(item));
            }
            out.push_str("\t</array>\n");
        }
        Value::Dict(map) => {
            out.push_str("\t<dict>\n");
            for (k, v) in map {
                let _ = writeln!(out, "\t\t<key>{}</key>", escape(k));
                let _ = writeln!(out, "\t\t<string>{}</string>", escape(v));
            }
            out.push_str("\t</dict>\n");
        }
    }
}

/// Escape XML special characters.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
