//! systemd user units and timers for Linux.
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::config::paths::Paths;
use crate::config::services::ServiceDef;

/// `~/.config/systemd/user/<label>.service`.
#[must_use]
pub fn unit_path(svc: &ServiceDef, paths: &Paths) -> PathBuf {
    paths.systemd_user.join(format!("{}.service", svc.label))
}

/// `~/.config/systemd/user/<label>.timer`.
#[must_use]
pub fn timer_path(svc: &ServiceDef, paths: &Paths) -> PathBuf {
    paths.systemd_user.join(format!("{}.timer", svc.label))
}

/// The unit that `enable`/`disable` act on: the timer for periodic services.
#[must_use]
pub fn primary_unit(svc: &ServiceDef) -> String {
    if svc.interval.is_some() {
        format!("{}.timer", svc.label)
    } else {
        format!("{}.service", svc.label)
    }
}

/// Render the `.service` unit for `svc`.
///
/// Periodic services are started by their timer, so their service unit is
/// `oneshot` without an `[Install]` section.
#[must_use]
pub fn generate_unit(svc: &ServiceDef, paths: &Paths) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[Unit]");
    let _ = writeln!(out, "Description=hostkit service: {}", svc.name);
    out.push('\n');

    let _ = writeln!(out, "[Service]");
    let kind = if svc.interval.is_some() { "oneshot" } else { "simple" };
    let _ = writeln!(out, "Type={kind}");
    let mut exec = vec![quote(&paths.expand_arg(&svc.program))];
    exec.extend(svc.args.iter().map(|a| quote(&paths.expand_arg(a))));
    let _ = writeln!(out, "ExecStart={}", exec.join(" "));
    if let Some(dir) = &svc.working_directory {
        let _ = writeln!(
            out,
            "WorkingDirectory={}",
            quote(&paths.expand_arg(dir))
        );
    }
    for (key, value) in &svc.env {
        let _ = writeln!(out, "Environment={}", quote(&format!("{key}={value}")));
    }
    if svc.keep_alive && svc.interval.is_none() {
        let _ = writeln!(out, "Restart=always");
    }

    if svc.interval.is_none() {
        out.push('\n');
        let _ = writeln!(out, "[Install]");
        let _ = writeln!(out, "WantedBy=default.target");
    }
    out
}

/// Render the `.timer` unit, or `None` when the service is not periodic.
#[must_use]
pub fn generate_timer(svc: &ServiceDef) -> Option<String> {
    let interval = svc.interval?;
    let mut out = String::new();
    let _ = writeln!(out, "[Unit]");
    let _ = writeln!(out, "Description=hostkit timer: {}", svc.name);
    out.push('\n');
    let _ = writeln!(out, "[Timer]");
    if svc.run_at_load {
        let _ = writeln!(out, "OnActiveSec=0s");
    }
    let _ = writeln!(out, "OnBootSec={interval}s");
    let _ = writeln!(out, "OnUnitActiveSec={interval}s");
    let _ = writeln!(out, "Unit={}.service", svc.label);
    out.push('\n');
    let _ = writeln!(out, "[Install]");
    let _ = writeln!(out, "WantedBy=timers.target");
    Some(out)
}

/// Quote a word for a unit file: `%` specifiers are escaped and words with
/// whitespace or quotes are wrapped in double quotes.
fn quote(word: &str) -> String {
    let escaped = word.replace('%', "%%");
    if escaped.is_empty() || escaped.contains(|c: char| c.is_whitespace() || c == '"' || c == '\\')
    {
        format!("\"{}\"", escaped.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        escaped
    }
}
