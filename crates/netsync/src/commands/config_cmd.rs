//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let d = &cfg.defaults;
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", d.output);
    let _ = writeln!(out, "color = \"{}\"", d.color);
    let _ = writeln!(out, "insecure = {}", d.insecure);
    let _ = writeln!(out, "timeout = {}", d.timeout);
    let _ = writeln!(out, "default_site_id = {}", d.default_site_id);
    let _ = writeln!(out, "primary_manufacturer_id = {}", d.primary_manufacturer_id);
    let _ = writeln!(out, "generic_manufacturer_id = {}", d.generic_manufacturer_id);
    let _ = writeln!(out, "nexus_vtp = {}", d.nexus_vtp);
    let _ = writeln!(out, "facts_dir = \"{}\"", d.facts_dir.display());

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "netbox_url = \"{}\"", p.netbox_url);
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(site) = p.default_site_id {
            let _ = writeln!(out, "default_site_id = {site}");
        }
        if let Some(id) = p.primary_manufacturer_id {
            let _ = writeln!(out, "primary_manufacturer_id = {id}");
        }
        if let Some(id) = p.generic_manufacturer_id {
            let _ = writeln!(out, "generic_manufacturer_id = {id}");
        }
        if let Some(vtp) = p.nexus_vtp {
            let _ = writeln!(out, "nexus_vtp = {vtp}");
        }
        if let Some(ref dir) = p.facts_dir {
            let _ = writeln!(out, "facts_dir = \"{}\"", dir.display());
        }
    }

    out
}

/// Handle config subcommands.
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            output::print_output(format_config_redacted(&cfg).trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { url, token, force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            url.parse::<url::Url>().map_err(|e| CliError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            })?;

            let name = global.profile.as_deref().unwrap_or("default");
            let cfg = Config::with_profile(name, &url);
            if let Some(ref token) = token {
                netsync_config::store_token(name, token)?;
            }
            let written = config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("Wrote profile '{name}' to {}", written.display());
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn redacts_tokens() {
        let mut cfg = Config::with_profile("lab", "https://netbox.lab");
        if let Some(p) = cfg.profiles.get_mut("lab") {
            p.token = Some("0123456789abcdef".into());
            p.nexus_vtp = Some(true);
        }
        let shown = format_config_redacted(&cfg);
        assert!(shown.contains("token = \"****\""));
        assert!(!shown.contains("0123456789abcdef"));
        assert!(shown.contains("[profiles.lab]"));
        assert!(shown.contains("nexus_vtp = true"));
    }
}
