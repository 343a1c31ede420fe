// Systemd service listing via systemctl.

use std::time::Duration;

use anyhow::Context;

use crate::models::ServiceUnit;

pub async fn list_services(query_timeout: Duration) -> anyhow::Result<Vec<ServiceUnit>> {
    let out = super::run_command(
        "systemctl",
        &[
            "list-units",
            "--type=service",
            "--all",
            "--no-pager",
            "--no-legend",
            "--plain",
        ],
        query_timeout,
    )
    .await
    .context("systemctl not available")?;
    Ok(parse_list_units(&out))
}

/// Columns: UNIT LOAD ACTIVE SUB DESCRIPTION (description may contain spaces).
pub fn parse_list_units(out: &str) -> Vec<ServiceUnit> {
    out.lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let unit = parts.next()?.to_string();
            if !unit.ends_with(".service") {
                return None;
            }
            Some(ServiceUnit {
                unit,
                load: parts.next().unwrap_or_default().to_string(),
                active: parts.next().unwrap_or_default().to_string(),
                sub: parts.next().unwrap_or_default().to_string(),
                description: parts.collect::<Vec<_>>().join(" "),
            })
        })
        .collect()
}
