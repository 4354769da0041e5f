//! Line-oriented parser for FRR's integrated configuration file
//!
//! The parser is deliberately lenient: it recognises a small set of
//! statements and ignores everything else. The only failure is a file that
//! cannot be read.

use std::path::Path;

use tracing::{debug, trace};

use crate::error::CollectionError;
use crate::model::{AreaSetting, InterfaceConfig, NetworkConfig, Redistribution, StaticRoute};

/// Parse the FRR configuration file at `path`
///
/// # Errors
///
/// Returns `CollectionError::ConfigNotFound` if the file does not exist and
/// `CollectionError::ConfigRead` if it cannot be read.
pub fn parse_config(path: impl AsRef<Path>) -> Result<NetworkConfig, CollectionError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| CollectionError::config_read(path.display().to_string(), e))?;

    let config = parse_config_str(&text);
    debug!(
        path = %path.display(),
        router_id = %config.router_id,
        interfaces = config.interfaces.len(),
        areas = config.areas.len(),
        "Parsed router configuration"
    );
    Ok(config)
}

/// Parse FRR configuration text
///
/// Recognised statements:
///
/// ```text
/// hostname <NAME>
/// frr version <VERSION>
/// no ipv4 forwarding
/// no ipv6 forwarding
/// service advanced-vty
/// ip route <CIDR> <NEXTHOP>
/// interface <NAME>
///  ip address <CIDR>
///  ip ospf area <ID>
///  ip ospf passive
///  ip ospf cost <N>
/// router ospf
///  ospf router-id <ID>
///  network <CIDR> area <ID>
///  redistribute <SOURCE> [metric-type <N>] [route-map <NAME>]
///  area <ID> <SETTING...>
/// exit
/// ```
///
/// Blank lines and `!` comments are skipped. An `interface` line closes the
/// previous interface block, as does a top-level `exit` and end of input.
/// The `router ospf` block runs until a line reading exactly `exit`.
#[must_use]
pub fn parse_config_str(text: &str) -> NetworkConfig {
    let mut config = NetworkConfig::default();
    let mut current: Option<InterfaceConfig> = None;
    let mut lines = text.lines().map(str::trim);

    while let Some(line) = lines.next() {
        if line.is_empty() || line.starts_with('!') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["interface", name, ..] => {
                if let Some(done) = current.take() {
                    config.interfaces.push(done);
                }
                current = Some(InterfaceConfig::named(*name));
            }
            ["router", "ospf", ..] => {
                parse_router_ospf(&mut lines, &mut config);
            }
            ["exit"] => {
                if let Some(done) = current.take() {
                    config.interfaces.push(done);
                }
            }
            ["hostname", name, ..] => config.hostname = (*name).to_string(),
            ["frr", "version", version, ..] => config.frr_version = (*version).to_string(),
            ["no", "ipv4", "forwarding", ..] => config.ipv4_forwarding_disabled = true,
            ["no", "ipv6", "forwarding", ..] => config.ipv6_forwarding_disabled = true,
            ["service", "advanced-vty", ..] => config.service_advanced_vty = true,
            ["ip", "route", prefix, next_hop, ..] => config.static_routes.push(StaticRoute {
                prefix: (*prefix).to_string(),
                next_hop: (*next_hop).to_string(),
            }),
            _ => {
                if let Some(iface) = current.as_mut() {
                    apply_interface_line(iface, &fields);
                } else {
                    trace!("Ignoring configuration line: {}", line);
                }
            }
        }
    }

    if let Some(done) = current.take() {
        config.interfaces.push(done);
    }

    config
}

fn apply_interface_line(iface: &mut InterfaceConfig, fields: &[&str]) {
    match fields {
        ["ip", "address", cidr, ..] => iface.ip_addresses.push((*cidr).to_string()),
        ["ip", "ospf", "area", area, ..] => iface.area = (*area).to_string(),
        ["ip", "ospf", "passive", ..] => iface.passive = true,
        ["ip", "ospf", "cost", cost, ..] => match cost.parse::<u32>() {
            Ok(cost) => iface.cost = cost,
            Err(_) => debug!("Ignoring invalid OSPF cost '{}' on {}", cost, iface.name),
        },
        _ => {}
    }
}

/// Consume the body of a `router ospf` block up to and including `exit`
fn parse_router_ospf<'a>(lines: &mut impl Iterator<Item = &'a str>, config: &mut NetworkConfig) {
    for line in lines.by_ref() {
        if line == "exit" {
            return;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["ospf", "router-id", id, ..] => config.router_id = (*id).to_string(),
            ["network", network, "area", area, ..] => config.add_network(*network, area),
            ["redistribute", source, rest @ ..] => {
                config.redistributions.push(Redistribution {
                    source: (*source).to_string(),
                    metric_type: option_value(rest, "metric-type"),
                    route_map: option_value(rest, "route-map"),
                });
            }
            ["area", id, setting @ ..] if !setting.is_empty() => {
                config.area_settings.push(AreaSetting {
                    id: (*id).to_string(),
                    setting: setting.join(" "),
                });
            }
            _ => {}
        }
    }
}

/// Value following `keyword` in `fields`, empty if absent
fn option_value(fields: &[&str], keyword: &str) -> String {
    fields
        .windows(2)
        .find(|pair| pair[0] == keyword)
        .map(|pair| pair[1].to_string())
        .unwrap_or_default()
}
