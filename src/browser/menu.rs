// file: src/browser/menu.rs
// description: menu choices and plain-text rendering of stored services
// reference: interactive service browser over the local store

use crate::database::ServiceRecord;
use crate::nvd::Vulnerability;
use std::io::{self, Write};

pub const MENU: &str = "\nDatabase Interaction Menu:
1. List All Services
2. Search for a Service
3. View CPEs for a Service
4. Look Up Vulnerabilities for a Service
5. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ListServices,
    SearchServices,
    ViewCpes,
    LookupVulnerabilities,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::ListServices),
            "2" => Some(MenuChoice::SearchServices),
            "3" => Some(MenuChoice::ViewCpes),
            "4" => Some(MenuChoice::LookupVulnerabilities),
            "5" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

pub fn write_services<W: Write>(out: &mut W, services: &[ServiceRecord]) -> io::Result<()> {
    if services.is_empty() {
        return writeln!(out, "No services found.");
    }

    writeln!(
        out,
        "{:<5} {:<16} {:<18} {:<20} {:<24} {:<8} {}",
        "ID", "IP", "Service Name", "Product", "Version", "Protocol", "Port"
    )?;
    writeln!(out, "{}", "-".repeat(100))?;

    for service in services {
        writeln!(
            out,
            "{:<5} {:<16} {:<18} {:<20} {:<24} {:<8} {}",
            service.id,
            service.ip,
            service.service_name,
            service.product.as_deref().unwrap_or("-"),
            service.version.as_deref().unwrap_or("-"),
            service.protocol,
            service.port
        )?;
    }
    Ok(())
}

pub fn write_cpes<W: Write>(out: &mut W, service_id: i64, cpes: &[String]) -> io::Result<()> {
    writeln!(out, "CPEs for Service ID {}:", service_id)?;
    if cpes.is_empty() {
        writeln!(out, "  (none recorded)")?;
    }
    for cpe in cpes {
        writeln!(out, "  {}", cpe)?;
    }
    Ok(())
}

pub fn write_vulnerabilities<W: Write>(
    out: &mut W,
    cpe: &str,
    vulnerabilities: &[Vulnerability],
) -> io::Result<()> {
    writeln!(out, "Known vulnerabilities for {}:", cpe)?;
    if vulnerabilities.is_empty() {
        return writeln!(out, "  none found");
    }

    for vuln in vulnerabilities {
        match &vuln.published {
            Some(published) => writeln!(out, "  {} (published {})", vuln.id, published)?,
            None => writeln!(out, "  {}", vuln.id)?,
        }
        writeln!(out, "    {}", vuln.description)?;
    }
    Ok(())
}
