// file: src/browser/mod.rs
// description: interactive menu over the service store with optional vulnerability lookup
// reference: line-oriented prompt loop over injected reader and writer

pub mod menu;

use crate::database::ServiceStore;
use crate::error::{PipelineError, Result};
use crate::nvd::{NvdClient, cpe};
use menu::MenuChoice;
use std::io::{BufRead, Write};
use tracing::warn;

pub struct Browser<'a, R, W> {
    store: &'a ServiceStore,
    nvd: Option<&'a NvdClient>,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Browser<'a, R, W> {
    pub fn new(store: &'a ServiceStore, input: R, output: W) -> Self {
        Self {
            store,
            nvd: None,
            input,
            output,
        }
    }

    pub fn with_nvd(mut self, client: &'a NvdClient) -> Self {
        self.nvd = Some(client);
        self
    }

    /// Loops until the operator exits or input ends.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{}", menu::MENU)?;
            let Some(line) = self.prompt("Enter your choice: ")? else {
                writeln!(self.output)?;
                return Ok(());
            };

            let outcome = match MenuChoice::parse(&line) {
                Some(MenuChoice::ListServices) => self.list_services(),
                Some(MenuChoice::SearchServices) => self.search_services(),
                Some(MenuChoice::ViewCpes) => self.view_cpes(),
                Some(MenuChoice::LookupVulnerabilities) => self.lookup_vulnerabilities().await,
                Some(MenuChoice::Exit) => {
                    writeln!(self.output, "Exiting database interaction.")?;
                    return Ok(());
                }
                None => {
                    writeln!(self.output, "Invalid choice. Please try again.")?;
                    continue;
                }
            };

            match outcome {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(PipelineError::Io(e)) => return Err(e.into()),
                Err(e) => {
                    warn!("Browser action failed: {}", e);
                    writeln!(self.output, "Error: {}", e)?;
                }
            }
        }
    }

    /// `None` on end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// `Ok(None)` when input ended, `Ok(Some(None))` for an unusable id.
    fn prompt_service_id(&mut self) -> Result<Option<Option<i64>>> {
        let Some(line) = self.prompt("Enter service ID: ")? else {
            return Ok(None);
        };

        match line.parse::<i64>() {
            Ok(id) => Ok(Some(Some(id))),
            Err(_) => {
                writeln!(self.output, "Invalid service ID.")?;
                Ok(Some(None))
            }
        }
    }

    fn list_services(&mut self) -> Result<bool> {
        let services = self.store.list_services()?;
        menu::write_services(&mut self.output, &services)?;
        Ok(true)
    }

    fn search_services(&mut self) -> Result<bool> {
        let Some(name) = self.prompt("Enter service name to search: ")? else {
            return Ok(false);
        };

        let services = self.store.search_services(&name)?;
        writeln!(self.output, "Results for services matching '{}':", name)?;
        menu::write_services(&mut self.output, &services)?;
        Ok(true)
    }

    fn view_cpes(&mut self) -> Result<bool> {
        let Some(id) = self.prompt_service_id()? else {
            return Ok(false);
        };
        let Some(id) = id else {
            return Ok(true);
        };

        let cpes = self.store.cpes_for_service(id)?;
        menu::write_cpes(&mut self.output, id, &cpes)?;
        Ok(true)
    }

    async fn lookup_vulnerabilities(&mut self) -> Result<bool> {
        let Some(id) = self.prompt_service_id()? else {
            return Ok(false);
        };
        let Some(id) = id else {
            return Ok(true);
        };

        let Some(service) = self.store.service(id)? else {
            writeln!(self.output, "No service with ID {}.", id)?;
            return Ok(true);
        };

        let stored = self.store.cpes_for_service(id)?;
        let cpes = cpe::resolve(
            &stored,
            &service.service_name,
            service.product.as_deref(),
            service.version.as_deref(),
        );

        let Some(client) = self.nvd else {
            writeln!(self.output, "Vulnerability lookup is not configured. Identifiers:")?;
            for cpe in &cpes {
                writeln!(self.output, "  {}", cpe)?;
            }
            return Ok(true);
        };

        for cpe in &cpes {
            let vulnerabilities = client.lookup(cpe).await?;
            menu::write_vulnerabilities(&mut self.output, cpe, &vulnerabilities)?;
        }
        Ok(true)
    }
}
