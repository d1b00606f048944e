//! `slipway formation`: plan the Formation for an image.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::{AppContext, interrupt_token};
use crate::application::ports::{ExtractContext, FormationStore};
use crate::application::services::deploy::plan_formation;
use crate::application::services::extractor::default_chain;
use crate::domain::{App, AppExposure, Formation, Image};
use crate::infra::formation_file::FormationFile;
use crate::output::TerminalReporter;

/// Arguments for the formation command.
#[derive(Args)]
pub struct FormationArgs {
    /// Image reference, e.g. `acme/web:v42`
    pub image: Image,

    /// Application name (defaults to the last path segment of the repository)
    #[arg(long)]
    pub app: Option<String>,

    /// Formation currently deployed; its quantities and constraints are kept
    #[arg(long, value_name = "FILE")]
    pub previous: Option<PathBuf>,

    /// Save the planned Formation (also read as --previous when that is unset)
    #[arg(long, value_name = "FILE")]
    pub write: Option<PathBuf>,

    /// Expose the web process publicly over https
    #[arg(long, conflicts_with = "private")]
    pub public: bool,

    /// Keep the web process internal over http
    #[arg(long)]
    pub private: bool,

    /// Certificate attached to external listeners
    #[arg(long, value_name = "ID")]
    pub cert: Option<String>,
}

impl FormationArgs {
    fn app(&self, app: &AppContext) -> App {
        let name = self
            .app
            .clone()
            .unwrap_or_else(|| default_app_name(&self.image).to_owned());
        let mut policy = app.default_app(&name);
        if self.public {
            policy.exposure = AppExposure::Public;
        } else if self.private {
            policy.exposure = AppExposure::Private;
        }
        if let Some(cert) = &self.cert {
            policy.cert = Some(cert.clone());
        }
        policy
    }

    fn previous_store(&self) -> Option<FormationFile> {
        self.previous
            .as_ref()
            .or(self.write.as_ref())
            .map(FormationFile::new)
    }
}

/// `acme/web` → `web`.
#[must_use]
pub fn default_app_name(image: &Image) -> &str {
    image
        .repository
        .rsplit('/')
        .next()
        .unwrap_or(&image.repository)
}

/// Run the formation command.
///
/// # Errors
///
/// Returns an error if extraction, planning or saving fails.
pub async fn run(app: &AppContext, args: &FormationArgs) -> Result<()> {
    let policy = args.app(app);
    let previous = match args.previous_store() {
        Some(store) => store.load()?,
        None => None,
    };

    let runtime = app.docker()?;
    let chain = default_chain(&runtime);
    let reporter = TerminalReporter::new(&app.output);
    let ctx = ExtractContext::new(&reporter).with_cancel(interrupt_token());

    let formation = plan_formation(&chain, &ctx, &policy, &args.image, previous.as_ref()).await?;

    if let Some(path) = &args.write {
        FormationFile::new(path).save(&formation)?;
        app.output
            .success(&format!("wrote formation to {}", path.display()));
    }

    if app.is_json() {
        app.emit(&formation)
    } else {
        app.output
            .header(&format!("Formation for {} ({})", policy.name, args.image));
        print!("{}", format_table(&formation));
        Ok(())
    }
}

/// Render a Formation as an aligned table.
#[must_use]
pub fn format_table(formation: &Formation) -> String {
    let rows: Vec<[String; 5]> = formation
        .iter()
        .map(|(name, process)| {
            let size = process
                .constraints
                .preset_name()
                .map_or_else(|| process.constraints.to_string(), str::to_owned);
            let expose = process.expose.as_ref().map_or_else(
                || "-".to_owned(),
                |e| {
                    if e.external {
                        format!("{} (external)", e.protocol)
                    } else {
                        e.protocol.clone()
                    }
                },
            );
            [
                name.to_owned(),
                process.quantity.to_string(),
                size,
                expose,
                process.command.to_string(),
            ]
        })
        .collect();

    let header = ["PROCESS", "QTY", "SIZE", "EXPOSE", "COMMAND"].map(str::to_owned);
    let mut widths = header.each_ref().map(String::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&header).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}
