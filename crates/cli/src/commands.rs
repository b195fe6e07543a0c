//! Subcommand implementations

use anyhow::{bail, Context, Result};
use docx_template::TemplateProcessor;
use order_document::{
    starter_template, DocumentSettings, OrderSnapshot, RenderContext, SettingsManager,
    WordTemplateDocument,
};
use std::path::{Path, PathBuf};

/// Options of the `render` subcommand
pub struct RenderArgs {
    pub template: Option<PathBuf>,
    pub order: PathBuf,
    pub settings: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub download: bool,
}

pub fn render(args: RenderArgs) -> Result<()> {
    let mut settings = match &args.settings {
        Some(path) => load_settings(path)?,
        None => DocumentSettings::default(),
    };
    if let Some(template) = args.template {
        settings.template_path = Some(template);
    }

    let json = std::fs::read_to_string(&args.order)
        .with_context(|| format!("Failed to read order {}", args.order.display()))?;
    let order = OrderSnapshot::from_json(&json)
        .with_context(|| format!("Failed to parse order {}", args.order.display()))?;

    let ctx = RenderContext::from_settings(&settings);
    let document = WordTemplateDocument::new(settings);

    if args.download {
        let artifact = document.output_for_download(&order, &ctx)?;
        println!("{}\t{}", artifact.path.display(), artifact.file_name);
    } else {
        let dir = args.out.unwrap_or_else(|| PathBuf::from("."));
        let path = document.output_to_file(&order, &ctx, &dir)?;
        println!("{}", path.display());
    }
    Ok(())
}

pub fn variables(template: &Path, json: bool) -> Result<()> {
    let names = template_variables(template)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, starter_template()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), "Created starter template");
    println!("{}", path.display());
    Ok(())
}

fn load_settings(path: &Path) -> Result<DocumentSettings> {
    if !path.exists() {
        bail!("Settings file {} does not exist", path.display());
    }
    let mut manager = SettingsManager::new(path);
    Ok(manager.load_sync()?.clone())
}

fn template_variables(template: &Path) -> Result<Vec<String>> {
    let processor = TemplateProcessor::open(template)
        .with_context(|| format!("Failed to open template {}", template.display()))?;
    Ok(processor.variables())
}
