use anyhow::Result;
use clap::Subcommand;
use zenflow_core::{KeyValueStore, StudioStore};

#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    Add { name: String },
    List,
    Remove { template_id: String },
}

impl TemplateCommand {
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::List)
    }
}

pub fn run<S: KeyValueStore>(store: &mut StudioStore<S>, command: TemplateCommand) -> Result<()> {
    match command {
        TemplateCommand::Add { name } => {
            let template = store.add_template(&name)?;
            println!("Added template {} ({})", template.name, template.id);
        }
        TemplateCommand::List => {
            let templates = &store.snapshot().templates;
            if templates.is_empty() {
                println!("No templates.");
            }
            for template in templates {
                println!(
                    "{}  {:<20} {:<12} cap {}",
                    template.id,
                    template.name,
                    template.default_location.as_deref().unwrap_or("-"),
                    template
                        .default_capacity
                        .map_or_else(|| "-".to_string(), |capacity| capacity.to_string())
                );
            }
        }
        TemplateCommand::Remove { template_id } => {
            let removed = store.remove_template(&template_id)?;
            println!("Removed template {}", removed.name);
        }
    }
    Ok(())
}
