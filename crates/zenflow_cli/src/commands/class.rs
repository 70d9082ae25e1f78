use anyhow::{anyhow, bail, Result};
use chrono::Local;
use clap::Subcommand;
use zenflow_core::{ClassDraft, KeyValueStore, StudioStore};

#[derive(Debug, Subcommand)]
pub enum ClassCommand {
    /// Schedule a class, optionally prefilled from a template.
    Add {
        /// Required unless --template is given.
        title: Option<String>,
        #[arg(long)]
        template: Option<String>,
        /// YYYY-MM-DD, defaults to today.
        #[arg(long)]
        date: Option<String>,
        /// HH:MM
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        capacity: Option<u32>,
    },
    /// All classes, latest date first.
    List,
    /// Class detail with the check-in roster.
    Show { class_id: String },
}

impl ClassCommand {
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Add { .. })
    }
}

pub fn run<S: KeyValueStore>(store: &mut StudioStore<S>, command: ClassCommand) -> Result<()> {
    match command {
        ClassCommand::Add {
            title,
            template,
            date,
            time,
            location,
            capacity,
        } => {
            let mut draft = ClassDraft::new(Local::now().date_naive());
            if let Some(template_id) = template {
                let template = store
                    .snapshot()
                    .template(&template_id)
                    .ok_or_else(|| anyhow!("template not found: {template_id}"))?;
                draft.apply_template(template);
            }
            match title {
                Some(title) => draft.title = title,
                None if draft.title.is_empty() => bail!("a title or --template is required"),
                None => {}
            }
            if let Some(date) = date {
                draft.date = date;
            }
            if let Some(time) = time {
                draft.time = time;
            }
            if let Some(location) = location {
                draft.location = location;
            }
            if let Some(capacity) = capacity {
                draft.max_capacity = capacity;
            }
            let class = store.add_class(draft)?;
            println!(
                "Scheduled {} on {} at {} ({})",
                class.title, class.date, class.time, class.id
            );
        }
        ClassCommand::List => {
            let classes = store.classes_by_date_desc();
            if classes.is_empty() {
                println!("No classes.");
            }
            for class in classes {
                println!(
                    "{}  {} {}  {:<20} {:>2}/{:<2} {}",
                    class.id,
                    class.date,
                    class.time,
                    class.title,
                    class.headcount(),
                    class.max_capacity,
                    class.location
                );
            }
        }
        ClassCommand::Show { class_id } => {
            let class = store.open_class(&class_id)?;
            println!("{} | {} {} | {}", class.title, class.date, class.time, class.location);
            println!(
                "Instructor {} | {}/{} checked in",
                class.instructor,
                class.headcount(),
                class.max_capacity
            );
            for entry in store.roster(&class_id)? {
                let mark = if entry.present { "[x]" } else { "[ ]" };
                println!(
                    "{mark} {:<20} {:>3} left  {}",
                    entry.member.name, entry.member.remaining_classes, entry.member.id
                );
            }
        }
    }
    Ok(())
}
