use anyhow::Result;
use chrono::Local;
use clap::Subcommand;
use zenflow_core::{KeyValueStore, Member, MemberDraft, PackageType, StudioStore};

#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    /// Register a member.
    Add {
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// single|package_10|monthly|unlimited
        #[arg(long, default_value = "package_10")]
        package: PackageType,
        /// Starting class credit.
        #[arg(long, default_value_t = 10)]
        credits: u32,
    },
    List,
    /// Match by name (case-insensitive) or phone fragment.
    Search { query: String },
    /// Add purchased classes to a member.
    TopUp { member_id: String, amount: u32 },
}

impl MemberCommand {
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Add { .. } | Self::TopUp { .. })
    }
}

pub fn run<S: KeyValueStore>(store: &mut StudioStore<S>, command: MemberCommand) -> Result<()> {
    match command {
        MemberCommand::Add {
            name,
            phone,
            package,
            credits,
        } => {
            let draft = MemberDraft {
                name,
                phone,
                package_type: package,
                remaining_classes: credits,
            };
            let member = store.add_member(draft, Local::now().date_naive())?;
            println!("Added member {} ({})", member.name, member.id);
        }
        MemberCommand::List => print_members(store.snapshot().members.iter()),
        MemberCommand::Search { query } => print_members(store.search_members(&query)),
        MemberCommand::TopUp { member_id, amount } => {
            let balance = store.top_up(&member_id, amount)?;
            println!(
                "Credit now {} remaining, {} purchased in total",
                balance.remaining_classes, balance.total_purchased_classes
            );
        }
    }
    Ok(())
}

fn print_members<'a>(members: impl IntoIterator<Item = &'a Member>) {
    let mut empty = true;
    for member in members {
        empty = false;
        println!(
            "{}  {:<20} {:<12} {:<10} {:>3}/{:<3} joined {}",
            member.id,
            member.name,
            member.phone,
            member.package_type.as_str(),
            member.remaining_classes,
            member.total_purchased_classes,
            member.join_date
        );
    }
    if empty {
        println!("No members.");
    }
}
