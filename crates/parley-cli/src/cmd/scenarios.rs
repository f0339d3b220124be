use crate::output::{print_json, print_table};
use anyhow::Context;
use parley_core::access::AccessState;
use parley_core::config::Config;
use parley_core::presentation::{catalog_cards, plan_banner};
use std::path::Path;

pub fn run(root: &Path, premium: bool, json: bool) -> anyhow::Result<()> {
    let access = if premium {
        AccessState::premium()
    } else {
        Config::load_or_default(root)
            .context("failed to load config")?
            .access
            .state()
    };
    let cards = catalog_cards(access);
    let banner = plan_banner(access);

    if json {
        return print_json(&serde_json::json!({
            "banner": banner,
            "scenarios": cards,
        }));
    }

    println!("{}: {}", banner.badge, banner.caption);
    println!();
    let rows: Vec<Vec<String>> = cards
        .iter()
        .map(|card| {
            vec![
                card.scenario.id.to_string(),
                card.scenario.title.to_string(),
                if card.scenario.is_premium { "premium" } else { "free" }.to_string(),
                if card.locked { "locked" } else { "available" }.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "PLAN", "STATUS"], &rows);
    Ok(())
}
