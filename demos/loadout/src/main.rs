//! Loadout Example
//!
//! Loads a rune pool and a character profile from RON, searches for the best
//! loadout and explains where its score comes from.
//!
//! Pass a directory of RON files to search it instead of the bundled data.

use runeopt_core::{CharacterContext, Combination, ScoreModel};
use runeopt_script::{Inputs, Loader};
use runeopt_search::{start_search_with_model, SearchResult};
use std::io::Write;

const RUNES: &str = include_str!("../data/runes.ron");
const PROFILE: &str = include_str!("../data/profile.ron");

fn load() -> runeopt_script::Result<Inputs> {
    let mut loader = Loader::new();
    match std::env::args().nth(1) {
        Some(dir) => loader.load_directory(dir)?,
        None => {
            loader.load_runes_str(RUNES)?;
            loader.load_profile_str(PROFILE)?;
        }
    }
    Ok(loader.finish())
}

fn main() {
    println!("=== Runeopt Loadout Example ===\n");

    let inputs = match load() {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("Failed to load inputs: {}", e);
            std::process::exit(1);
        }
    };
    let model = inputs.model();
    let options = inputs.options();
    let ctx = options.apply_to(&inputs.context());
    let runes = inputs.rune_pool();
    let enhance_level = options.enhance_level;

    println!(
        "Loaded {} runes for class {:?} as {:?}",
        runes.len(),
        ctx.class_code,
        ctx.role
    );
    println!("Searching with {} workers...\n", options.worker_count());

    let mut handle = match start_search_with_model(&runes, &ctx, options, &model) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Cannot search: {}", e);
            std::process::exit(1);
        }
    };
    handle.on_progress(|p| {
        let best = p.best_score.map_or("-".to_string(), |s| format!("{:.2}", s));
        print!(
            "\r  phase {} {:5.1}% ({} scored, {} pruned) best {}",
            p.phase,
            p.fraction() * 100.0,
            p.processed,
            p.skipped,
            best
        );
        let _ = std::io::stdout().flush();
    });

    let Some(result) = handle.wait() else {
        println!("\nSearch cancelled");
        return;
    };
    println!("\n");

    match &result.best_combination {
        Some(combination) => explain(combination, &model, &ctx, enhance_level),
        None => println!("No loadout could be scored"),
    }
    summary(&result);

    println!("\n=== Search Complete ===");
}

fn explain(combination: &Combination, model: &ScoreModel, ctx: &CharacterContext, enhance_level: u8) {
    println!("Best loadout:");
    for rune in combination.slots() {
        let score = model.score_rune(rune, ctx, enhance_level, 0.0);
        println!(
            "  {:<9} {:<16} {:>7.2}  ({})",
            rune.category.to_string(),
            rune.name,
            score.score,
            rune.id
        );
        for line in &score.breakdown {
            println!(
                "      {:?} {}: {} x {:.2} x {:.2} = {:+.2}",
                line.source, line.name, line.raw_value, line.weight, line.multiplier, line.contribution
            );
        }
    }

    let evaluation = combination.evaluate(model, ctx, enhance_level);
    if !evaluation.synergy.details.is_empty() {
        println!("\nSynergies:");
        for detail in &evaluation.synergy.details {
            println!(
                "  {:?}: {} -> {} {:+.2}",
                detail.kind, detail.source, detail.target, detail.bonus
            );
        }
    }
    println!(
        "\nTotal: {:.2} (slots {:.2} + synergy {:.2})",
        evaluation.total, evaluation.base, evaluation.synergy.total_bonus
    );
}

fn summary(result: &SearchResult) {
    println!(
        "Searched {} of {} loadouts ({} pruned) in {} phase(s)",
        result.processed, result.total, result.skipped, result.phases
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_data_searches() {
        let mut loader = Loader::new();
        loader.load_runes_str(RUNES).unwrap();
        loader.load_profile_str(PROFILE).unwrap();
        let inputs = loader.finish();

        let options = inputs.options().with_worker_count(2);
        let result = runeopt_search::start_search_with_model(
            &inputs.rune_pool(),
            &inputs.context(),
            options,
            &inputs.model(),
        )
        .unwrap()
        .wait()
        .unwrap();

        let combination = result.best_combination.unwrap();
        assert!(combination.validate().is_ok());
        assert_eq!(result.processed + result.skipped, result.total);
    }
}
