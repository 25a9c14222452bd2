//! Signal listing command implementation.

use vnflow_signals::SignalCategory;
use vnflow_signals::registry::signals_by_category;

/// List available signals, optionally filtered by category.
pub(crate) fn list_signals(category: Option<&str>, verbose: bool) {
    super::header("Available Signals");

    let categories = [
        (SignalCategory::Flow, "Flow"),
        (SignalCategory::Valuation, "Valuation"),
        (SignalCategory::Composite, "Composite"),
    ];

    for (cat, cat_name) in categories {
        if let Some(filter) = category
            && !cat_name.to_lowercase().contains(&filter.to_lowercase())
        {
            continue;
        }

        let cat_signals = signals_by_category(&cat);
        if cat_signals.is_empty() {
            continue;
        }

        println!("{cat_name}: {}", cat.description());
        println!("{}", "-".repeat(60));

        for info in cat_signals {
            if verbose {
                let inputs: Vec<&str> = info.inputs.iter().map(|f| f.name()).collect();
                println!(
                    "  {:22} - {} (window: {} sessions; inputs: {})",
                    info.field.name(),
                    info.description,
                    info.typical_lookback,
                    inputs.join(", ")
                );
            } else {
                println!("  {}", info.field.name());
            }
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for descriptions, windows, and inputs.\n");
    }
}
