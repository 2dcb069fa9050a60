// Sources command: lists the registered source identifiers

use crate::ui;
use scaf::SourceRegistry;

pub fn sources() -> anyhow::Result<i32> {
    let registry = SourceRegistry::new();
    let mut names = registry.sources();
    names.sort_unstable();
    ui::print_lines(names);
    Ok(0)
}
