use cornwall_core::{CornwallError, Result};
use cornwall_types::{lookup_effect, parse_params, EFFECT_CATALOG};
use serde_json::json;

use super::{print_json, Context};
use crate::args::FxCmd;
use crate::report;

pub fn run(ctx: &Context, cmd: FxCmd) -> Result<()> {
    match cmd {
        FxCmd::Add {
            track,
            effect,
            params,
        } => {
            let project = ctx.project()?;
            let params = parse_params(params.as_slice())
                .map_err(|e| CornwallError::invalid_value("effect parameter", e.0))?;
            if lookup_effect(&effect).is_none() {
                eprintln!(
                    "Warning: '{}' is not in the effect catalog; rendering this track will fail",
                    effect
                );
            }
            let added = project.add_effect(track, &effect, params)?;
            let len = project.effects(track)?.len();
            println!(
                "Added {} to track {} at index {}",
                added.name,
                track,
                len.saturating_sub(1)
            );
        }
        FxCmd::Remove { track, index } => {
            let removed = ctx.project()?.remove_effect(track, index)?;
            println!("Removed {} [{}] from track {}", removed.name, index, track);
        }
        FxCmd::List { track, json } => {
            let effects = ctx.project()?.effects(track)?;
            if json.json {
                print_json(&effects)?;
            } else if effects.is_empty() {
                println!("Track {} has no effects", track);
            } else {
                println!("{}", report::effects_list(&effects, ""));
            }
        }
        FxCmd::Clear { track } => {
            ctx.project()?.clear_effects(track)?;
            println!("Cleared effects on track {}", track);
        }
        FxCmd::Preview { track, range } => {
            let project = ctx.project()?;
            ctx.playback()
                .play_track(&project, track, range.start, range.duration)?;
        }
        FxCmd::Catalog(flag) => {
            if flag.json {
                let entries: Vec<_> = EFFECT_CATALOG
                    .iter()
                    .map(|spec| {
                        let params: Vec<_> = spec
                            .params
                            .iter()
                            .map(|p| {
                                json!({
                                    "name": p.name,
                                    "default": p.default,
                                    "description": p.description,
                                })
                            })
                            .collect();
                        json!({
                            "name": spec.name,
                            "engine_name": spec.engine_name,
                            "description": spec.description,
                            "params": params,
                        })
                    })
                    .collect();
                print_json(&entries)?;
            } else {
                println!("{}", report::catalog());
            }
        }
    }
    Ok(())
}
