use cornwall_core::store::ProjectHandle;
use cornwall_core::Result;
use cornwall_types::{TrackId, TrackUpdate};

use super::{print_json, Context};
use crate::args::TrackCmd;
use crate::report;

pub fn run(ctx: &Context, cmd: TrackCmd) -> Result<()> {
    let project = ctx.project()?;
    match cmd {
        TrackCmd::Add { name, track_type } => {
            let track = project.add_track(&name, &track_type)?;
            println!("Added track {}: {} ({})", track.id, track.name, track.track_type);
        }
        TrackCmd::List(flag) => {
            let tracks = project.tracks()?;
            if flag.json {
                print_json(&tracks)?;
            } else {
                println!("{}", report::track_table(&tracks));
            }
        }
        TrackCmd::Remove { id } => {
            let track = project.remove_track(id)?;
            println!("Removed track {}: {}", track.id, track.name);
        }
        TrackCmd::Solo { id } => update(&project, id, TrackUpdate::Solo(true), "Soloed")?,
        TrackCmd::Unsolo { id } => update(&project, id, TrackUpdate::Solo(false), "Unsoloed")?,
        TrackCmd::Mute { id } => update(&project, id, TrackUpdate::Mute(true), "Muted")?,
        TrackCmd::Unmute { id } => update(&project, id, TrackUpdate::Mute(false), "Unmuted")?,
        TrackCmd::Volume { id, value } => {
            let track = project.update_track(id, TrackUpdate::Volume(value))?;
            println!("Track {} volume: {}", track.id, report::num(track.volume));
        }
        TrackCmd::Pan { id, value } => {
            let track = project.update_track(id, TrackUpdate::Pan(value))?;
            println!("Track {} pan: {}", track.id, report::num(track.pan));
        }
        TrackCmd::Rename { id, name } => {
            let track = project.update_track(id, TrackUpdate::Name(name))?;
            println!("Track {} renamed to {}", track.id, track.name);
        }
        TrackCmd::Info { id, json } => {
            let track = project.track(id)?;
            let effects = project.effects(id)?;
            if json.json {
                let mut value = serde_json::to_value(&track)?;
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("effects".to_string(), serde_json::to_value(&effects)?);
                }
                print_json(&value)?;
            } else {
                println!("{}", report::track_info(&track, &effects));
            }
        }
        TrackCmd::Import { id, file } => {
            let track = project.import_source(id, &file)?;
            let source = track
                .source
                .as_deref()
                .map(|s| project.resolve_path(s))
                .unwrap_or_default();
            println!("Imported {} into track {}: {}", file.display(), track.id, source.display());
        }
    }
    Ok(())
}

fn update(
    project: &ProjectHandle,
    id: TrackId,
    change: TrackUpdate,
    verb: &str,
) -> Result<()> {
    let track = project.update_track(id, change)?;
    println!("{} track {}: {}", verb, track.id, track.name);
    Ok(())
}
