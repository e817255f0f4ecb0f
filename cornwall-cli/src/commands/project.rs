use cornwall_core::{CornwallError, Result};
use cornwall_types::TimeSignature;

use super::{print_json, Context};
use crate::args::ProjectCmd;
use crate::report;

pub fn run(ctx: &Context, cmd: ProjectCmd) -> Result<()> {
    match cmd {
        ProjectCmd::Create {
            name,
            bpm,
            sample_rate,
            time_sig,
        } => {
            let mut defaults = ctx.config.project_defaults();
            if let Some(bpm) = bpm {
                defaults.bpm = positive("bpm", bpm)?;
            }
            if let Some(rate) = sample_rate {
                defaults.sample_rate = positive("sample-rate", rate)?;
            }
            if let Some(sig) = time_sig {
                defaults.time_sig = sig
                    .parse::<TimeSignature>()
                    .map_err(|_| CornwallError::invalid_value("time-sig", &sig))?;
            }
            let handle = ctx.store.create_project(&name, defaults)?;
            let project = handle.project();
            println!(
                "Created project '{}' ({} BPM, {}Hz, {})",
                project.name, project.bpm, project.sample_rate, project.time_sig
            );
            println!("Directory: {}", handle.project_dir().display());
        }
        ProjectCmd::Info(flag) => {
            let handle = ctx.project()?;
            if flag.json {
                print_json(handle.project())?;
            } else {
                let tracks = handle.tracks()?;
                println!("{}", report::project_info(handle.project(), tracks.len()));
            }
        }
        ProjectCmd::Set { key, value } => {
            let mut handle = ctx.project()?;
            handle.set_project_field(&key, &value)?;
            println!("Set {} = {}", key, value);
        }
        ProjectCmd::Open { name } => {
            let handle = ctx.store.open_project(&name)?;
            let tracks = handle.tracks()?;
            println!("{}", report::project_info(handle.project(), tracks.len()));
        }
        ProjectCmd::Mix {
            master_volume,
            format,
            output_file,
            json,
        } => {
            let handle = ctx.project()?;
            let changed = master_volume.is_some() || format.is_some() || output_file.is_some();
            let mix = if changed {
                handle.update_mix(|mix| {
                    if let Some(v) = master_volume {
                        mix.master_volume = v;
                    }
                    if let Some(path) = output_file {
                        mix.output_file = path;
                    }
                    if let Some(f) = format {
                        mix.set_format(f);
                    }
                })?
            } else {
                handle.mix_settings()?
            };
            if json.json {
                print_json(&mix)?;
            } else {
                println!("{}", report::mix_info(&mix, &handle.mix_output(&mix)));
            }
        }
    }
    Ok(())
}

fn positive(key: &str, value: u32) -> Result<u32> {
    if value == 0 {
        return Err(CornwallError::invalid_value(key, value));
    }
    Ok(value)
}
