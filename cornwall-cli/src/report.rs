//! Human-readable output.

use std::fmt::Write;
use std::path::Path;
use std::time::Duration;

use cornwall_core::render::RenderOutcome;
use cornwall_types::{Effect, MixSettings, Project, Track, EFFECT_CATALOG};

/// Decimal form that always shows a fractional part: `1.0`, `0.75`.
pub fn num(v: f32) -> String {
    if v.fract() == 0.0 && v.abs() < 1e9 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

pub fn project_info(project: &Project, track_count: usize) -> String {
    format!(
        "Project: {}\nBPM:     {}\nRate:    {}Hz\nTime:    {}\nCreated: {}\nTracks:  {}",
        project.name,
        project.bpm,
        project.sample_rate,
        project.time_sig,
        project.created.format("%Y-%m-%dT%H:%M:%SZ"),
        track_count
    )
}

pub fn track_table(tracks: &[Track]) -> String {
    if tracks.is_empty() {
        return "No tracks. Use 'cornwall track add <name>' to add one.".to_string();
    }
    let header = format!(
        "{:<4} {:<20} {:<6} {:<6} {:<6} {:>1} {:>1}  Source",
        "ID", "Name", "Type", "Vol", "Pan", "M", "S"
    );
    let mut out = format!("{}\n{}", header, "-".repeat(header.len()));
    for t in tracks {
        let source = t
            .source
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "(empty)".to_string());
        let _ = write!(
            out,
            "\n{:<4} {:<20} {:<6} {:<6} {:<6} {:>1} {:>1}  {}",
            t.id.to_string(),
            t.name,
            t.track_type.name(),
            num(t.volume),
            num(t.pan),
            if t.mute { "M" } else { "-" },
            if t.solo { "S" } else { "-" },
            source
        );
    }
    out
}

pub fn track_info(track: &Track, effects: &[Effect]) -> String {
    let source = track
        .source
        .as_deref()
        .map(|s| s.display().to_string())
        .unwrap_or_else(|| "(empty)".to_string());
    let mut out = format!(
        "Track:   {}\nName:    {}\nType:    {}\nVolume:  {}\nPan:     {}\nMute:    {}\nSolo:    {}\nSource:  {}",
        track.id,
        track.name,
        track.track_type,
        num(track.volume),
        num(track.pan),
        track.mute,
        track.solo,
        source
    );
    if effects.is_empty() {
        out.push_str("\nEffects: (none)");
    } else {
        out.push_str("\nEffects:\n");
        out.push_str(&effects_list(effects, "  "));
    }
    out
}

pub fn effects_list(effects: &[Effect], indent: &str) -> String {
    effects
        .iter()
        .enumerate()
        .map(|(i, fx)| {
            let params = fx.params_display();
            if params.is_empty() {
                format!("{}[{}] {}", indent, i, fx.name)
            } else {
                format!("{}[{}] {} {}", indent, i, fx.name, params)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn mix_info(mix: &MixSettings, resolved_output: &Path) -> String {
    format!(
        "Master:  {}\nFormat:  {}\nOutput:  {} ({})",
        num(mix.master_volume),
        mix.output_format,
        mix.output_file.display(),
        resolved_output.display()
    )
}

pub fn catalog() -> String {
    let mut out = String::new();
    for (i, spec) in EFFECT_CATALOG.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:<12} {}", spec.name, spec.description);
        for p in spec.params {
            let default = p
                .default
                .map(|d| format!(" (default {}{})", p.prefix, d))
                .unwrap_or_default();
            let _ = write!(out, "\n    {}{}: {}", p.name, default, p.description);
        }
    }
    out
}

pub fn rendered(outcome: &RenderOutcome, duration: Option<Duration>) -> String {
    match duration {
        Some(d) => format!("Rendered: {} ({:.1}s)", outcome.output.display(), d.as_secs_f64()),
        None => format!("Rendered: {}", outcome.output.display()),
    }
}
