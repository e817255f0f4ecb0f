mod common;

use std::collections::BTreeSet;
use std::path::PathBuf;

use cornwall_core::CornwallError;
use cornwall_types::{parse_params, TrackId, TrackUpdate};

fn ids(f: &common::Fixture) -> Vec<u32> {
    f.project.tracks().unwrap().iter().map(|t| t.id.get()).collect()
}

#[test]
fn ids_follow_the_highest_existing_id() {
    let f = common::project();
    for name in ["fiddle", "whistle", "bodhran"] {
        f.project.add_track(name, "audio").unwrap();
    }
    assert_eq!(ids(&f), [1, 2, 3]);

    f.project.remove_track(TrackId::new(2)).unwrap();
    let added = f.project.add_track("harp", "synth").unwrap();
    assert_eq!(added.id, TrackId::new(4));
    assert_eq!(ids(&f), [1, 3, 4]);
}

#[test]
fn every_track_has_exactly_one_chain() {
    let f = common::project();
    for i in 0..5 {
        f.project.add_track(&format!("t{}", i), "midi").unwrap();
    }
    f.project.remove_track(TrackId::new(1)).unwrap();
    f.project.remove_track(TrackId::new(4)).unwrap();

    let track_ids: Vec<TrackId> = f.project.tracks().unwrap().iter().map(|t| t.id).collect();
    let chains = f.project.effects_chains().unwrap();
    assert_eq!(chains.track_ids(), track_ids);
}

#[test]
fn removing_a_track_removes_its_effects() {
    let f = common::project();
    let id = f.project.add_track("fiddle", "audio").unwrap().id;
    f.project
        .add_effect(id, "reverb", parse_params(&["reverberance=60"]).unwrap())
        .unwrap();

    f.project.remove_track(id).unwrap();
    assert!(!f.project.effects_chains().unwrap().contains(id));
    assert!(matches!(
        f.project.effects(id),
        Err(CornwallError::TrackNotFound(_))
    ));
}

#[test]
fn concurrent_adds_never_share_an_id() {
    let f = common::project();
    let threads: Vec<_> = (0..6)
        .map(|n| {
            let store = f.store.clone();
            std::thread::spawn(move || {
                let project = store.open().unwrap();
                for i in 0..5 {
                    project.add_track(&format!("{}-{}", n, i), "audio").unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    let all = ids(&f);
    assert_eq!(all.len(), 30);
    assert_eq!(all.iter().copied().collect::<BTreeSet<_>>().len(), 30);
    assert_eq!(f.project.effects_chains().unwrap().len(), 30);
}

#[test]
fn import_copies_into_the_project() {
    let f = common::project();
    let original = f.recording("take1.wav", &[100, 200, 300]);
    let id = f.project.add_track("fiddle", "audio").unwrap().id;

    let track = f.project.import_source(id, &original).unwrap();
    assert_eq!(track.source, Some(PathBuf::from("audio/take1.wav")));

    let copy = f.project.source_path(&track).unwrap();
    assert!(copy.starts_with(f.project.project_dir()));
    assert_eq!(common::read_wav(&copy), [100, 200, 300]);

    std::fs::remove_file(&original).unwrap();
    assert!(copy.is_file());
}

#[test]
fn import_errors() {
    let f = common::project();
    let id = f.project.add_track("fiddle", "audio").unwrap().id;
    let missing = f.outside.path().join("nope.wav");

    assert!(matches!(
        f.project.import_source(id, &missing),
        Err(CornwallError::SourceFileNotFound(p)) if p == missing
    ));
    let real = f.recording("x.wav", &[1]);
    assert!(matches!(
        f.project.import_source(TrackId::new(7), &real),
        Err(CornwallError::TrackNotFound(_))
    ));
    assert_eq!(f.project.track(id).unwrap().source, None);
}

#[test]
fn reimporting_from_inside_the_project_is_a_no_op_copy() {
    let f = common::project();
    let track = f.audio_track("fiddle", &[5, 6]);
    let inside = f.project.source_path(&track).unwrap();

    let again = f.project.import_source(track.id, &inside).unwrap();
    assert_eq!(again.source, track.source);
    assert_eq!(common::read_wav(&inside), [5, 6]);
}

#[test]
fn volume_and_pan_are_not_range_checked() {
    let f = common::project();
    let id = f.project.add_track("fiddle", "audio").unwrap().id;
    f.project.update_track(id, TrackUpdate::Volume(7.5)).unwrap();
    let t = f.project.update_track(id, TrackUpdate::Pan(-3.0)).unwrap();
    assert_eq!(t.volume, 7.5);
    assert_eq!(t.pan, -3.0);
}

#[test]
fn setters_persist() {
    let f = common::project();
    let id = f.project.add_track("fiddle", "audio").unwrap().id;
    f.project.update_track(id, TrackUpdate::Solo(true)).unwrap();
    f.project.update_track(id, TrackUpdate::Mute(true)).unwrap();
    f.project
        .update_track(id, TrackUpdate::Name("lead fiddle".into()))
        .unwrap();

    let reopened = f.store.open().unwrap();
    let t = reopened.track(id).unwrap();
    assert!(t.solo && t.mute);
    assert_eq!(t.name, "lead fiddle");
}

#[test]
fn effects_chain_order_and_removal() {
    let f = common::project();
    let id = f.project.add_track("fiddle", "audio").unwrap().id;
    for name in ["bass", "reverb", "norm"] {
        f.project
            .add_effect(id, name, Default::default())
            .unwrap();
    }
    let removed = f.project.remove_effect(id, 1).unwrap();
    assert_eq!(removed.name, "reverb");

    let names: Vec<_> = f.project.effects(id).unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["bass", "norm"]);

    f.project.clear_effects(id).unwrap();
    assert!(f.project.effects(id).unwrap().is_empty());
    assert!(f.project.effects_chains().unwrap().contains(id));
}

#[test]
fn track_document_uses_type_key() {
    let f = common::project();
    f.project.add_track("pad", "synth").unwrap();
    let raw = std::fs::read_to_string(f.store.layout().tracks_file()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["type"], "synth");
    assert_eq!(json[0]["source"], serde_json::Value::Null);
}

#[test]
fn creating_a_new_project_resets_tracks() {
    let f = common::project();
    f.project.add_track("fiddle", "audio").unwrap();
    let next = f.store.create_project("second", common::defaults()).unwrap();
    assert!(next.tracks().unwrap().is_empty());
    assert_eq!(f.store.list_projects().unwrap(), ["second", "session"]);
}

#[test]
fn project_settings_from_two_handles_both_stick() {
    let f = common::project();
    let mut a = f.store.open().unwrap();
    let mut b = f.store.open().unwrap();

    a.set_project_field("bpm", "140").unwrap();
    b.set_project_field("time-sig", "6/8").unwrap();

    let project = f.store.open().unwrap().project().clone();
    assert_eq!(project.bpm, 140);
    assert_eq!(project.time_sig, "6/8");
    assert_eq!(b.project().bpm, 140);
}

#[test]
fn imports_with_the_same_file_name_keep_both_recordings() {
    let f = common::project();
    let first = f.outside.path().join("d1");
    let second = f.outside.path().join("d2");
    std::fs::create_dir_all(&first).unwrap();
    std::fs::create_dir_all(&second).unwrap();
    common::write_wav(&first.join("take.wav"), &[111]);
    common::write_wav(&second.join("take.wav"), &[222]);

    let t1 = f.project.add_track("fiddle", "audio").unwrap().id;
    let t2 = f.project.add_track("whistle", "audio").unwrap().id;
    let t1 = f.project.import_source(t1, &first.join("take.wav")).unwrap();
    let t2 = f.project.import_source(t2, &second.join("take.wav")).unwrap();

    assert_eq!(t1.source, Some(PathBuf::from("audio/take.wav")));
    assert_eq!(t2.source, Some(PathBuf::from("audio/take-2.wav")));
    assert_eq!(common::read_wav(&f.project.source_path(&t1).unwrap()), [111]);
    assert_eq!(common::read_wav(&f.project.source_path(&t2).unwrap()), [222]);

    // the same recording again reuses its copy
    let again = f.project.import_source(t1.id, &first.join("take.wav")).unwrap();
    assert_eq!(again.source, t1.source);
    assert!(!f.project.audio_dir().join("take-3.wav").exists());
}

#[test]
fn add_fails_cleanly_when_ids_are_exhausted() {
    let f = common::project();
    let tracks = f.store.layout().tracks_file();
    std::fs::write(
        &tracks,
        format!(
            r#"[{{"id":{},"name":"edited","type":"audio","source":null,"volume":1.0,"pan":0.0,"mute":false,"solo":false}}]"#,
            u32::MAX
        ),
    )
    .unwrap();

    assert!(matches!(
        f.project.add_track("fiddle", "audio"),
        Err(CornwallError::InvalidValue { .. })
    ));
    assert_eq!(f.project.tracks().unwrap().len(), 1);
}

#[test]
fn leftover_chain_without_a_track_is_reset_on_add() {
    let f = common::project();
    // what an add interrupted between its two writes leaves behind
    std::fs::write(
        f.store.layout().effects_file(),
        r#"{"1":[{"name":"reverb","params":{}}]}"#,
    )
    .unwrap();

    let track = f.project.add_track("fiddle", "audio").unwrap();
    assert_eq!(track.id, TrackId::new(1));
    assert!(f.project.effects(track.id).unwrap().is_empty());
    assert_eq!(f.project.effects_chains().unwrap().len(), 1);
}
