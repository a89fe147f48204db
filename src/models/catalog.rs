//! Known WL3 assets shipped with the game, keyed by file stem.

use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Track geometry, boosters, blockers and set pieces of a level.
    Level,
    /// Menu or placeholder file with no visible geometry.
    Empty,
    Prop,
    Vehicle,
    Pickup,
    Camera,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Level => "level",
            AssetKind::Empty => "empty",
            AssetKind::Prop => "prop",
            AssetKind::Vehicle => "vehicle",
            AssetKind::Pickup => "pickup",
            AssetKind::Camera => "camera",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownAsset {
    pub stem: &'static str,
    pub kind: AssetKind,
    pub description: &'static str,
}

const fn asset(stem: &'static str, kind: AssetKind, description: &'static str) -> KnownAsset {
    KnownAsset {
        stem,
        kind,
        description,
    }
}

use AssetKind::*;

pub const KNOWN_ASSETS: &[KnownAsset] = &[
    asset("r4back01", Level, "level 1 (the dump), part 1"),
    asset("r4back02", Level, "level 1 (the dump), part 2"),
    asset("r4pspd01", Level, "level 1 (the dump), booster line 1"),
    asset("r4rest", Empty, "level 1 (the dump), empty"),
    asset("r2back01", Level, "level 2 (the suburbs), part 1"),
    asset("r2back02", Level, "level 2 (the suburbs), part 2"),
    asset("r2back03", Level, "level 2 (the suburbs), part 3"),
    asset("r2back04", Level, "level 2 (the suburbs), part 4"),
    asset("r2pspd01", Level, "level 2 (the suburbs), booster line 1"),
    asset("r2pspd02", Level, "level 2 (the suburbs), booster line 2"),
    asset("r2trai03", Level, "level 2 (the suburbs), train"),
    asset("r2rest", Empty, "level 2 (the suburbs), empty"),
    asset("r3back01", Level, "level 3 (tunnels), part 1"),
    asset("r3back02", Level, "level 3 (tunnels), part 2"),
    asset("r3back03", Level, "level 3 (tunnels), part 3"),
    asset("r3back04", Level, "level 3 (tunnels), part 4"),
    asset("r3pspd01", Level, "level 3 (tunnels), booster line 1"),
    asset("r3pspd02", Level, "level 3 (tunnels), booster line 2"),
    asset("r3pspd03", Level, "level 3 (tunnels), booster line 3"),
    asset("r3rest", Empty, "level 3 (tunnels), empty"),
    asset("r1back01", Level, "level 4 (radioactive waste), part 1"),
    asset("r1back02", Level, "level 4 (radioactive waste), part 2"),
    asset("r1back03", Level, "level 4 (radioactive waste), part 3"),
    asset("r1back04", Level, "level 4 (radioactive waste), part 4"),
    asset("r1pspd01", Level, "level 4 (radioactive waste), booster line 1"),
    asset("r1pspd02", Level, "level 4 (radioactive waste), booster line 2"),
    asset("r1pstp01", Level, "level 4 (radioactive waste), blocker 1"),
    asset("r1rest", Empty, "level 4 (radioactive waste), empty"),
    asset("r5bdem01", Level, "level 5 (downtown), demo 1"),
    asset("r5back01", Level, "level 5 (downtown), part 1"),
    asset("r5kran02", Level, "level 5 (downtown), crane"),
    asset("r5pspd01", Level, "level 5 (downtown), booster line 1"),
    asset("r5pspd02", Level, "level 5 (downtown), booster line 2"),
    asset("r5pspd03", Level, "level 5 (downtown), booster line 3"),
    asset("r5pstp01", Level, "level 5 (downtown), blocker 1"),
    asset("r5rest", Empty, "level 5 (downtown), empty"),
    asset("r6back01", Level, "level 6 (the spiral), part 1"),
    asset("r6rest", Empty, "level 6 (the spiral), empty"),
    asset("eback01", Level, "level E (credits)"),
    asset("back", Empty, "empty"),
    asset("hiscr", Empty, "high score screen, empty"),
    asset("ilogoscr", Empty, "logo screen, empty"),
    asset("instscr", Empty, "instructions screen, empty"),
    asset("optscr", Empty, "options screen, empty"),
    asset("titlescr", Empty, "title screen, empty"),
    asset("skiltA", Prop, "roadblock sign"),
    asset("skiltB", Prop, "roadblock sign"),
    asset("skiltC", Prop, "roadblock sign"),
    asset("skiltD", Prop, "roadblock sign"),
    asset("skiltE", Prop, "roadblock sign"),
    asset("barrel", Prop, "barrel"),
    asset("bjarne01", Vehicle, "lorry"),
    asset("ebike", Vehicle, "player"),
    asset("fjende1", Vehicle, "enemy #1"),
    asset("fjende2", Vehicle, "enemy #2"),
    asset("fjende3", Vehicle, "enemy #3"),
    asset("fjende4", Vehicle, "enemy #4"),
    asset("fjende5", Vehicle, "enemy #5"),
    asset("pokal", Prop, "championship cup"),
    asset("ting", Prop, "bike material (glow/flash)"),
    asset("pickbost", Pickup, "booster"),
    asset("pickjmp", Pickup, "jumper"),
    asset("camera", Empty, "camera, empty"),
    asset("wirecam", Camera, "camera asset, never seen in-game"),
];

/// Look up an asset by file path or bare stem. Matching ignores ASCII case.
pub fn lookup<P: AsRef<Path>>(path: P) -> Option<&'static KnownAsset> {
    let stem = path.as_ref().file_stem()?.to_str()?;
    KNOWN_ASSETS
        .iter()
        .find(|a| a.stem.eq_ignore_ascii_case(stem))
}

pub fn describe<P: AsRef<Path>>(path: P) -> Option<&'static str> {
    lookup(path).map(|a| a.description)
}
