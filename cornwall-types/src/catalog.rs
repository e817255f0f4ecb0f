//! Effect catalog: every effect name the engine stage understands, with its
//! parameters in the order the engine expects them.

/// One positional parameter of an engine effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    /// Emitted when the parameter is absent. `None` makes the parameter
    /// optional: it is skipped when absent.
    pub default: Option<&'static str>,
    /// Prepended to the value, e.g. `-` for chorus shape flags.
    pub prefix: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectSpec {
    pub name: &'static str,
    /// Name of the effect in the engine's effects stage.
    pub engine_name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

const fn param(name: &'static str, default: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        default: Some(default),
        prefix: "",
        description,
    }
}

const fn optional(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        default: None,
        prefix: "",
        description,
    }
}

pub static EFFECT_CATALOG: &[EffectSpec] = &[
    EffectSpec {
        name: "reverb",
        engine_name: "reverb",
        description: "Reverberation - simulates acoustic space",
        params: &[
            optional("reverberance", "Reverb amount 0-100 (engine default: 50)"),
            optional("hf_damping", "High frequency damping 0-100 (engine default: 50)"),
            optional("room_scale", "Room size 0-100 (engine default: 100)"),
        ],
    },
    EffectSpec {
        name: "delay",
        engine_name: "echo",
        description: "Echo / delay effect",
        params: &[
            param("gain_in", "0.8", "Input gain 0-1"),
            param("gain_out", "0.9", "Output gain 0-1"),
            param("delay_ms", "500", "Delay time in milliseconds"),
            param("decay", "0.3", "Decay factor 0-1"),
        ],
    },
    EffectSpec {
        name: "chorus",
        engine_name: "chorus",
        description: "Chorus effect - thickens sound",
        params: &[
            param("gain_in", "0.7", "Input gain"),
            param("gain_out", "0.9", "Output gain"),
            param("delay_ms", "55", "Modulation delay in ms"),
            param("decay", "0.4", "Decay"),
            param("speed", "0.25", "Modulation speed in Hz"),
            ParamSpec {
                name: "shape",
                default: Some("s"),
                prefix: "-",
                description: "Modulation shape: s=sine, t=triangle",
            },
        ],
    },
    EffectSpec {
        name: "flanger",
        engine_name: "flanger",
        description: "Flanger effect",
        params: &[],
    },
    EffectSpec {
        name: "phaser",
        engine_name: "phaser",
        description: "Phaser effect",
        params: &[],
    },
    EffectSpec {
        name: "tremolo",
        engine_name: "tremolo",
        description: "Tremolo - amplitude modulation",
        params: &[
            param("speed", "6", "Speed in Hz"),
            optional("depth", "Depth 0-100 (engine default: 40)"),
        ],
    },
    EffectSpec {
        name: "overdrive",
        engine_name: "overdrive",
        description: "Overdrive / distortion",
        params: &[param("gain", "20", "Drive amount in dB")],
    },
    EffectSpec {
        name: "compressor",
        engine_name: "compand",
        description: "Dynamic range compression",
        params: &[
            param("attack_decay", "0.3,1", "Attack,decay in seconds"),
            param("transfer", "6:-70,-60,-20", "Transfer function"),
        ],
    },
    EffectSpec {
        name: "eq",
        engine_name: "equalizer",
        description: "Parametric equalizer",
        params: &[
            param("frequency", "1000", "Center frequency in Hz"),
            param("width", "1q", "Bandwidth"),
            param("gain", "0", "Gain in dB"),
        ],
    },
    EffectSpec {
        name: "bass",
        engine_name: "bass",
        description: "Bass boost/cut shelving EQ",
        params: &[param("gain", "0", "Gain in dB, positive=boost negative=cut")],
    },
    EffectSpec {
        name: "treble",
        engine_name: "treble",
        description: "Treble boost/cut shelving EQ",
        params: &[param("gain", "0", "Gain in dB, positive=boost negative=cut")],
    },
    EffectSpec {
        name: "lowpass",
        engine_name: "lowpass",
        description: "Low-pass filter - cuts high frequencies",
        params: &[param("frequency", "3000", "Cutoff frequency in Hz")],
    },
    EffectSpec {
        name: "highpass",
        engine_name: "highpass",
        description: "High-pass filter - cuts low frequencies",
        params: &[param("frequency", "300", "Cutoff frequency in Hz")],
    },
    EffectSpec {
        name: "pitch",
        engine_name: "pitch",
        description: "Pitch shift",
        params: &[param("cents", "0", "Pitch shift in cents, 100=one semitone")],
    },
    EffectSpec {
        name: "tempo",
        engine_name: "tempo",
        description: "Time stretch without pitch change",
        params: &[param("factor", "1.0", "Speed factor, 2.0=double speed")],
    },
    EffectSpec {
        name: "norm",
        engine_name: "norm",
        description: "Normalize audio level",
        params: &[optional("level", "Target level in dB (engine default: -3)")],
    },
    EffectSpec {
        name: "fade",
        engine_name: "fade",
        description: "Fade in and/or out",
        params: &[
            param("type", "t", "Curve type: t=linear, q=quarter-sine, h=half-sine, l=log, p=exp"),
            param("fade_in", "0", "Fade in duration in seconds"),
            param("stop", "0", "Stop time in seconds, 0=end of file"),
            param("fade_out", "0", "Fade out duration in seconds"),
        ],
    },
];

pub fn lookup_effect(name: &str) -> Option<&'static EffectSpec> {
    EFFECT_CATALOG.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<_> = EFFECT_CATALOG.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EFFECT_CATALOG.len());
    }

    #[test]
    fn lookup_maps_to_engine_names() {
        assert_eq!(lookup_effect("delay").unwrap().engine_name, "echo");
        assert_eq!(lookup_effect("compressor").unwrap().engine_name, "compand");
        assert!(lookup_effect("wah").is_none());
    }
}
