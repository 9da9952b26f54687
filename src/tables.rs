//! Built-in lookup tables: LV2 units and plugin class categories.

/// A unit from the LV2 units ontology: label, render template and symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinUnit {
    pub label: &'static str,
    pub render: &'static str,
    pub symbol: &'static str,
}

const fn unit(label: &'static str, render: &'static str, symbol: &'static str) -> BuiltinUnit {
    BuiltinUnit {
        label,
        render,
        symbol,
    }
}

/// Units keyed by their local name in the units namespace.
static UNITS: &[(&str, BuiltinUnit)] = &[
    ("bar", unit("bars", "%f bars", "bars")),
    ("beat", unit("beats", "%f beats", "beats")),
    ("bpm", unit("beats per minute", "%f BPM", "BPM")),
    ("cent", unit("cents", "%f ct", "ct")),
    ("cm", unit("centimetres", "%f cm", "cm")),
    ("coef", unit("coefficient", "* %f", "*")),
    ("db", unit("decibels", "%f dB", "dB")),
    ("degree", unit("degrees", "%f deg", "deg")),
    ("frame", unit("audio frames", "%f frames", "frames")),
    ("hz", unit("hertz", "%f Hz", "Hz")),
    ("inch", unit("inches", "%f\"", "in")),
    ("khz", unit("kilohertz", "%f kHz", "kHz")),
    ("km", unit("kilometres", "%f km", "km")),
    ("m", unit("metres", "%f m", "m")),
    ("mhz", unit("megahertz", "%f MHz", "MHz")),
    ("midiNote", unit("MIDI note", "MIDI note %d", "note")),
    ("mile", unit("miles", "%f mi", "mi")),
    ("min", unit("minutes", "%f mins", "min")),
    ("mm", unit("millimetres", "%f mm", "mm")),
    ("ms", unit("milliseconds", "%f ms", "ms")),
    ("oct", unit("octaves", "%f octaves", "oct")),
    ("pc", unit("percent", "%f%%", "%")),
    ("s", unit("seconds", "%f s", "s")),
    ("semitone12TET", unit("semitones", "%f semi", "semi")),
];

/// Category tags keyed by the local name of an LV2 plugin class.
static CATEGORIES: &[(&str, &[&str])] = &[
    ("AllpassPlugin", &["Filter", "Allpass"]),
    ("AmplifierPlugin", &["Dynamics", "Amplifier"]),
    ("AnalyserPlugin", &["Utility", "Analyser"]),
    ("BandpassPlugin", &["Filter", "Bandpass"]),
    ("ChorusPlugin", &["Modulator", "Chorus"]),
    ("CombPlugin", &["Filter", "Comb"]),
    ("CompressorPlugin", &["Dynamics", "Compressor"]),
    ("ConstantPlugin", &["Generator", "Constant"]),
    ("ConverterPlugin", &["Utility", "Converter"]),
    ("DelayPlugin", &["Delay"]),
    ("DistortionPlugin", &["Distortion"]),
    ("DynamicsPlugin", &["Dynamics"]),
    ("EQPlugin", &["Filter", "Equaliser"]),
    ("ExpanderPlugin", &["Dynamics", "Expander"]),
    ("FilterPlugin", &["Filter"]),
    ("FlangerPlugin", &["Modulator", "Flanger"]),
    ("FunctionPlugin", &["Utility", "Function"]),
    ("GatePlugin", &["Dynamics", "Gate"]),
    ("GeneratorPlugin", &["Generator"]),
    ("HighpassPlugin", &["Filter", "Highpass"]),
    ("InstrumentPlugin", &["Generator", "Instrument"]),
    ("LimiterPlugin", &["Dynamics", "Limiter"]),
    ("LowpassPlugin", &["Filter", "Lowpass"]),
    ("MIDIPlugin", &["MIDI", "Utility"]),
    ("MixerPlugin", &["Utility", "Mixer"]),
    ("ModulatorPlugin", &["Modulator"]),
    ("MultiEQPlugin", &["Filter", "Equaliser", "Multiband"]),
    ("OscillatorPlugin", &["Generator", "Oscillator"]),
    ("ParaEQPlugin", &["Filter", "Equaliser", "Parametric"]),
    ("PhaserPlugin", &["Modulator", "Phaser"]),
    ("PitchPlugin", &["Spectral", "Pitch Shifter"]),
    ("ReverbPlugin", &["Reverb"]),
    ("SimulatorPlugin", &["Simulator"]),
    ("SpatialPlugin", &["Spatial"]),
    ("SpectralPlugin", &["Spectral"]),
    ("UtilityPlugin", &["Utility"]),
    ("WaveshaperPlugin", &["Distortion", "Waveshaper"]),
];

/// Looks up a built-in unit by its local name (e.g. `"hz"`).
pub fn builtin_unit(name: &str) -> Option<BuiltinUnit> {
    UNITS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, unit)| *unit)
}

/// Category tags for a plugin class local name (e.g. `"EQPlugin"`).
/// Classes without an entry contribute nothing.
pub fn categories_for(class: &str) -> &'static [&'static str] {
    CATEGORIES
        .iter()
        .find(|(key, _)| *key == class)
        .map(|(_, tags)| *tags)
        .unwrap_or(&[])
}
