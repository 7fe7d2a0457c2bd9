//! Optional capabilities of a build, independent of components.
//!
//! Unlike components, the set of features is fixed at compile time. Each one is a `static` so
//! it can be referenced directly, e.g. when a build variant needs to turn one off.

use std::collections::BTreeMap;

use modgen_ore::assert_none;

/// An optional capability, e.g. compression support or an assembler backend.
#[derive(Debug, PartialEq, Eq)]
pub struct Feature {
    name: &'static str,
    symbol: &'static str,
    libraries: &'static [&'static str],
    default: bool,
    desc: &'static str,
}

impl Feature {
    pub const fn new(
        name: &'static str,
        symbol: &'static str,
        libraries: &'static [&'static str],
        default: bool,
        desc: &'static str,
    ) -> Self {
        Feature {
            name,
            symbol,
            libraries,
            default,
            desc,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Preprocessor symbol defined when this feature is enabled.
    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// Libraries linked when this feature is enabled, in link order.
    pub fn libraries(&self) -> &'static [&'static str] {
        self.libraries
    }

    pub fn enabled_by_default(&self) -> bool {
        self.default
    }

    pub fn desc(&self) -> &'static str {
        self.desc
    }
}

pub static LIBZ: Feature = Feature::new(
    "libz",
    "USE_ZLIB",
    &["zlib.lib"],
    true,
    "zlib (compression) support",
);
pub static MAD: Feature = Feature::new(
    "mad",
    "USE_MAD",
    &["libmad.lib"],
    true,
    "libmad (MP3) support",
);
pub static VORBIS: Feature = Feature::new(
    "vorbis",
    "USE_VORBIS",
    &["libvorbisfile_static.lib", "libvorbis_static.lib", "libogg_static.lib"],
    true,
    "Ogg Vorbis support",
);
pub static FLAC: Feature = Feature::new(
    "flac",
    "USE_FLAC",
    &["libFLAC_static.lib"],
    true,
    "FLAC support",
);
pub static MPEG2: Feature = Feature::new(
    "mpeg2",
    "USE_MPEG2",
    &["libmpeg2.lib"],
    false,
    "mpeg2 codec for cutscenes",
);
pub static RGB_COLOR: Feature = Feature::new(
    "16bit",
    "USE_RGB_COLOR",
    &[],
    true,
    "16bit color support",
);
pub static MT32EMU: Feature = Feature::new(
    "mt32emu",
    "USE_MT32EMU",
    &[],
    true,
    "integrated MT-32 emulator",
);
pub static NASM: Feature = Feature::new(
    "nasm",
    "HAVE_NASM",
    &[],
    true,
    "IA-32 assembly support",
);

/// Every feature known to `modgen`, in the order their symbols and libraries are emitted.
pub static ALL_FEATURES: &[&Feature] = &[
    &LIBZ, &MAD, &VORBIS, &FLAC, &MPEG2, &RGB_COLOR, &MT32EMU, &NASM,
];

/// An ordered catalogue of [`Feature`]s.
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    features: Vec<&'static Feature>,
    by_name: BTreeMap<&'static str, usize>,
}

impl FeatureRegistry {
    pub fn builder() -> FeatureRegistryBuilder {
        FeatureRegistryBuilder::default()
    }

    /// A registry of [`ALL_FEATURES`].
    pub fn catalogue() -> Self {
        let mut builder = FeatureRegistry::builder();
        for feature in ALL_FEATURES {
            builder.register(feature);
        }
        builder.build()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Feature> + '_ {
        self.features.iter().copied()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn by_index(&self, idx: usize) -> &'static Feature {
        self.features[idx]
    }
}

#[derive(Debug, Default)]
pub struct FeatureRegistryBuilder {
    features: Vec<&'static Feature>,
    by_name: BTreeMap<&'static str, usize>,
}

impl FeatureRegistryBuilder {
    /// Register a [`Feature`].
    ///
    /// # Panics
    /// * If a feature with the same name was already registered.
    pub fn register(&mut self, feature: &'static Feature) -> &mut Self {
        let prev = self.by_name.insert(feature.name(), self.features.len());
        assert_none!(prev, "feature '{}' registered twice", feature.name());
        self.features.push(feature);
        self
    }

    pub fn build(self) -> FeatureRegistry {
        FeatureRegistry {
            features: self.features,
            by_name: self.by_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoketest_catalogue() {
        let registry = FeatureRegistry::catalogue();
        assert_eq!(registry.len(), ALL_FEATURES.len());

        let libz = registry.by_index(registry.index_of("libz").unwrap());
        assert_eq!(libz.symbol(), "USE_ZLIB");
        assert_eq!(libz.libraries(), ["zlib.lib"]);
        assert!(libz.enabled_by_default());

        let mpeg2 = registry.by_index(registry.index_of("mpeg2").unwrap());
        assert!(!mpeg2.enabled_by_default());

        assert!(registry.index_of("unknown").is_none());
    }

    #[test]
    fn catalogue_order() {
        let names: Vec<_> = FeatureRegistry::catalogue().iter().map(Feature::name).collect();
        assert_eq!(names, ["libz", "mad", "vorbis", "flac", "mpeg2", "16bit", "mt32emu", "nasm"]);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_registration_panics() {
        let mut builder = FeatureRegistry::builder();
        builder.register(&LIBZ).register(&LIBZ);
    }
}
