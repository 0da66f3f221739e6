//! # Classifier
//!
//! Decides whether a file is worth shipping to clients. Anything that is not
//! on the allow-list below is a "useless" file and is skipped entirely.

/// Extensions of distributable content: maps, AI node graphs, materials,
/// textures, models, physics, vertex data, particles, audio and fonts.
const ALLOWED_EXTENSIONS: &[&str] = &[
    "bsp", "ain", "vmt", "vtf", "png", "vtx", "mdl", "phy", "vvd", "mp3", "wav", "ogg", "pcf",
    "ttf",
];

/// Model geometry extensions that also come in legacy platform variants
const GEOMETRY_EXTENSIONS: &[&str] = &["vtx", "mdl"];

/// Stem suffixes of the legacy variants (`foo.xbox.vtx`, `foo.sw.vtx`)
const LEGACY_VARIANT_SUFFIXES: &[&str] = &[".xbox", ".sw"];

/// Extension of map files. Maps are packaged but the engine streams them
/// itself, so they never go into the resource manifest.
pub const MAP_EXTENSION: &str = "bsp";

pub struct Classifier;

impl Classifier {
    /// Check if a file should be copied and compressed
    pub fn is_eligible(extension: &str, file_name: &str) -> bool {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return false;
        }

        if GEOMETRY_EXTENSIONS.contains(&extension.as_str()) {
            return !Self::is_legacy_variant(&extension, file_name);
        }

        true
    }

    /// Check if a file belongs in the resource manifest once processed
    pub fn is_listed(extension: &str) -> bool {
        !extension
            .trim_start_matches('.')
            .eq_ignore_ascii_case(MAP_EXTENSION)
    }

    fn is_legacy_variant(extension: &str, file_name: &str) -> bool {
        let name = file_name.to_ascii_lowercase();
        LEGACY_VARIANT_SUFFIXES
            .iter()
            .any(|suffix| name.ends_with(&format!("{}.{}", suffix, extension)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_listed_extensions() {
        assert!(Classifier::is_eligible("bsp", "gm_construct.bsp"));
        assert!(Classifier::is_eligible("vmt", "wall.vmt"));
        assert!(Classifier::is_eligible("ogg", "ambience.ogg"));
        assert!(Classifier::is_eligible("ttf", "font.ttf"));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(Classifier::is_eligible("VTF", "WALL.VTF"));
        assert!(Classifier::is_eligible(".Mdl", "car.Mdl"));
    }

    #[test]
    fn test_useless_files() {
        assert!(!Classifier::is_eligible("txt", "readme.txt"));
        assert!(!Classifier::is_eligible("lua", "init.lua"));
        assert!(!Classifier::is_eligible("", "Makefile"));
        assert!(!Classifier::is_eligible("bz2", "gm_construct.bsp.bz2"));
    }

    #[test]
    fn test_legacy_geometry_variants_are_skipped() {
        assert!(Classifier::is_eligible("vtx", "car.dx90.vtx"));
        assert!(!Classifier::is_eligible("vtx", "car.xbox.vtx"));
        assert!(!Classifier::is_eligible("vtx", "car.sw.vtx"));
        assert!(!Classifier::is_eligible("vtx", "CAR.SW.VTX"));
        assert!(!Classifier::is_eligible("mdl", "car.xbox.mdl"));
        assert!(Classifier::is_eligible("mdl", "car.mdl"));
    }

    #[test]
    fn test_suffix_rule_only_applies_to_geometry() {
        assert!(Classifier::is_eligible("vtf", "skin.sw.vtf"));
    }

    #[test]
    fn test_maps_are_not_listed() {
        assert!(!Classifier::is_listed("bsp"));
        assert!(!Classifier::is_listed(".BSP"));
        assert!(Classifier::is_listed("vmt"));
    }
}
