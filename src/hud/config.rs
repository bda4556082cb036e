//! HUD presets, placement and env-var derivation
//!
//! The Metal HUD is configured entirely through environment variables
//! injected into the launched app: `MTL_HUD_ENABLED`, `MTL_HUD_ELEMENTS`,
//! `MTL_HUD_ALIGNMENT` and `MTL_HUD_SCALE`. A [`HudConfig`] captures the
//! user's choices and derives that map.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::HudctlError;
use crate::hud::elements::HudElement;

/// Named bundle of HUD elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HudPreset {
    /// HUD enabled with Apple's stock element set
    #[default]
    Default,
    /// Device, layer size and FPS
    Simple,
    /// FPS counter only
    FpsOnly,
    /// Thermal-focused set
    Thermals,
    /// Most elements, no per-frame graphs
    Rich,
    /// Everything the HUD can render
    Full,
    /// Hand-picked element set
    Custom,
}

impl HudPreset {
    /// `MTL_HUD_ELEMENTS` value for the fixed presets.
    ///
    /// `Default` omits the variable entirely (the HUD picks its stock set);
    /// `Custom` derives it from the selected elements instead.
    fn elements(self) -> Option<&'static str> {
        match self {
            HudPreset::Default | HudPreset::Custom => None,
            HudPreset::Simple => Some("device,layersize,fps"),
            HudPreset::FpsOnly => Some("fps"),
            HudPreset::Thermals => Some(
                "device,layersize,memory,fps,frameinterval,gputime,thermal,frameintervalgraph,metalfx",
            ),
            HudPreset::Rich => Some(
                "device,layersize,layerscale,gamemode,memory,refreshrate,fps,frameinterval,gputime,thermal,frameintervalgraph,presentdelay,metalcpu,shaders,metalfx",
            ),
            HudPreset::Full => Some(
                "device,layersize,layerscale,memory,refreshrate,thermal,gamemode,fps,fpsgraph,framenumber,gputime,frameinterval,frameintervalgraph,frameintervalhistogram,presentdelay,metalcpu,gputimeline,shaders,metalfx",
            ),
        }
    }

    /// Display name, as persisted in the preferences file.
    pub fn label(self) -> &'static str {
        match self {
            HudPreset::Default => "Default",
            HudPreset::Simple => "Simple",
            HudPreset::FpsOnly => "FPS Only",
            HudPreset::Thermals => "Thermals",
            HudPreset::Rich => "Rich",
            HudPreset::Full => "Full",
            HudPreset::Custom => "Custom",
        }
    }

    /// Every preset, in menu order.
    pub const ALL: &'static [HudPreset] = &[
        HudPreset::Default,
        HudPreset::Simple,
        HudPreset::FpsOnly,
        HudPreset::Thermals,
        HudPreset::Rich,
        HudPreset::Full,
        HudPreset::Custom,
    ];
}

impl fmt::Display for HudPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HudPreset {
    type Err = HudctlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ");
        HudPreset::ALL
            .iter()
            .copied()
            .find(|p| p.label().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| HudctlError::UnknownHudOption(s.to_string()))
    }
}

/// Screen position of the HUD overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HudAlignment {
    /// Top left corner
    TopLeft,
    /// Top center
    TopCenter,
    /// Top right corner (the HUD's own default)
    #[default]
    TopRight,
    /// Center left
    CenterLeft,
    /// Screen center
    Centered,
    /// Center right
    CenterRight,
    /// Bottom right corner
    BottomRight,
    /// Bottom center
    BottomCenter,
    /// Bottom left corner
    BottomLeft,
}

impl HudAlignment {
    /// All alignments, in display order.
    pub const ALL: &'static [HudAlignment] = &[
        HudAlignment::TopLeft,
        HudAlignment::TopCenter,
        HudAlignment::TopRight,
        HudAlignment::CenterLeft,
        HudAlignment::Centered,
        HudAlignment::CenterRight,
        HudAlignment::BottomRight,
        HudAlignment::BottomCenter,
        HudAlignment::BottomLeft,
    ];

    /// Internal token used in `MTL_HUD_ALIGNMENT`.
    pub fn token(self) -> &'static str {
        match self {
            HudAlignment::TopLeft => "topleft",
            HudAlignment::TopCenter => "topcenter",
            HudAlignment::TopRight => "topright",
            HudAlignment::CenterLeft => "centerleft",
            HudAlignment::Centered => "centered",
            HudAlignment::CenterRight => "centerright",
            HudAlignment::BottomRight => "bottomright",
            HudAlignment::BottomCenter => "bottomcenter",
            HudAlignment::BottomLeft => "bottomleft",
        }
    }

    /// Display name, e.g. "Top-Right".
    pub fn label(self) -> &'static str {
        match self {
            HudAlignment::TopLeft => "Top-Left",
            HudAlignment::TopCenter => "Top-Center",
            HudAlignment::TopRight => "Top-Right",
            HudAlignment::CenterLeft => "Center-Left",
            HudAlignment::Centered => "Centered",
            HudAlignment::CenterRight => "Center-Right",
            HudAlignment::BottomRight => "Bottom-Right",
            HudAlignment::BottomCenter => "Bottom-Center",
            HudAlignment::BottomLeft => "Bottom-Left",
        }
    }
}

impl fmt::Display for HudAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HudAlignment {
    type Err = HudctlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        HudAlignment::ALL
            .iter()
            .copied()
            .find(|a| a.token().eq_ignore_ascii_case(wanted) || a.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| HudctlError::UnknownHudOption(s.to_string()))
    }
}

/// HUD overlay scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HudScale {
    /// 0.15
    Small,
    /// 0.2
    #[default]
    Default,
    /// 0.3
    Large,
    /// 0.4
    Larger,
    /// 1.0
    Max,
}

impl HudScale {
    /// All scales, smallest first.
    pub const ALL: &'static [HudScale] = &[
        HudScale::Small,
        HudScale::Default,
        HudScale::Large,
        HudScale::Larger,
        HudScale::Max,
    ];

    /// Numeric string used in `MTL_HUD_SCALE`.
    pub fn value(self) -> &'static str {
        match self {
            HudScale::Small => "0.15",
            HudScale::Default => "0.2",
            HudScale::Large => "0.3",
            HudScale::Larger => "0.4",
            HudScale::Max => "1.0",
        }
    }

    /// Display name, as persisted in the preferences file.
    pub fn label(self) -> &'static str {
        match self {
            HudScale::Small => "Small",
            HudScale::Default => "Default",
            HudScale::Large => "Large",
            HudScale::Larger => "Larger",
            HudScale::Max => "Max",
        }
    }
}

impl fmt::Display for HudScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HudScale {
    type Err = HudctlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        HudScale::ALL
            .iter()
            .copied()
            .find(|sc| sc.label().eq_ignore_ascii_case(wanted) || sc.value() == wanted)
            .ok_or_else(|| HudctlError::UnknownHudOption(s.to_string()))
    }
}

/// Complete HUD configuration for one launch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HudConfig {
    /// Element bundle
    pub preset: HudPreset,
    /// Elements used when the preset is `Custom`
    pub custom_elements: Vec<HudElement>,
    /// Overlay placement
    pub alignment: HudAlignment,
    /// Overlay scale
    pub scale: HudScale,
}

impl HudConfig {
    /// Derive the environment variables injected into the launched app.
    ///
    /// Always sets `MTL_HUD_ENABLED=1`, `MTL_HUD_ALIGNMENT` and
    /// `MTL_HUD_SCALE`. `MTL_HUD_ELEMENTS` is set for every preset except
    /// `Default`; a `Custom` preset with nothing selected still sets it,
    /// to the empty string.
    pub fn env_vars(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        env.insert("MTL_HUD_ENABLED".to_string(), "1".to_string());

        match self.preset {
            HudPreset::Custom => {
                let joined = self
                    .custom_elements
                    .iter()
                    .map(|e| e.token())
                    .collect::<Vec<_>>()
                    .join(",");
                env.insert("MTL_HUD_ELEMENTS".to_string(), joined);
            }
            preset => {
                if let Some(elements) = preset.elements() {
                    env.insert("MTL_HUD_ELEMENTS".to_string(), elements.to_string());
                }
            }
        }

        env.insert(
            "MTL_HUD_ALIGNMENT".to_string(),
            self.alignment.token().to_string(),
        );
        env.insert("MTL_HUD_SCALE".to_string(), self.scale.value().to_string());
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preset_has_no_elements_var() {
        let env = HudConfig::default().env_vars();
        assert_eq!(env.get("MTL_HUD_ENABLED").map(String::as_str), Some("1"));
        assert!(!env.contains_key("MTL_HUD_ELEMENTS"));
        assert_eq!(
            env.get("MTL_HUD_ALIGNMENT").map(String::as_str),
            Some("topright")
        );
        assert_eq!(env.get("MTL_HUD_SCALE").map(String::as_str), Some("0.2"));
    }

    #[test]
    fn test_fps_only_preset() {
        let config = HudConfig {
            preset: HudPreset::FpsOnly,
            ..HudConfig::default()
        };
        assert_eq!(
            config.env_vars().get("MTL_HUD_ELEMENTS").map(String::as_str),
            Some("fps")
        );
    }

    #[test]
    fn test_full_preset_lists_every_element() {
        let config = HudConfig {
            preset: HudPreset::Full,
            ..HudConfig::default()
        };
        let env = config.env_vars();
        let elements = env.get("MTL_HUD_ELEMENTS").unwrap();
        for element in HudElement::ALL {
            assert!(
                elements.contains(element.token()),
                "Full preset should include {}",
                element.token()
            );
        }
    }

    #[test]
    fn test_custom_preset_joins_selection() {
        let config = HudConfig {
            preset: HudPreset::Custom,
            custom_elements: vec![HudElement::Fps, HudElement::Thermal, HudElement::GpuTime],
            alignment: HudAlignment::BottomLeft,
            scale: HudScale::Max,
        };
        let env = config.env_vars();
        assert_eq!(
            env.get("MTL_HUD_ELEMENTS").map(String::as_str),
            Some("fps,thermal,gputime")
        );
        assert_eq!(
            env.get("MTL_HUD_ALIGNMENT").map(String::as_str),
            Some("bottomleft")
        );
        assert_eq!(env.get("MTL_HUD_SCALE").map(String::as_str), Some("1.0"));
    }

    #[test]
    fn test_custom_preset_with_empty_selection_sets_empty_elements() {
        let config = HudConfig {
            preset: HudPreset::Custom,
            ..HudConfig::default()
        };
        assert_eq!(
            config.env_vars().get("MTL_HUD_ELEMENTS").map(String::as_str),
            Some("")
        );
    }

    #[test]
    fn test_preset_from_str_variants() {
        assert_eq!("FPS Only".parse::<HudPreset>().unwrap(), HudPreset::FpsOnly);
        assert_eq!("fps-only".parse::<HudPreset>().unwrap(), HudPreset::FpsOnly);
        assert_eq!("rich".parse::<HudPreset>().unwrap(), HudPreset::Rich);
        assert!("ultra".parse::<HudPreset>().is_err());
    }

    #[test]
    fn test_alignment_round_trip() {
        for alignment in HudAlignment::ALL {
            assert_eq!(
                alignment.token().parse::<HudAlignment>().unwrap(),
                *alignment
            );
            assert_eq!(
                alignment.label().parse::<HudAlignment>().unwrap(),
                *alignment
            );
        }
    }

    #[test]
    fn test_scale_round_trip() {
        for scale in HudScale::ALL {
            assert_eq!(scale.label().parse::<HudScale>().unwrap(), *scale);
            assert_eq!(scale.value().parse::<HudScale>().unwrap(), *scale);
        }
    }
}
