//! Metal HUD overlay elements
//!
//! Each element is one block the HUD can render, addressed in
//! `MTL_HUD_ELEMENTS` by an internal token. The display labels match the
//! names Apple uses in its documentation.

use std::fmt;
use std::str::FromStr;

use crate::error::HudctlError;

/// One selectable block of the Metal HUD overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HudElement {
    /// Metal device name
    Device,
    /// Layer size and present mode
    LayerSize,
    /// Layer scale and pixel format
    LayerScale,
    /// Memory usage
    Memory,
    /// Display refresh rate
    RefreshRate,
    /// Thermal state
    Thermal,
    /// Game Mode state
    GameMode,
    /// Frames per second
    Fps,
    /// FPS graph
    FpsGraph,
    /// Frame number
    FrameNumber,
    /// GPU time
    GpuTime,
    /// Frame interval
    FrameInterval,
    /// Frame interval graph
    FrameIntervalGraph,
    /// Frame interval histogram
    FrameIntervalHistogram,
    /// Present delay
    PresentDelay,
    /// Command buffer and encoder count
    MetalCpu,
    /// Encoder time and GPU timeline
    GpuTimeline,
    /// Shader compiler activity
    Shaders,
    /// MetalFX upscaling
    MetalFx,
}

impl HudElement {
    /// Every element, in the order the HUD's Full preset renders them.
    pub const ALL: &'static [HudElement] = &[
        HudElement::Device,
        HudElement::LayerSize,
        HudElement::LayerScale,
        HudElement::Memory,
        HudElement::RefreshRate,
        HudElement::Thermal,
        HudElement::GameMode,
        HudElement::Fps,
        HudElement::FpsGraph,
        HudElement::FrameNumber,
        HudElement::GpuTime,
        HudElement::FrameInterval,
        HudElement::FrameIntervalGraph,
        HudElement::FrameIntervalHistogram,
        HudElement::PresentDelay,
        HudElement::MetalCpu,
        HudElement::GpuTimeline,
        HudElement::Shaders,
        HudElement::MetalFx,
    ];

    /// Internal token used in `MTL_HUD_ELEMENTS`.
    pub fn token(self) -> &'static str {
        match self {
            HudElement::Device => "device",
            HudElement::LayerSize => "layersize",
            HudElement::LayerScale => "layerscale",
            HudElement::Memory => "memory",
            HudElement::RefreshRate => "refreshrate",
            HudElement::Thermal => "thermal",
            HudElement::GameMode => "gamemode",
            HudElement::Fps => "fps",
            HudElement::FpsGraph => "fpsgraph",
            HudElement::FrameNumber => "framenumber",
            HudElement::GpuTime => "gputime",
            HudElement::FrameInterval => "frameinterval",
            HudElement::FrameIntervalGraph => "frameintervalgraph",
            HudElement::FrameIntervalHistogram => "frameintervalhistogram",
            HudElement::PresentDelay => "presentdelay",
            HudElement::MetalCpu => "metalcpu",
            HudElement::GpuTimeline => "gputimeline",
            HudElement::Shaders => "shaders",
            HudElement::MetalFx => "metalfx",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            HudElement::Device => "Metal Device",
            HudElement::LayerSize => "Layer Size & Present Mode",
            HudElement::LayerScale => "Layer Scale & Pixel Format",
            HudElement::Memory => "Memory",
            HudElement::RefreshRate => "Refresh Rate",
            HudElement::Thermal => "Thermal State",
            HudElement::GameMode => "Game Mode",
            HudElement::Fps => "FPS",
            HudElement::FpsGraph => "FPS Graph",
            HudElement::FrameNumber => "Frame Number",
            HudElement::GpuTime => "GPU Time",
            HudElement::FrameInterval => "Frame Interval",
            HudElement::FrameIntervalGraph => "Frame Interval Graph",
            HudElement::FrameIntervalHistogram => "Frame Interval Histogram",
            HudElement::PresentDelay => "Present Delay",
            HudElement::MetalCpu => "Command Buffer & Encoder Count",
            HudElement::GpuTimeline => "Encoder Time & GPU Timeline",
            HudElement::Shaders => "Shader Compiler",
            HudElement::MetalFx => "MetalFX",
        }
    }
}

impl fmt::Display for HudElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for HudElement {
    type Err = HudctlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        HudElement::ALL
            .iter()
            .copied()
            .find(|e| e.token().eq_ignore_ascii_case(wanted) || e.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| HudctlError::UnknownHudOption(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_has_nineteen_elements() {
        assert_eq!(HudElement::ALL.len(), 19);
    }

    #[test]
    fn test_tokens_are_unique() {
        for (i, a) in HudElement::ALL.iter().enumerate() {
            for b in &HudElement::ALL[i + 1..] {
                assert_ne!(a.token(), b.token());
            }
        }
    }

    #[test]
    fn test_from_str_token_and_label() {
        assert_eq!("fps".parse::<HudElement>().unwrap(), HudElement::Fps);
        assert_eq!(
            "Thermal State".parse::<HudElement>().unwrap(),
            HudElement::Thermal
        );
        assert_eq!("METALFX".parse::<HudElement>().unwrap(), HudElement::MetalFx);
        assert!("bogus".parse::<HudElement>().is_err());
    }
}
