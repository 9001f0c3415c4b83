//! Texture slots and their per-slot load state.
//!
//! Each slot starts `Pending` and settles exactly once into `Loaded` or `Failed`.
//! Until a slot is `Loaded` the renderer samples a 1×1 fallback, so the planet is
//! drawn from the first frame.

use std::fmt;

use terra_render::ColorSpace;

/// The four images the planet layers sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Daylit surface albedo.
    Day,
    /// City lights on the night side.
    Night,
    /// Ocean mask; the red channel gates the glint.
    Specular,
    /// Cloud coverage, used as colour on the cloud shell.
    Clouds,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 4] = [
        TextureSlot::Day,
        TextureSlot::Night,
        TextureSlot::Specular,
        TextureSlot::Clouds,
    ];

    pub fn index(self) -> usize {
        match self {
            TextureSlot::Day => 0,
            TextureSlot::Night => 1,
            TextureSlot::Specular => 2,
            TextureSlot::Clouds => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextureSlot::Day => "day",
            TextureSlot::Night => "night",
            TextureSlot::Specular => "specular",
            TextureSlot::Clouds => "clouds",
        }
    }

    /// Masks are sampled raw; imagery is decoded from sRGB.
    pub fn color_space(self) -> ColorSpace {
        match self {
            TextureSlot::Specular => ColorSpace::Linear,
            _ => ColorSpace::Srgb,
        }
    }
}

impl fmt::Display for TextureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tightly packed RGBA8 pixels ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedTexture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedTexture {
    /// A single opaque pixel.
    pub fn solid(rgb: [u8; 3]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![rgb[0], rgb[1], rgb[2], 255],
        }
    }

    /// Fallback image sampled while `slot` is pending or after it failed.
    ///
    /// `day_color` is the flat surface colour in display (sRGB) space.
    pub fn fallback(slot: TextureSlot, day_color: [f32; 3]) -> Self {
        match slot {
            TextureSlot::Day => Self::solid(day_color.map(unit_to_byte)),
            // Dim navy keeps the unlit hemisphere faintly visible after the 2x night boost.
            TextureSlot::Night => Self::solid([6, 10, 24]),
            // No glint and no clouds.
            TextureSlot::Specular | TextureSlot::Clouds => Self::solid([0, 0, 0]),
        }
    }
}

impl fmt::Debug for DecodedTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedTexture")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

fn unit_to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Load progress of one slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureState {
    Pending,
    Loaded,
    Failed { reason: String },
}

impl TextureState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, TextureState::Pending)
    }
}

/// Locations and states for all four slots.
#[derive(Clone, Debug)]
pub struct TextureSet {
    locations: [String; 4],
    states: [TextureState; 4],
}

impl TextureSet {
    /// All slots start `Pending`. `locations` is indexed by [`TextureSlot::index`].
    pub fn new(locations: [String; 4]) -> Self {
        Self {
            locations,
            states: std::array::from_fn(|_| TextureState::Pending),
        }
    }

    pub fn location(&self, slot: TextureSlot) -> &str {
        &self.locations[slot.index()]
    }

    pub fn state(&self, slot: TextureSlot) -> &TextureState {
        &self.states[slot.index()]
    }

    /// Mark `slot` loaded. Returns `false`, leaving the state alone, if it already settled.
    pub fn mark_loaded(&mut self, slot: TextureSlot) -> bool {
        self.settle(slot, TextureState::Loaded)
    }

    /// Mark `slot` failed. Returns `false`, leaving the state alone, if it already settled.
    pub fn mark_failed(&mut self, slot: TextureSlot, reason: impl Into<String>) -> bool {
        self.settle(
            slot,
            TextureState::Failed {
                reason: reason.into(),
            },
        )
    }

    fn settle(&mut self, slot: TextureSlot, next: TextureState) -> bool {
        let state = &mut self.states[slot.index()];
        if state.is_settled() {
            return false;
        }
        *state = next;
        true
    }

    /// Slots that have not settled yet.
    pub fn pending(&self) -> impl Iterator<Item = TextureSlot> + '_ {
        TextureSlot::ALL
            .into_iter()
            .filter(|slot| !self.state(*slot).is_settled())
    }

    pub fn all_settled(&self) -> bool {
        self.pending().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> TextureSet {
        TextureSet::new([
            "day.jpg".to_string(),
            "night.jpg".to_string(),
            "spec.jpg".to_string(),
            "clouds.jpg".to_string(),
        ])
    }

    #[test]
    fn test_slots_start_pending() {
        let set = set();
        for slot in TextureSlot::ALL {
            assert_eq!(set.state(slot), &TextureState::Pending);
        }
        assert_eq!(set.pending().count(), 4);
        assert_eq!(set.location(TextureSlot::Specular), "spec.jpg");
    }

    #[test]
    fn test_pending_to_loaded() {
        let mut set = set();
        assert!(set.mark_loaded(TextureSlot::Day));
        assert_eq!(set.state(TextureSlot::Day), &TextureState::Loaded);
        assert_eq!(set.pending().count(), 3);
    }

    #[test]
    fn test_settled_slot_does_not_change() {
        let mut set = set();
        assert!(set.mark_failed(TextureSlot::Night, "404"));
        assert!(!set.mark_loaded(TextureSlot::Night));
        assert_eq!(
            set.state(TextureSlot::Night),
            &TextureState::Failed {
                reason: "404".to_string()
            }
        );
        assert!(set.mark_loaded(TextureSlot::Clouds));
        assert!(!set.mark_failed(TextureSlot::Clouds, "late"));
    }

    #[test]
    fn test_out_of_order_settling() {
        let mut set = set();
        set.mark_loaded(TextureSlot::Clouds);
        set.mark_failed(TextureSlot::Day, "gone");
        set.mark_loaded(TextureSlot::Specular);
        assert!(!set.all_settled());
        set.mark_loaded(TextureSlot::Night);
        assert!(set.all_settled());
    }

    #[test]
    fn test_day_fallback_is_configured_color() {
        let tex = DecodedTexture::fallback(TextureSlot::Day, [0.290, 0.565, 0.886]);
        assert_eq!((tex.width, tex.height), (1, 1));
        // #4a90e2
        assert_eq!(tex.rgba, vec![0x4a, 0x90, 0xe2, 255]);
    }

    #[test]
    fn test_mask_fallbacks_are_black() {
        for slot in [TextureSlot::Specular, TextureSlot::Clouds] {
            let tex = DecodedTexture::fallback(slot, [1.0, 1.0, 1.0]);
            assert_eq!(tex.rgba, vec![0, 0, 0, 255]);
        }
    }

    #[test]
    fn test_night_fallback_is_dim_but_not_black() {
        let tex = DecodedTexture::fallback(TextureSlot::Night, [0.0; 3]);
        assert!(tex.rgba[2] > 0 && tex.rgba[2] < 64);
    }

    #[test]
    fn test_specular_is_linear() {
        assert_eq!(TextureSlot::Specular.color_space(), ColorSpace::Linear);
        assert_eq!(TextureSlot::Day.color_space(), ColorSpace::Srgb);
    }

    #[test]
    fn test_slot_indices_are_distinct() {
        let mut seen = [false; 4];
        for slot in TextureSlot::ALL {
            assert!(!seen[slot.index()]);
            seen[slot.index()] = true;
        }
    }
}
