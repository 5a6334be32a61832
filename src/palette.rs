use crate::error::SessionError;

const SATURATION: f64 = 0.78;
const BRIGHTNESS: f64 = 0.90;

/// One single-use colour slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColourOption {
    pub id: usize,
    pub name: String,
    pub rgb: (u8, u8, u8),
    pub consumed: bool,
}

/// The shrinking pool of colours. Options are created once and only ever
/// flip between available and consumed.
#[derive(Debug, Clone)]
pub struct OptionPool {
    options: Vec<ColourOption>,
}

impl OptionPool {
    /// `count` evenly spaced hues at fixed saturation and brightness
    pub fn new(count: usize) -> Self {
        let options = (0..count)
            .map(|i| ColourOption {
                id: i,
                name: format!("Colour {}", i + 1),
                rgb: hsb_to_rgb(i as f64 * 360.0 / count as f64, SATURATION, BRIGHTNESS),
                consumed: false,
            })
            .collect();
        Self { options }
    }

    pub fn options(&self) -> &[ColourOption] {
        &self.options
    }

    pub fn get(&self, id: usize) -> Option<&ColourOption> {
        self.options.get(id)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn is_available(&self, id: usize) -> bool {
        self.get(id).is_some_and(|o| !o.consumed)
    }

    /// Fails if `id` is unknown or already consumed
    pub fn check_available(&self, id: usize) -> Result<&ColourOption, SessionError> {
        match self.get(id) {
            Some(o) if !o.consumed => Ok(o),
            _ => Err(SessionError::InvalidOption(id)),
        }
    }

    pub fn mark_consumed(&mut self, id: usize) -> Result<(), SessionError> {
        match self.options.get_mut(id) {
            Some(o) if !o.consumed => {
                o.consumed = true;
                Ok(())
            }
            _ => Err(SessionError::InvalidOption(id)),
        }
    }

    pub fn consumed_count(&self) -> usize {
        self.options.iter().filter(|o| o.consumed).count()
    }

    pub fn remaining_count(&self) -> usize {
        self.len() - self.consumed_count()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_count() == 0
    }

    pub fn reset(&mut self) {
        for o in &mut self.options {
            o.consumed = false;
        }
    }
}

/// hue in degrees, saturation and brightness in `[0, 1]`
pub fn hsb_to_rgb(hue: f64, saturation: f64, brightness: f64) -> (u8, u8, u8) {
    let h = (hue.rem_euclid(360.0)) / 60.0;
    let chroma = brightness * saturation;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = brightness - chroma;
    let to_byte = |v: f64| ((v + m) * 255.0).round() as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn new_pool_is_fully_available() {
        let pool = OptionPool::new(8);
        assert_eq!(pool.len(), 8);
        assert_eq!(pool.remaining_count(), 8);
        assert!(!pool.is_exhausted());
        assert_eq!(pool.options()[0].name, "Colour 1");
        assert_eq!(pool.options()[7].name, "Colour 8");
        assert!(pool.options().iter().enumerate().all(|(i, o)| o.id == i));
    }

    #[test]
    fn hues_are_distinct() {
        let pool = OptionPool::new(8);
        let mut colours: Vec<_> = pool.options().iter().map(|o| o.rgb).collect();
        colours.sort();
        colours.dedup();
        assert_eq!(colours.len(), 8);
    }

    #[test]
    fn hsb_primaries() {
        assert_eq!(hsb_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
        assert_eq!(hsb_to_rgb(120.0, 1.0, 1.0), (0, 255, 0));
        assert_eq!(hsb_to_rgb(240.0, 1.0, 1.0), (0, 0, 255));
        assert_eq!(hsb_to_rgb(0.0, 0.0, 1.0), (255, 255, 255));
        let (r, g, b) = hsb_to_rgb(0.0, 0.78, 0.90);
        assert_eq!(g, b);
        assert!(r > 200 && g < 60);
    }

    #[test]
    fn consuming_shrinks_pool_until_exhausted() {
        let mut pool = OptionPool::new(2);
        pool.mark_consumed(1).unwrap();
        assert_eq!(pool.remaining_count(), 1);
        assert!(!pool.is_available(1));
        assert!(pool.is_available(0));
        pool.mark_consumed(0).unwrap();
        assert!(pool.is_exhausted());
    }

    #[test]
    fn consuming_twice_or_unknown_is_invalid() {
        let mut pool = OptionPool::new(3);
        pool.mark_consumed(2).unwrap();
        assert_matches!(pool.mark_consumed(2), Err(SessionError::InvalidOption(2)));
        assert_matches!(pool.mark_consumed(3), Err(SessionError::InvalidOption(3)));
        assert_matches!(pool.check_available(2), Err(SessionError::InvalidOption(2)));
        assert_eq!(pool.consumed_count(), 1);
    }

    #[test]
    fn reset_restores_without_recreating() {
        let mut pool = OptionPool::new(4);
        let before: Vec<_> = pool.options().iter().map(|o| o.rgb).collect();
        pool.mark_consumed(0).unwrap();
        pool.mark_consumed(3).unwrap();
        pool.reset();
        assert_eq!(pool.remaining_count(), 4);
        let after: Vec<_> = pool.options().iter().map(|o| o.rgb).collect();
        assert_eq!(before, after);
    }
}
