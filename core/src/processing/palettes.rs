//! Named continuous palettes.
//!
//! Most scales come from `colorous`, which carries the matplotlib and
//! ColorBrewer ramps. The few classic maps it lacks are kept here as
//! evenly spaced sRGB stops interpolated per channel. Every name also has a
//! reversed `<name>_r` form sampled at `1 - t`.

use colorous::Gradient;

pub const DEFAULT_PALETTE: &str = "viridis";

const REVERSED_SUFFIX: &str = "_r";

enum Scale {
    Gradient(Gradient),
    Stops(&'static [u32]),
}

const PALETTES: &[(&str, Scale)] = &[
    ("Blues", Scale::Gradient(colorous::BLUES)),
    ("cividis", Scale::Gradient(colorous::CIVIDIS)),
    (
        "coolwarm",
        Scale::Stops(&[
            0x3b4cc0, 0x6788ee, 0x9abbff, 0xc9d7f0, 0xedd1c2, 0xf7a889, 0xe26952, 0xb40426,
        ]),
    ),
    ("gray", Scale::Stops(&[0x000000, 0xffffff])),
    ("Greys", Scale::Gradient(colorous::GREYS)),
    ("hot", Scale::Stops(&[0x0b0000, 0xff0000, 0xffff00, 0xffffff])),
    ("inferno", Scale::Gradient(colorous::INFERNO)),
    (
        "jet",
        Scale::Stops(&[
            0x00007f, 0x0000ff, 0x007fff, 0x00ffff, 0x7fff7f, 0xffff00, 0xff7f00, 0xff0000,
            0x7f0000,
        ]),
    ),
    ("magma", Scale::Gradient(colorous::MAGMA)),
    ("plasma", Scale::Gradient(colorous::PLASMA)),
    ("RdBu", Scale::Gradient(colorous::RED_BLUE)),
    ("RdYlGn", Scale::Gradient(colorous::RED_YELLOW_GREEN)),
    ("Reds", Scale::Gradient(colorous::REDS)),
    ("Spectral", Scale::Gradient(colorous::SPECTRAL)),
    ("turbo", Scale::Gradient(colorous::TURBO)),
    ("viridis", Scale::Gradient(colorous::VIRIDIS)),
    ("YlOrRd", Scale::Gradient(colorous::YELLOW_ORANGE_RED)),
];

/// A continuous colour scale over the unit interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    name: String,
    index: usize,
    reversed: bool,
}

impl Palette {
    /// Looks up a palette by its case-sensitive name, including `_r` variants.
    pub fn named(name: &str) -> Option<Self> {
        let (base, reversed) = match name.strip_suffix(REVERSED_SUFFIX) {
            Some(base) => (base, true),
            None => (name, false),
        };
        let index = PALETTES.iter().position(|(candidate, _)| *candidate == base)?;
        Some(Self {
            name: name.to_string(),
            index,
            reversed,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn first(&self) -> [u8; 3] {
        self.sample(0.0)
    }

    pub fn last(&self) -> [u8; 3] {
        self.sample(1.0)
    }

    /// Colour at position `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };
        match &PALETTES[self.index].1 {
            Scale::Gradient(gradient) => {
                let color = gradient.eval_continuous(t);
                [color.r, color.g, color.b]
            }
            Scale::Stops(stops) => interpolate(stops, t),
        }
    }
}

/// Every selectable palette name, sorted, reversed variants included.
pub fn palette_names() -> Vec<String> {
    let mut names: Vec<String> = PALETTES
        .iter()
        .flat_map(|(name, _)| [name.to_string(), format!("{name}{REVERSED_SUFFIX}")])
        .collect();
    names.sort();
    names
}

pub fn is_known_palette(name: &str) -> bool {
    Palette::named(name).is_some()
}

fn interpolate(stops: &[u32], t: f64) -> [u8; 3] {
    let segments = (stops.len() - 1) as f64;
    let position = t * segments;
    let lower = (position.floor() as usize).min(stops.len() - 2);
    let frac = position - lower as f64;
    let (a, b) = (unpack(stops[lower]), unpack(stops[lower + 1]));
    let mix = |i: usize| (a[i] as f64 + (b[i] as f64 - a[i] as f64) * frac).round() as u8;
    [mix(0), mix(1), mix(2)]
}

fn unpack(packed: u32) -> [u8; 3] {
    [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]
}
