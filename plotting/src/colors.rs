use plotters::style::RGBColor;

use crate::{PlotErr, Result};

// Seaborn's "Paired" palette.
const PAIRED: [RGBColor; 8] = [
    RGBColor(0xa6, 0xce, 0xe3),
    RGBColor(0x1f, 0x78, 0xb4),
    RGBColor(0xb2, 0xdf, 0x8a),
    RGBColor(0x33, 0xa0, 0x2c),
    RGBColor(0xfb, 0x9a, 0x99),
    RGBColor(0xe3, 0x1a, 0x1c),
    RGBColor(0xfd, 0xbf, 0x6f),
    RGBColor(0xff, 0x7f, 0x00),
];

const CATEGORICAL: [RGBColor; 6] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
];

const DIVERGING_LOW: RGBColor = RGBColor(0x1d, 0x3b, 0x6b);
const DIVERGING_MID: RGBColor = RGBColor(0xf2, 0xf2, 0xf2);
const DIVERGING_HIGH: RGBColor = RGBColor(0x6e, 0x1e, 0x16);

/// Returns the color every plot uses for an agent family.
///
/// Kalman filter variants share a color since they are never plotted together.
pub fn agent_color(agent_name: &str) -> Result<RGBColor> {
    let idx = match agent_name {
        "kf" | "eekf" => 0,
        "exact bayes" => 1,
        "sgd" => 2,
        "laplace" => 3,
        "bfgs" => 4,
        "lbfgs" => 5,
        "nuts" => 6,
        "sgld" => 7,
        other => return Err(PlotErr::UnknownAgent(other.to_string())),
    };

    Ok(PAIRED[idx])
}

/// Returns the color of the points of a class.
pub fn class_color(class: usize) -> RGBColor {
    CATEGORICAL[class % CATEGORICAL.len()]
}

/// Maps a value in `[0, 1]` to a blue-white-red diverging colormap. Values outside of the range
/// are clamped.
pub fn diverging_color(value: f32) -> RGBColor {
    let v = if value.is_nan() { 0.5 } else { value.clamp(0., 1.) };

    if v < 0.5 {
        lerp(DIVERGING_LOW, DIVERGING_MID, v * 2.)
    } else {
        lerp(DIVERGING_MID, DIVERGING_HIGH, (v - 0.5) * 2.)
    }
}

fn lerp(a: RGBColor, b: RGBColor, t: f32) -> RGBColor {
    let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    RGBColor(channel(a.0, b.0), channel(a.1, b.1), channel(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgd_gets_the_third_paired_color() {
        assert_eq!(agent_color("sgd").unwrap(), RGBColor(0xb2, 0xdf, 0x8a));
        assert_eq!(agent_color("kf").unwrap(), agent_color("eekf").unwrap());
    }

    #[test]
    fn unknown_agents_have_no_color() {
        assert!(matches!(
            agent_color("adagrad"),
            Err(PlotErr::UnknownAgent(name)) if name == "adagrad"
        ));
    }

    #[test]
    fn diverging_colormap_ends() {
        assert_eq!(diverging_color(0.), DIVERGING_LOW);
        assert_eq!(diverging_color(0.5), DIVERGING_MID);
        assert_eq!(diverging_color(1.), DIVERGING_HIGH);
        assert_eq!(diverging_color(7.), DIVERGING_HIGH);
    }
}
