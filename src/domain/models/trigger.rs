#[cfg(test)]
#[path = "trigger_test.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Edge {
    Top,
    Center,
    Bottom,
}

/// A vertical band of the page, in the same units as the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Region {
    pub top: u32,
    pub height: u32,
}

impl Region {
    pub fn new(top: u32, height: u32) -> Region {
        return Region { top, height };
    }

    pub fn edge(&self, edge: Edge) -> f64 {
        let top = f64::from(self.top);
        let height = f64::from(self.height);

        match edge {
            Edge::Top => return top,
            Edge::Center => return top + height / 2.0,
            Edge::Bottom => return top + height,
        }
    }
}

/// Where a trigger starts, written as `"<element edge> <viewport line>"`, for
/// example `"top 60%"`: the element's top edge reaching 60% down the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerPosition {
    pub edge: Edge,
    pub viewport_percent: f64,
}

impl Default for TriggerPosition {
    fn default() -> TriggerPosition {
        return TriggerPosition {
            edge: Edge::Top,
            viewport_percent: 60.0,
        };
    }
}

impl TriggerPosition {
    /// The position the landing page uses for the AI hub section.
    pub fn hub_section() -> TriggerPosition {
        return TriggerPosition {
            edge: Edge::Top,
            viewport_percent: 70.0,
        };
    }
}

fn parse_viewport_line(text: &str) -> Result<f64, Error> {
    match text {
        "top" => return Ok(0.0),
        "center" => return Ok(50.0),
        "bottom" => return Ok(100.0),
        _ => {}
    }

    let percent = text
        .strip_suffix('%')
        .ok_or_else(|| return anyhow!("Viewport line '{text}' must be top, center, bottom or a percentage"))?
        .parse::<f64>()?;

    if !(0.0..=100.0).contains(&percent) {
        bail!(format!("Viewport line '{text}' must be between 0% and 100%"));
    }

    return Ok(percent);
}

impl FromStr for TriggerPosition {
    type Err = Error;

    fn from_str(text: &str) -> Result<TriggerPosition, Error> {
        let parts = text.split_whitespace().collect::<Vec<&str>>();
        if parts.len() != 2 {
            bail!(format!(
                "Trigger position '{text}' must look like '<edge> <viewport line>', for example 'top 60%'"
            ));
        }

        let edge = parts[0]
            .parse::<Edge>()
            .map_err(|_| return anyhow!("Unknown element edge '{}'", parts[0]))?;
        let viewport_percent = parse_viewport_line(parts[1])?;

        return Ok(TriggerPosition {
            edge,
            viewport_percent,
        });
    }
}

impl fmt::Display for TriggerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{} {}%", self.edge, self.viewport_percent);
    }
}
