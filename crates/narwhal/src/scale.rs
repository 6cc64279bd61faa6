//! Scale factor selection.
//!
//! Every candidate constraint yields the largest factor it can tolerate; the smallest of them
//! wins, and an exact tie goes to the earlier category. A constraint no positive factor can meet
//! is kept at [`MIN_SCALE_FACTOR`] rather than dropped.

use crate::error::{Error, Result};
use crate::node::LayoutNodes;
use crate::settings::LayoutSettings;
use crate::stem::TotalStemLength;
use crate::validate::{StatOptions, validate_stat};
use serde::Serialize;
use std::fmt;

/// How much taller than its configured height a stretched canvas may become.
pub const STRETCH_LIMIT: f64 = 1.5;

/// Factor kept by a constraint that no positive scale can satisfy; scalable lengths all but
/// vanish and only the fixed per-node costs remain.
pub const MIN_SCALE_FACTOR: f64 = 1e-6;

/// Share of the shorter drawable side a single circle may occupy.
pub const DIAMETER_CLAMP_RATIO: f64 = 0.25;

/// Quantile rules are noise on very small trees.
pub const MIN_LEAVES_FOR_QUANTILES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ScaleCategory {
    #[serde(rename = "shortest")]
    Shortest,
    #[serde(rename = "longest")]
    Longest,
    #[serde(rename = "diameter clamp")]
    DiameterClamp,
    #[serde(rename = "q25 4-3-5 triangle")]
    Q25Triangle,
    #[serde(rename = "q50 1-1-sqrt(2) triangle")]
    Q50Triangle,
    #[serde(rename = "q75 3-4-5 triangle")]
    Q75Triangle,
}

impl ScaleCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shortest => "shortest",
            Self::Longest => "longest",
            Self::DiameterClamp => "diameter clamp",
            Self::Q25Triangle => "q25 4-3-5 triangle",
            Self::Q50Triangle => "q50 1-1-sqrt(2) triangle",
            Self::Q75Triangle => "q75 3-4-5 triangle",
        }
    }
}

impl fmt::Display for ScaleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right triangle a typical leaf is assumed to follow: it runs along the hypotenuse, covering
/// `horizontal` across and `vertical` down per `hypotenuse` of length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Triangle {
    pub horizontal: f64,
    pub vertical: f64,
    pub hypotenuse: f64,
}

const QUANTILE_RULES: [(ScaleCategory, f64, Triangle); 3] = [
    (
        ScaleCategory::Q25Triangle,
        0.25,
        Triangle {
            horizontal: 4.0,
            vertical: 3.0,
            hypotenuse: 5.0,
        },
    ),
    (
        ScaleCategory::Q50Triangle,
        0.5,
        Triangle {
            horizontal: 1.0,
            vertical: 1.0,
            hypotenuse: std::f64::consts::SQRT_2,
        },
    ),
    (
        ScaleCategory::Q75Triangle,
        0.75,
        Triangle {
            horizontal: 3.0,
            vertical: 4.0,
            hypotenuse: 5.0,
        },
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScaleDiagnostics {
    #[serde(rename_all = "camelCase")]
    Shortest {
        shortest_id: String,
        longest_id: String,
        scalable_spread: f64,
        absolute_spread: f64,
        available: f64,
    },
    #[serde(rename_all = "camelCase")]
    Longest {
        leaf_id: String,
        scalable: f64,
        absolute: f64,
        height_budget: f64,
    },
    #[serde(rename_all = "camelCase")]
    DiameterClamp {
        node_id: String,
        own_diameter: f64,
        available: f64,
    },
    #[serde(rename_all = "camelCase")]
    Quantile {
        quantile: f64,
        leaf_id: String,
        scalable: f64,
        absolute: f64,
        triangle: Triangle,
        width_budget: f64,
        height_budget: f64,
    },
}

/// The constraint that determined (or competed for) the scale factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisiveWeight {
    pub category: ScaleCategory,
    pub scale_factor: f64,
    pub diagnostics: ScaleDiagnostics,
}

#[derive(Debug, Clone)]
pub struct Scale {
    settings: LayoutSettings,
    scale_factor: f64,
    final_svg_height: f64,
    decisive_weight: Option<DecisiveWeight>,
    candidates: Vec<DecisiveWeight>,
}

impl Scale {
    pub fn new(settings: &LayoutSettings) -> Self {
        Self {
            settings: settings.clone(),
            scale_factor: 1.0,
            final_svg_height: settings.svg_height,
            decisive_weight: None,
            candidates: Vec::new(),
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn final_svg_height(&self) -> f64 {
        self.final_svg_height
    }

    /// `None` until [`Scale::calculate_scale_factor`] succeeds.
    pub fn decisive_weight(&self) -> Option<&DecisiveWeight> {
        self.decisive_weight.as_ref()
    }

    /// Every satisfiable candidate from the last calculation, in priority order.
    pub fn candidates(&self) -> &[DecisiveWeight] {
        &self.candidates
    }

    pub fn line_length(&self, n: f64) -> f64 {
        n * self.scale_factor
    }

    /// Radius of the circle whose circumference is `n`, scaled.
    pub fn circle_radius(&self, n: f64) -> f64 {
        self.line_length(n) / std::f64::consts::TAU
    }

    /// Picks the most restrictive candidate over `layout_nodes` (stems attached).
    ///
    /// Pure with respect to its inputs: calling it again on the same nodes gives the same result.
    pub fn calculate_scale_factor(&mut self, layout_nodes: &LayoutNodes) -> Result<()> {
        let s = &self.settings;
        let available_width = s.available_width();
        let available_height = s.available_height();
        let insets = s.svg_distance_from_edge * 2.0;
        let height_budget = if s.allow_stretch {
            s.svg_height * STRETCH_LIMIT - insets
        } else {
            available_height
        };

        let mut leaves: Vec<(&str, TotalStemLength)> = layout_nodes
            .values()
            .filter(|n| n.is_leaf())
            .map(|n| (n.id(), n.stem.total_stem_length(1.0)))
            .collect();
        leaves.sort_by(|(_, a), (_, b)| {
            a.scalable
                .total_cmp(&b.scalable)
                .then(a.absolute.total_cmp(&b.absolute))
        });
        let (Some(&(shortest_id, shortest)), Some(&(longest_id, longest))) =
            (leaves.first(), leaves.last())
        else {
            return Err(Error::NoScaleConstraint);
        };

        let mut candidates = Vec::with_capacity(6);

        let scalable_spread = longest.scalable - shortest.scalable;
        if scalable_spread > 0.0 {
            let absolute_spread = longest.absolute - shortest.absolute;
            let available = available_height / 2.0;
            candidates.push(DecisiveWeight {
                category: ScaleCategory::Shortest,
                scale_factor: (available - absolute_spread) / scalable_spread,
                diagnostics: ScaleDiagnostics::Shortest {
                    shortest_id: shortest_id.to_string(),
                    longest_id: longest_id.to_string(),
                    scalable_spread,
                    absolute_spread,
                    available,
                },
            });
        }

        candidates.push(DecisiveWeight {
            category: ScaleCategory::Longest,
            scale_factor: (height_budget - longest.absolute) / longest.scalable,
            diagnostics: ScaleDiagnostics::Longest {
                leaf_id: longest_id.to_string(),
                scalable: longest.scalable,
                absolute: longest.absolute,
                height_budget,
            },
        });

        let widest = layout_nodes
            .values()
            .max_by(|a, b| a.stem.raw.own_diameter.total_cmp(&b.stem.raw.own_diameter));
        if let Some(widest) = widest.filter(|n| n.stem.raw.own_diameter > 0.0) {
            let available = available_width.min(available_height) * DIAMETER_CLAMP_RATIO;
            candidates.push(DecisiveWeight {
                category: ScaleCategory::DiameterClamp,
                scale_factor: available / widest.stem.raw.own_diameter,
                diagnostics: ScaleDiagnostics::DiameterClamp {
                    node_id: widest.id().to_string(),
                    own_diameter: widest.stem.raw.own_diameter,
                    available,
                },
            });
        }

        if leaves.len() >= MIN_LEAVES_FOR_QUANTILES {
            let width_budget = available_width / 2.0;
            for (category, quantile, triangle) in QUANTILE_RULES {
                let (leaf_id, length) = leaves[nearest_rank(quantile, leaves.len())];
                let across = (width_budget * triangle.hypotenuse / triangle.horizontal
                    - length.absolute)
                    / length.scalable;
                let down = (height_budget * triangle.hypotenuse / triangle.vertical
                    - length.absolute)
                    / length.scalable;
                let Some(scale_factor) = [across, down]
                    .into_iter()
                    .filter_map(feasible)
                    .reduce(f64::min)
                else {
                    continue;
                };
                candidates.push(DecisiveWeight {
                    category,
                    scale_factor,
                    diagnostics: ScaleDiagnostics::Quantile {
                        quantile,
                        leaf_id: leaf_id.to_string(),
                        scalable: length.scalable,
                        absolute: length.absolute,
                        triangle,
                        width_budget,
                        height_budget,
                    },
                });
            }
        }

        candidates.retain_mut(|c| match feasible(c.scale_factor) {
            Some(factor) => {
                c.scale_factor = factor;
                true
            }
            None => false,
        });

        let decisive = candidates
            .iter()
            .min_by(|a, b| {
                a.scale_factor
                    .total_cmp(&b.scale_factor)
                    .then(a.category.cmp(&b.category))
            })
            .cloned()
            .ok_or(Error::NoScaleConstraint)?;
        let scale_factor = validate_stat(
            decisive.scale_factor,
            "scaleFactor",
            StatOptions { above_zero: true },
        )?;

        let final_svg_height = if s.allow_stretch && decisive.category == ScaleCategory::Longest {
            s.svg_height * STRETCH_LIMIT
        } else {
            let stretch_limit = if s.allow_stretch { STRETCH_LIMIT } else { 1.0 };
            let needed = longest.absolute + longest.scalable * scale_factor + insets;
            needed.clamp(s.svg_height, s.svg_height * stretch_limit)
        };

        self.final_svg_height = validate_stat(
            final_svg_height,
            "finalSvgHeight",
            StatOptions { above_zero: true },
        )?;
        self.scale_factor = scale_factor;
        self.decisive_weight = Some(decisive);
        self.candidates = candidates;
        Ok(())
    }
}

/// A non-finite factor means the constraint ignores scale (nothing scalable on its path); a
/// non-positive one means no scale satisfies it, so it keeps the floor and stays in the running.
fn feasible(factor: f64) -> Option<f64> {
    factor.is_finite().then(|| factor.max(MIN_SCALE_FACTOR))
}

fn nearest_rank(quantile: f64, len: usize) -> usize {
    let rank = (quantile * len as f64).ceil() as usize;
    rank.clamp(1, len) - 1
}
