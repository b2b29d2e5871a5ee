//! Eyeglasses prescription measurements.
//!
//! # Invariants
//! - Per-eye blocks are symmetric; `right` maps to `r_*` columns and `left`
//!   to `l_*` columns.
//! - Lens and frame attributes describe the dispensed pair, not an eye.

use crate::model::exam::{CylinderAxis, ExamKind, ExamMeasurements, ExamRecord, Eye};
use serde::{Deserialize, Serialize};

/// Prescription of one eye.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlassesEye {
    /// Far vision without correction, as written.
    pub fv: Option<String>,
    pub sphere: Option<f64>,
    pub cylinder: Option<f64>,
    pub axis: Option<i64>,
    /// Prism diopters.
    pub prism: Option<f64>,
    /// Prism base direction (`IN`, `OUT`, `UP`, `DOWN`).
    pub base: Option<String>,
    pub va: Option<String>,
    /// Addition for reading distance.
    pub add_read: Option<f64>,
    /// Addition for intermediate distance.
    pub add_int: Option<f64>,
    /// Addition for bifocal segment.
    pub add_bif: Option<f64>,
    /// Addition for multifocal lenses.
    pub add_mul: Option<f64>,
    /// Fitting height, millimeters.
    pub high: Option<f64>,
    /// Monocular pupil distance, millimeters.
    pub pd: Option<f64>,
    /// Intraocular pressure, mmHg.
    pub iop: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlassesLenses {
    pub material: Option<String>,
    pub diameter_1: Option<f64>,
    pub diameter_2: Option<f64>,
    pub decentration_horizontal: Option<f64>,
    pub decentration_vertical: Option<f64>,
    pub segment_diameter: Option<f64>,
    pub manufacturer: Option<String>,
    pub color: Option<String>,
    pub coated: Option<String>,
    pub catalog_num: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlassesFrame {
    pub manufacturer: Option<String>,
    pub supplier: Option<String>,
    pub model: Option<String>,
    /// Eye size and bridge as printed on the frame, e.g. `52-18`.
    pub size: Option<String>,
    /// Temple length, millimeters.
    pub bar_length: Option<f64>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlassesMeasurements {
    pub right: GlassesEye,
    pub left: GlassesEye,
    /// Binocular visual acuity.
    pub both_va: Option<String>,
    /// Binocular distance pupil distance.
    pub sum_pd: Option<f64>,
    pub near_pd: Option<f64>,
    pub dominant_eye: Option<String>,
    /// Intended use (distance, reading, office, ...).
    pub glasses_role: Option<String>,
    pub lenses: GlassesLenses,
    pub frame: GlassesFrame,
    pub diagnosis: Option<String>,
}

pub type GlassesTest = ExamRecord<GlassesMeasurements>;

impl ExamMeasurements for GlassesMeasurements {
    const KIND: ExamKind = ExamKind::Glasses;

    fn cylinder_axis_pairs(&self) -> [CylinderAxis; 2] {
        [
            CylinderAxis {
                eye: Eye::Right,
                cylinder: self.right.cylinder,
                axis: self.right.axis,
            },
            CylinderAxis {
                eye: Eye::Left,
                cylinder: self.left.cylinder,
                axis: self.left.axis,
            },
        ]
    }

    fn numeric_fields(&self) -> Vec<(&'static str, Option<f64>)> {
        let mut fields = eye_numeric_fields(&self.right, Eye::Right);
        fields.extend(eye_numeric_fields(&self.left, Eye::Left));
        fields.extend([
            ("sum_pd", self.sum_pd),
            ("near_pd", self.near_pd),
            ("lenses_diameter_1", self.lenses.diameter_1),
            ("lenses_diameter_2", self.lenses.diameter_2),
            (
                "lenses_decentration_horizontal",
                self.lenses.decentration_horizontal,
            ),
            (
                "lenses_decentration_vertical",
                self.lenses.decentration_vertical,
            ),
            ("segment_diameter", self.lenses.segment_diameter),
            ("frame_bar_length", self.frame.bar_length),
        ]);
        fields
    }
}

fn eye_numeric_fields(eye: &GlassesEye, side: Eye) -> Vec<(&'static str, Option<f64>)> {
    let names: [&'static str; 10] = match side {
        Eye::Right => [
            "r_sphere", "r_cylinder", "r_prism", "r_add_read", "r_add_int", "r_add_bif",
            "r_add_mul", "r_high", "r_pd", "r_iop",
        ],
        Eye::Left => [
            "l_sphere", "l_cylinder", "l_prism", "l_add_read", "l_add_int", "l_add_bif",
            "l_add_mul", "l_high", "l_pd", "l_iop",
        ],
    };
    let values = [
        eye.sphere,
        eye.cylinder,
        eye.prism,
        eye.add_read,
        eye.add_int,
        eye.add_bif,
        eye.add_mul,
        eye.high,
        eye.pd,
        eye.iop,
    ];
    names.into_iter().zip(values).collect()
}
