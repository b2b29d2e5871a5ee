//! Contact lens fitting measurements.
//!
//! Only the fitted lens power (`lens_cyl`/`lens_axis`) is subject to the
//! cylinder/axis rule; keratometry axis describes corneal shape and is stored
//! as measured.

use crate::model::exam::{CylinderAxis, ExamKind, ExamMeasurements, ExamRecord, Eye};
use serde::{Deserialize, Serialize};

/// Corneal curvature readings, radii in millimeters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keratometry {
    pub horizontal: Option<f64>,
    pub vertical: Option<f64>,
    pub average: Option<f64>,
    /// Corneal astigmatism, diopters.
    pub cylinder: Option<f64>,
    /// Axis of the horizontal meridian, degrees.
    pub axis: Option<i64>,
    pub temporal: Option<f64>,
    pub nasal: Option<f64>,
    pub inferior: Option<f64>,
    pub superior: Option<f64>,
}

/// Keratometry and fitted lens of one eye.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactLensEye {
    pub keratometry: Keratometry,
    /// Soft, toric, RGP, ...
    pub lens_type: Option<String>,
    pub manufacturer: Option<String>,
    pub brand: Option<String>,
    pub diameter: Option<f64>,
    pub base_curve_numerator: Option<f64>,
    pub base_curve_denominator: Option<f64>,
    pub lens_sph: Option<f64>,
    pub lens_cyl: Option<f64>,
    pub lens_axis: Option<i64>,
    pub material: Option<String>,
    pub tint: Option<String>,
    pub lens_va_numerator: Option<i64>,
    pub lens_va_denominator: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactLensesMeasurements {
    pub right: ContactLensEye,
    pub left: ContactLensEye,
}

pub type ContactLensesTest = ExamRecord<ContactLensesMeasurements>;

impl ExamMeasurements for ContactLensesMeasurements {
    const KIND: ExamKind = ExamKind::ContactLenses;

    fn cylinder_axis_pairs(&self) -> [CylinderAxis; 2] {
        [
            CylinderAxis {
                eye: Eye::Right,
                cylinder: self.right.lens_cyl,
                axis: self.right.lens_axis,
            },
            CylinderAxis {
                eye: Eye::Left,
                cylinder: self.left.lens_cyl,
                axis: self.left.lens_axis,
            },
        ]
    }

    fn numeric_fields(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("r_k_cyl", self.right.keratometry.cylinder),
            ("r_diameter", self.right.diameter),
            ("r_lens_sph", self.right.lens_sph),
            ("r_lens_cyl", self.right.lens_cyl),
            ("l_k_cyl", self.left.keratometry.cylinder),
            ("l_diameter", self.left.diameter),
            ("l_lens_sph", self.left.lens_sph),
            ("l_lens_cyl", self.left.lens_cyl),
        ]
    }
}
