//! Refraction exam measurements.

use crate::model::exam::{CylinderAxis, ExamKind, ExamMeasurements, ExamRecord, Eye};
use serde::{Deserialize, Serialize};

/// Subjective refraction of one eye.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefractionEye {
    /// Diopters.
    pub sphere: Option<f64>,
    /// Diopters; `None` or `0.0` means no astigmatic correction.
    pub cylinder: Option<f64>,
    /// Degrees in `[0, 180]`, set only together with a cylinder.
    pub axis: Option<i64>,
    /// Presbyopia addition, diopters.
    pub add: Option<f64>,
    /// Visual acuity as written, e.g. `6/6` or `20/25`.
    pub va: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefractionMeasurements {
    pub right: RefractionEye,
    pub left: RefractionEye,
    /// Millimeters.
    pub pupil_distance: Option<f64>,
    pub diagnosis: Option<String>,
}

pub type RefractionTest = ExamRecord<RefractionMeasurements>;

impl ExamMeasurements for RefractionMeasurements {
    const KIND: ExamKind = ExamKind::Refraction;

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
        vec![
            ("r_sphere", self.right.sphere),
            ("r_cylinder", self.right.cylinder),
            ("r_add", self.right.add),
            ("l_sphere", self.left.sphere),
            ("l_cylinder", self.left.cylinder),
            ("l_add", self.left.add),
            ("pupil_distance", self.pupil_distance),
        ]
    }
}
