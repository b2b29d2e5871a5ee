//! Row codec for `contact_lenses_tests`.

use crate::model::contact_lenses::{ContactLensEye, ContactLensesMeasurements, Keratometry};
use crate::repo::exam_repo::{ExamTable, SqliteExamRepository};
use rusqlite::types::Value;
use rusqlite::Row;

pub type SqliteContactLensesRepository<'conn> =
    SqliteExamRepository<'conn, ContactLensesMeasurements>;

/// Keratometry and lens column groups of one eye.
struct EyeColumns {
    keratometry: [&'static str; 9],
    lens: [&'static str; 13],
}

const RIGHT_EYE: EyeColumns = EyeColumns {
    keratometry: [
        "r_rh", "r_rv", "r_aver", "r_k_cyl", "r_axh", "r_rt", "r_rn", "r_ri", "r_rs",
    ],
    lens: [
        "r_lens_type",
        "r_manufacturer",
        "r_brand",
        "r_diameter",
        "r_base_curve_numerator",
        "r_base_curve_denominator",
        "r_lens_sph",
        "r_lens_cyl",
        "r_lens_axis",
        "r_material",
        "r_tint",
        "r_lens_va_numerator",
        "r_lens_va_denominator",
    ],
};

const LEFT_EYE: EyeColumns = EyeColumns {
    keratometry: [
        "l_rh", "l_rv", "l_aver", "l_k_cyl", "l_axh", "l_rt", "l_rn", "l_ri", "l_rs",
    ],
    lens: [
        "l_lens_type",
        "l_manufacturer",
        "l_brand",
        "l_diameter",
        "l_base_curve_numerator",
        "l_base_curve_denominator",
        "l_lens_sph",
        "l_lens_cyl",
        "l_lens_axis",
        "l_material",
        "l_tint",
        "l_lens_va_numerator",
        "l_lens_va_denominator",
    ],
};

impl ExamTable for ContactLensesMeasurements {
    const TABLE: &'static str = "contact_lenses_tests";

    fn columns() -> Vec<&'static str> {
        RIGHT_EYE
            .keratometry
            .into_iter()
            .chain(LEFT_EYE.keratometry)
            .chain(RIGHT_EYE.lens)
            .chain(LEFT_EYE.lens)
            .collect()
    }

    fn to_values(&self) -> Vec<Value> {
        keratometry_values(&self.right.keratometry)
            .into_iter()
            .chain(keratometry_values(&self.left.keratometry))
            .chain(lens_values(&self.right))
            .chain(lens_values(&self.left))
            .collect()
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            right: eye_from_row(row, &RIGHT_EYE)?,
            left: eye_from_row(row, &LEFT_EYE)?,
        })
    }
}

fn keratometry_values(k: &Keratometry) -> [Value; 9] {
    [
        Value::from(k.horizontal),
        Value::from(k.vertical),
        Value::from(k.average),
        Value::from(k.cylinder),
        Value::from(k.axis),
        Value::from(k.temporal),
        Value::from(k.nasal),
        Value::from(k.inferior),
        Value::from(k.superior),
    ]
}

fn lens_values(eye: &ContactLensEye) -> [Value; 13] {
    [
        Value::from(eye.lens_type.clone()),
        Value::from(eye.manufacturer.clone()),
        Value::from(eye.brand.clone()),
        Value::from(eye.diameter),
        Value::from(eye.base_curve_numerator),
        Value::from(eye.base_curve_denominator),
        Value::from(eye.lens_sph),
        Value::from(eye.lens_cyl),
        Value::from(eye.lens_axis),
        Value::from(eye.material.clone()),
        Value::from(eye.tint.clone()),
        Value::from(eye.lens_va_numerator),
        Value::from(eye.lens_va_denominator),
    ]
}

fn eye_from_row(row: &Row<'_>, columns: &EyeColumns) -> rusqlite::Result<ContactLensEye> {
    let [horizontal, vertical, average, cylinder, axis, temporal, nasal, inferior, superior] =
        columns.keratometry;
    let [lens_type, manufacturer, brand, diameter, bc_numerator, bc_denominator, lens_sph, lens_cyl, lens_axis, material, tint, va_numerator, va_denominator] =
        columns.lens;

    Ok(ContactLensEye {
        keratometry: Keratometry {
            horizontal: row.get(horizontal)?,
            vertical: row.get(vertical)?,
            average: row.get(average)?,
            cylinder: row.get(cylinder)?,
            axis: row.get(axis)?,
            temporal: row.get(temporal)?,
            nasal: row.get(nasal)?,
            inferior: row.get(inferior)?,
            superior: row.get(superior)?,
        },
        lens_type: row.get(lens_type)?,
        manufacturer: row.get(manufacturer)?,
        brand: row.get(brand)?,
        diameter: row.get(diameter)?,
        base_curve_numerator: row.get(bc_numerator)?,
        base_curve_denominator: row.get(bc_denominator)?,
        lens_sph: row.get(lens_sph)?,
        lens_cyl: row.get(lens_cyl)?,
        lens_axis: row.get(lens_axis)?,
        material: row.get(material)?,
        tint: row.get(tint)?,
        lens_va_numerator: row.get(va_numerator)?,
        lens_va_denominator: row.get(va_denominator)?,
    })
}
