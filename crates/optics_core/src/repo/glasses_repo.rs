//! Row codec for `glasses_tests`.
//!
//! Column groups are fixed-size arrays next to the encoder and decoder for the
//! same group, so adding a field without its column fails to compile.

use crate::model::glasses::{GlassesEye, GlassesFrame, GlassesLenses, GlassesMeasurements};
use crate::repo::exam_repo::{ExamTable, SqliteExamRepository};
use rusqlite::types::Value;
use rusqlite::Row;

pub type SqliteGlassesRepository<'conn> = SqliteExamRepository<'conn, GlassesMeasurements>;

const RIGHT_EYE_COLUMNS: [&str; 14] = [
    "r_fv", "r_sphere", "r_cylinder", "r_axis", "r_prism", "r_base", "r_va", "r_add_read",
    "r_add_int", "r_add_bif", "r_add_mul", "r_high", "r_pd", "r_iop",
];
const LEFT_EYE_COLUMNS: [&str; 14] = [
    "l_fv", "l_sphere", "l_cylinder", "l_axis", "l_prism", "l_base", "l_va", "l_add_read",
    "l_add_int", "l_add_bif", "l_add_mul", "l_high", "l_pd", "l_iop",
];
const SHARED_COLUMNS: [&str; 6] = [
    "both_va",
    "sum_pd",
    "near_pd",
    "dominant_eye",
    "glasses_role",
    "diagnosis",
];
const LENSES_COLUMNS: [&str; 10] = [
    "lenses_material",
    "lenses_diameter_1",
    "lenses_diameter_2",
    "lenses_decentration_horizontal",
    "lenses_decentration_vertical",
    "segment_diameter",
    "lenses_manufacturer",
    "lenses_color",
    "lenses_coated",
    "catalog_num",
];
const FRAME_COLUMNS: [&str; 6] = [
    "frame_manufacturer",
    "frame_supplier",
    "frame_model",
    "frame_size",
    "frame_bar_length",
    "frame_color",
];

impl ExamTable for GlassesMeasurements {
    const TABLE: &'static str = "glasses_tests";

    fn columns() -> Vec<&'static str> {
        RIGHT_EYE_COLUMNS
            .into_iter()
            .chain(LEFT_EYE_COLUMNS)
            .chain(SHARED_COLUMNS)
            .chain(LENSES_COLUMNS)
            .chain(FRAME_COLUMNS)
            .collect()
    }

    fn to_values(&self) -> Vec<Value> {
        eye_values(&self.right)
            .into_iter()
            .chain(eye_values(&self.left))
            .chain(shared_values(self))
            .chain(lenses_values(&self.lenses))
            .chain(frame_values(&self.frame))
            .collect()
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let [both_va, sum_pd, near_pd, dominant_eye, glasses_role, diagnosis] = SHARED_COLUMNS;
        Ok(Self {
            right: eye_from_row(row, &RIGHT_EYE_COLUMNS)?,
            left: eye_from_row(row, &LEFT_EYE_COLUMNS)?,
            both_va: row.get(both_va)?,
            sum_pd: row.get(sum_pd)?,
            near_pd: row.get(near_pd)?,
            dominant_eye: row.get(dominant_eye)?,
            glasses_role: row.get(glasses_role)?,
            lenses: lenses_from_row(row)?,
            frame: frame_from_row(row)?,
            diagnosis: row.get(diagnosis)?,
        })
    }
}

fn eye_values(eye: &GlassesEye) -> [Value; 14] {
    [
        Value::from(eye.fv.clone()),
        Value::from(eye.sphere),
        Value::from(eye.cylinder),
        Value::from(eye.axis),
        Value::from(eye.prism),
        Value::from(eye.base.clone()),
        Value::from(eye.va.clone()),
        Value::from(eye.add_read),
        Value::from(eye.add_int),
        Value::from(eye.add_bif),
        Value::from(eye.add_mul),
        Value::from(eye.high),
        Value::from(eye.pd),
        Value::from(eye.iop),
    ]
}

fn eye_from_row(row: &Row<'_>, columns: &[&str; 14]) -> rusqlite::Result<GlassesEye> {
    let [fv, sphere, cylinder, axis, prism, base, va, add_read, add_int, add_bif, add_mul, high, pd, iop] =
        *columns;
    Ok(GlassesEye {
        fv: row.get(fv)?,
        sphere: row.get(sphere)?,
        cylinder: row.get(cylinder)?,
        axis: row.get(axis)?,
        prism: row.get(prism)?,
        base: row.get(base)?,
        va: row.get(va)?,
        add_read: row.get(add_read)?,
        add_int: row.get(add_int)?,
        add_bif: row.get(add_bif)?,
        add_mul: row.get(add_mul)?,
        high: row.get(high)?,
        pd: row.get(pd)?,
        iop: row.get(iop)?,
    })
}

fn shared_values(measurements: &GlassesMeasurements) -> [Value; 6] {
    [
        Value::from(measurements.both_va.clone()),
        Value::from(measurements.sum_pd),
        Value::from(measurements.near_pd),
        Value::from(measurements.dominant_eye.clone()),
        Value::from(measurements.glasses_role.clone()),
        Value::from(measurements.diagnosis.clone()),
    ]
}

fn lenses_values(lenses: &GlassesLenses) -> [Value; 10] {
    [
        Value::from(lenses.material.clone()),
        Value::from(lenses.diameter_1),
        Value::from(lenses.diameter_2),
        Value::from(lenses.decentration_horizontal),
        Value::from(lenses.decentration_vertical),
        Value::from(lenses.segment_diameter),
        Value::from(lenses.manufacturer.clone()),
        Value::from(lenses.color.clone()),
        Value::from(lenses.coated.clone()),
        Value::from(lenses.catalog_num.clone()),
    ]
}

fn lenses_from_row(row: &Row<'_>) -> rusqlite::Result<GlassesLenses> {
    let [material, diameter_1, diameter_2, decentration_horizontal, decentration_vertical, segment_diameter, manufacturer, color, coated, catalog_num] =
        LENSES_COLUMNS;
    Ok(GlassesLenses {
        material: row.get(material)?,
        diameter_1: row.get(diameter_1)?,
        diameter_2: row.get(diameter_2)?,
        decentration_horizontal: row.get(decentration_horizontal)?,
        decentration_vertical: row.get(decentration_vertical)?,
        segment_diameter: row.get(segment_diameter)?,
        manufacturer: row.get(manufacturer)?,
        color: row.get(color)?,
        coated: row.get(coated)?,
        catalog_num: row.get(catalog_num)?,
    })
}

fn frame_values(frame: &GlassesFrame) -> [Value; 6] {
    [
        Value::from(frame.manufacturer.clone()),
        Value::from(frame.supplier.clone()),
        Value::from(frame.model.clone()),
        Value::from(frame.size.clone()),
        Value::from(frame.bar_length),
        Value::from(frame.color.clone()),
    ]
}

fn frame_from_row(row: &Row<'_>) -> rusqlite::Result<GlassesFrame> {
    let [manufacturer, supplier, model, size, bar_length, color] = FRAME_COLUMNS;
    Ok(GlassesFrame {
        manufacturer: row.get(manufacturer)?,
        supplier: row.get(supplier)?,
        model: row.get(model)?,
        size: row.get(size)?,
        bar_length: row.get(bar_length)?,
        color: row.get(color)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::model::glasses::GlassesMeasurements;
    use crate::repo::exam_repo::ExamTable;
    use std::collections::HashSet;

    #[test]
    fn values_align_with_columns() {
        let measurements = GlassesMeasurements::default();
        assert_eq!(
            measurements.to_values().len(),
            GlassesMeasurements::columns().len()
        );
    }

    #[test]
    fn column_names_are_unique() {
        let columns = GlassesMeasurements::columns();
        let unique: HashSet<_> = columns.iter().collect();
        assert_eq!(unique.len(), columns.len());
    }
}
