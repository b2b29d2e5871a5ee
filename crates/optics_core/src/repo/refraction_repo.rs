//! Row codec for `refraction_tests`.

use crate::model::refraction::{RefractionEye, RefractionMeasurements};
use crate::repo::exam_repo::{ExamTable, SqliteExamRepository};
use rusqlite::types::Value;
use rusqlite::Row;

pub type SqliteRefractionRepository<'conn> = SqliteExamRepository<'conn, RefractionMeasurements>;

const RIGHT_EYE_COLUMNS: [&str; 5] = ["r_sphere", "r_cylinder", "r_axis", "r_add", "r_va"];
const LEFT_EYE_COLUMNS: [&str; 5] = ["l_sphere", "l_cylinder", "l_axis", "l_add", "l_va"];
const SHARED_COLUMNS: [&str; 2] = ["pupil_distance", "diagnosis"];

impl ExamTable for RefractionMeasurements {
    const TABLE: &'static str = "refraction_tests";

    fn columns() -> Vec<&'static str> {
        RIGHT_EYE_COLUMNS
            .into_iter()
            .chain(LEFT_EYE_COLUMNS)
            .chain(SHARED_COLUMNS)
            .collect()
    }

    fn to_values(&self) -> Vec<Value> {
        eye_values(&self.right)
            .into_iter()
            .chain(eye_values(&self.left))
            .chain([
                Value::from(self.pupil_distance),
                Value::from(self.diagnosis.clone()),
            ])
            .collect()
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            right: eye_from_row(row, &RIGHT_EYE_COLUMNS)?,
            left: eye_from_row(row, &LEFT_EYE_COLUMNS)?,
            pupil_distance: row.get(SHARED_COLUMNS[0])?,
            diagnosis: row.get(SHARED_COLUMNS[1])?,
        })
    }
}

fn eye_values(eye: &RefractionEye) -> [Value; 5] {
    [
        Value::from(eye.sphere),
        Value::from(eye.cylinder),
        Value::from(eye.axis),
        Value::from(eye.add),
        Value::from(eye.va.clone()),
    ]
}

fn eye_from_row(row: &Row<'_>, columns: &[&str; 5]) -> rusqlite::Result<RefractionEye> {
    Ok(RefractionEye {
        sphere: row.get(columns[0])?,
        cylinder: row.get(columns[1])?,
        axis: row.get(columns[2])?,
        add: row.get(columns[3])?,
        va: row.get(columns[4])?,
    })
}

#[cfg(test)]
mod tests {
    use crate::model::refraction::RefractionMeasurements;
    use crate::repo::exam_repo::ExamTable;

    #[test]
    fn values_align_with_columns() {
        let measurements = RefractionMeasurements::default();
        assert_eq!(
            measurements.to_values().len(),
            RefractionMeasurements::columns().len()
        );
    }
}
