use std::{collections::HashMap, io, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};
use serde_json::{Map, Value};

use crate::{
    auth::credential_digest,
    errors::GradeError,
    types::{Digest, Grades, StudentId},
};

/// First column value of the row holding the class averages.
pub const AVERAGES_ROW: &str = "Averages";

// id, password, last name, first name
const FIXED_COLUMNS: usize = 4;

#[derive(Clone, Debug)]
pub struct Student {
    pub id: StudentId,
    pub last_name: String,
    pub first_name: String,
    pub grades: Grades,
    password_digest: Digest,
}

impl Student {
    pub fn new(
        id: &str,
        password: &str,
        last_name: &str,
        first_name: &str,
        grades: Grades,
    ) -> Self {
        Self {
            id: id.to_string(),
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            grades,
            password_digest: credential_digest(id, password),
        }
    }

    pub fn password_digest(&self) -> &Digest {
        &self.password_digest
    }

    /// The grades as a JSON object, keys in roster column order.
    pub fn grades_json(&self) -> Result<String, serde_json::Error> {
        let grades: Map<String, Value> = self
            .grades
            .iter()
            .map(|(assignment, grade)| (assignment.clone(), Value::String(grade.clone())))
            .collect();
        serde_json::to_string(&grades)
    }
}

/// Everything the grade server knows, loaded once at startup and never mutated.
#[derive(Debug, Default)]
pub struct Roster {
    assignments: Vec<String>,
    students: HashMap<StudentId, Student>,
    by_digest: HashMap<Digest, StudentId>,
    averages: HashMap<String, String>,
}

impl Roster {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GradeError> {
        let path = path.as_ref();
        let reader = csv_builder().from_path(path)?;
        Self::from_csv(reader, &path.display().to_string())
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, GradeError> {
        Self::from_csv(csv_builder().from_reader(reader), "<reader>")
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>, source: &str) -> Result<Self, GradeError> {
        let headers = reader.headers()?.clone();
        if headers.len() < FIXED_COLUMNS {
            return Err(GradeError::MissingHeader(source.to_string()));
        }
        info!("Roster header from {}: {:?}", source, headers);

        let mut roster = Roster {
            assignments: headers
                .iter()
                .skip(FIXED_COLUMNS)
                .map(str::to_string)
                .collect(),
            ..Default::default()
        };

        for record in reader.records() {
            roster.add_record(&record?);
        }

        Ok(roster)
    }

    fn add_record(&mut self, record: &StringRecord) {
        if record.len() < FIXED_COLUMNS {
            warn!("Skipping short roster row {:?}", record);
            return;
        }

        let grades: Grades = self
            .assignments
            .iter()
            .cloned()
            .zip(record.iter().skip(FIXED_COLUMNS).map(str::to_string))
            .collect();

        if &record[0] == AVERAGES_ROW {
            for (assignment, average) in grades {
                if self.averages.contains_key(&assignment) {
                    warn!("Replacing average for assignment {}", assignment);
                }
                self.averages.insert(assignment, average);
            }
            return;
        }

        self.insert(Student::new(
            &record[0], &record[1], &record[2], &record[3], grades,
        ));
    }

    fn insert(&mut self, student: Student) {
        let digest = student.password_digest;
        let id = student.id.clone();

        if let Some(previous) = self.students.insert(id.clone(), student) {
            warn!("Replacing student with id {}", id);
            self.by_digest.remove(&previous.password_digest);
        }

        if let Some(other) = self.by_digest.insert(digest, id.clone()) {
            if other != id {
                warn!("Students {} and {} share a credential digest", other, id);
            }
        }
    }

    /// Finds the student whose stored digest matches.
    pub fn authenticate(&self, digest: &Digest) -> Option<&Student> {
        self.by_digest
            .get(digest)
            .and_then(|id| self.students.get(id))
    }

    pub fn average(&self, assignment: &str) -> Option<&str> {
        self.averages.get(assignment).map(String::as_str)
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.get(id)
    }

    pub fn assignments(&self) -> &[String] {
        &self.assignments
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

fn csv_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(true).flexible(true).trim(Trim::All);
    builder
}
